#![deny(unsafe_code)]
//! Command-line front end for gradient-studio.
//!
//! Every invocation opens the editor on a file-backed store, applies one
//! command, settles any pending saves and prints the resulting CSS.
//!
//! Subcommands:
//! - `show` / `css` — print the current gradient
//! - `set` — change type, angle, shape, blur or noise
//! - `stop` — add, remove, reverse, distribute, recolor or move stops
//! - `preset` — list, apply, save or delete presets
//! - `palette` — list palettes or apply a swatch
//! - `randomize`, `import`, `reset`
//! - `export` — write a CSS, SVG, PNG or JPEG file

mod error;
mod logging;

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};
use error::CliError;
use gradient_studio::{
    Configurable, ExportFormat, FileStorage, GradientEditor, Resolution, SaveOutcome, PALETTES,
};
use logging::{init_logging, LoggingConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

type Editor = GradientEditor<FileStorage>;

#[derive(Parser)]
#[command(name = "gradient-studio", about = "Gradient editor and exporter")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the saved gradient and custom presets.
    #[arg(long, global = true, default_value = ".gradient-studio")]
    store: PathBuf,

    /// Log filter in env_logger syntax (overrides RUST_LOG).
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current gradient.
    Show,
    /// Print only the CSS declaration.
    Css,
    /// Change gradient fields. Values are sanitized; invalid ones are ignored.
    Set {
        /// linear, radial or conic.
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        angle: Option<String>,
        /// ellipse or circle (radial only).
        #[arg(long)]
        shape: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        blur: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        noise: Option<String>,
    },
    /// Edit the stop list.
    Stop {
        #[command(subcommand)]
        action: StopAction,
    },
    /// Manage presets.
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// List palettes or apply a swatch to a stop.
    Palette {
        #[command(subcommand)]
        action: PaletteAction,
    },
    /// Replace the gradient with a random one.
    Randomize {
        /// PRNG seed for deterministic output.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load a gradient from a JSON file.
    Import { file: PathBuf },
    /// Restore the default gradient.
    Reset,
    /// Export the gradient to a file.
    Export {
        /// svg, png, jpg or css.
        format: ExportFormat,

        /// Named resolution (1080p or 4k).
        #[arg(short, long, default_value = "1080p")]
        resolution: String,

        /// Output directory.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Print a data URL instead of writing a file.
        #[arg(long)]
        data_url: bool,

        /// PRNG seed for the noise overlay.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum StopAction {
    /// Add a white stop at 50%.
    Add,
    /// Remove the stop at INDEX.
    Remove { index: usize },
    /// Mirror the stops.
    Reverse,
    /// Spread the stops evenly.
    Distribute,
    /// Recolor the stop at INDEX.
    Color { index: usize, color: String },
    /// Move the stop at INDEX.
    Position {
        index: usize,
        #[arg(allow_hyphen_values = true)]
        pos: String,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// List built-in and custom presets.
    List,
    /// Apply a preset by name.
    Apply { name: String },
    /// Save the current gradient as a custom preset.
    Save { name: String },
    /// Delete a custom preset.
    Delete { name: String },
}

#[derive(Subcommand)]
enum PaletteAction {
    /// List palettes and their swatches.
    List,
    /// Set a stop's color to a swatch.
    Apply {
        palette: String,
        swatch: String,
        /// Stop to recolor.
        #[arg(long, default_value_t = 0)]
        stop: usize,
    },
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_state(editor: &Editor, json_mode: bool) -> Result<(), CliError> {
    if json_mode {
        let info = json!({
            "state": editor.gradient(),
            "css": editor.css(),
            "labelColor": editor.label_color(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", editor.css());
    }
    Ok(())
}

/// Change made to the custom preset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PresetChange {
    Saved,
    Deleted,
}

impl PresetChange {
    fn verb(self) -> &'static str {
        match self {
            PresetChange::Saved => "saved",
            PresetChange::Deleted => "deleted",
        }
    }
}

fn preset_notice(name: &str, change: PresetChange, outcome: SaveOutcome) -> String {
    let verb = change.verb();
    if outcome.is_persisted() {
        format!("Preset \"{name}\" {verb}.")
    } else {
        format!("Preset \"{name}\" {verb} for now (storage unavailable).")
    }
}

fn report_preset_change(
    name: &str,
    change: PresetChange,
    outcome: SaveOutcome,
    json_mode: bool,
) -> Result<(), CliError> {
    if json_mode {
        let info = json!({
            "preset": name,
            "change": change.verb(),
            "persisted": outcome.is_persisted(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!("{}", preset_notice(name, change, outcome));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut editor = GradientEditor::open(FileStorage::new(&cli.store));
    let now = Instant::now();

    match cli.command {
        Command::Show | Command::Css => {}
        Command::Set {
            kind,
            angle,
            shape,
            blur,
            noise,
        } => {
            if let Some(kind) = kind {
                editor.set_type(kind);
            }
            if let Some(shape) = shape {
                editor.set_shape(shape);
            }
            if let Some(angle) = angle {
                editor.set_angle(angle, now);
            }
            if let Some(blur) = blur {
                editor.set_blur(blur, now);
            }
            if let Some(noise) = noise {
                editor.set_noise(noise, now);
            }
        }
        Command::Stop { action } => match action {
            StopAction::Add => editor.add_stop(),
            StopAction::Remove { index } => editor.remove_stop(index)?,
            StopAction::Reverse => editor.reverse_stops(),
            StopAction::Distribute => editor.distribute_stops()?,
            StopAction::Color { index, color } => {
                if !editor.set_stop_color(index, color.as_str(), now)? {
                    return Err(CliError::Input(format!("`{color}` is not a hex color")));
                }
            }
            StopAction::Position { index, pos } => editor.set_stop_position(index, pos, now)?,
        },
        Command::Preset { action } => match action {
            PresetAction::List => {
                let builtin: Vec<&str> = editor.builtin_presets().iter().map(|p| p.name()).collect();
                let custom: Vec<&str> = editor.custom_presets().iter().map(|p| p.name()).collect();
                if cli.json {
                    let info = json!({ "builtin": builtin, "custom": custom });
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    println!("Built-in:");
                    for name in builtin {
                        println!("  {name}");
                    }
                    println!("Custom:");
                    for name in custom {
                        println!("  {name}");
                    }
                }
                return Ok(());
            }
            PresetAction::Apply { name } => editor.apply_preset(&name)?,
            PresetAction::Save { name } => {
                let (stored, outcome) = editor.save_preset(&name)?;
                return report_preset_change(&stored, PresetChange::Saved, outcome, cli.json);
            }
            PresetAction::Delete { name } => {
                let outcome = editor.delete_preset(&name)?;
                return report_preset_change(&name, PresetChange::Deleted, outcome, cli.json);
            }
        },
        Command::Palette { action } => match action {
            PaletteAction::List => {
                if cli.json {
                    let info: Value = PALETTES
                        .iter()
                        .map(|p| {
                            let swatches: serde_json::Map<String, Value> = p
                                .colors()
                                .into_iter()
                                .map(|(name, color)| (name.to_string(), json!(color)))
                                .collect();
                            (p.name.to_string(), Value::Object(swatches))
                        })
                        .collect::<serde_json::Map<String, Value>>()
                        .into();
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    for palette in PALETTES {
                        println!("{}:", palette.name);
                        for (name, color) in palette.colors() {
                            println!("  {name:<12} {color}");
                        }
                    }
                }
                return Ok(());
            }
            PaletteAction::Apply {
                palette,
                swatch,
                stop,
            } => {
                editor.select_stop(stop)?;
                editor.apply_palette_color(&palette, &swatch)?;
            }
        },
        Command::Randomize { seed } => editor.randomize(&mut rng(seed)),
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)
                .map_err(|e| CliError::Io(format!("cannot read {}: {e}", file.display())))?;
            let candidate: Value = serde_json::from_str(&raw)?;
            editor.apply_state(&candidate);
        }
        Command::Reset => editor.apply_state(&Value::Null),
        Command::Export {
            format,
            resolution,
            out,
            data_url,
            seed,
        } => {
            let artifact = editor.export(format, Resolution::from_key(&resolution), &mut rng(seed))?;
            if data_url {
                println!("{}", artifact.data_url());
            } else {
                fs::create_dir_all(&out)
                    .map_err(|e| CliError::Io(format!("cannot create {}: {e}", out.display())))?;
                let path = artifact.write_to(&out)?;
                if cli.json {
                    let info = json!({
                        "format": format.extension(),
                        "mime": artifact.mime(),
                        "bytes": artifact.bytes().len(),
                        "output": path.display().to_string(),
                    });
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    eprintln!("exported {} ({} bytes)", path.display(), artifact.bytes().len());
                }
            }
            return Ok(());
        }
    }

    editor.flush();
    if editor.last_save() == Some(SaveOutcome::MemoryOnly) {
        eprintln!("warning: gradient could not be saved to {}", cli.store.display());
    }
    print_state(&editor, cli.json)
}

fn main() {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_notice_flags_unsaved_changes() {
        assert_eq!(
            preset_notice("Dusk", PresetChange::Deleted, SaveOutcome::Persisted),
            "Preset \"Dusk\" deleted."
        );
        assert_eq!(
            preset_notice("Dusk", PresetChange::Deleted, SaveOutcome::MemoryOnly),
            "Preset \"Dusk\" deleted for now (storage unavailable)."
        );
        assert!(preset_notice("Dusk", PresetChange::Saved, SaveOutcome::MemoryOnly).contains("saved for now"));
    }

    #[test]
    fn delete_is_parsed() {
        let cli = Cli::try_parse_from(["gradient-studio", "--json", "preset", "delete", "Dusk"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Preset { action: PresetAction::Delete { ref name } } if name == "Dusk"
        ));
    }
}
