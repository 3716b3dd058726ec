//! The gradient editor: single owner of the live gradient.
//!
//! [`GradientEditor`] wraps the live [`GradientDescriptor`], the active stop,
//! both preset lists and a [`Storage`] backend. Every mutation goes through a
//! sanitizing operation; nothing outside the crate can assign a field
//! directly.
//!
//! # Persistence timing
//!
//! | Edit | Saved |
//! |---|---|
//! | type, shape, add/remove/reverse/distribute, preset, randomize, palette | immediately |
//! | angle, blur, noise, stop color | 200 ms after input settles |
//! | stop position | re-sorted and saved 100 ms after input settles |
//!
//! The editor has no clock of its own: debounced edits take the current
//! [`Instant`], and [`tick`](GradientEditor::tick) runs whatever has settled.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use gradient_studio::{GradientEditor, MemoryStorage};
//!
//! let mut editor = GradientEditor::open(MemoryStorage::new());
//! let now = Instant::now();
//!
//! editor.set_angle("45", now);
//! assert_eq!(editor.gradient().angle(), 45);
//!
//! editor.tick(now + Duration::from_millis(250));
//! assert!(editor.css().contains("45deg"));
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use serde_json::{json, Value};

use crate::color::{clamp_number, normalize_hex, HexColor};
use crate::debounce::Debouncer;
use crate::error::{EditError, ExportError};
use crate::export::{self, Artifact, ExportFormat, Resolution};
use crate::generate::{css_file_contents, generate_css, generate_svg, preview_label_color};
use crate::gradient::{
    apply_sanitized_state, GradientDescriptor, GradientType, RadialShape, ANGLE_MAX, BLUR_MAX,
    NOISE_MAX, POSITION_MAX,
};
use crate::preset::{builtin_presets, same_name, CustomPresets, Preset, MAX_CUSTOM_PRESETS};
use crate::stops;
use crate::store::{self, SaveOutcome, Storage};
use crate::swatches::Palette;

// ============================================================================
// Settings
// ============================================================================

/// Tunables of a [`GradientEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    /// Delay before a settled slider or text edit is saved.
    pub save_delay: Duration,
    /// Delay before a moved stop is re-sorted and saved.
    pub reorder_delay: Duration,
    /// Most custom presets kept.
    pub max_custom_presets: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            save_delay: Duration::from_millis(200),
            reorder_delay: Duration::from_millis(100),
            max_custom_presets: MAX_CUSTOM_PRESETS,
        }
    }
}

// ============================================================================
// Configurable Trait
// ============================================================================

/// Types whose whole gradient state can be replaced and exported.
pub trait Configurable {
    /// Replaces the state with the sanitized form of `candidate`.
    fn apply_state(&mut self, candidate: &Value);

    /// Returns a copy of the current state.
    fn export_state(&self) -> GradientDescriptor;
}

// ============================================================================
// GradientEditor
// ============================================================================

pub struct GradientEditor<S: Storage> {
    gradient: GradientDescriptor,
    active: usize,
    builtin: Vec<Preset>,
    custom: CustomPresets,
    storage: S,
    settings: EditorSettings,
    save_debounce: Debouncer,
    reorder_debounce: Debouncer,
    last_save: Option<SaveOutcome>,
}

impl<S: Storage> GradientEditor<S> {
    /// Opens an editor with default settings.
    pub fn open(storage: S) -> Self {
        Self::with_settings(storage, EditorSettings::default())
    }

    /// Opens an editor, restoring the saved gradient and custom presets.
    ///
    /// Missing or unreadable stored data leaves the defaults in place.
    pub fn with_settings(storage: S, settings: EditorSettings) -> Self {
        let mut gradient = GradientDescriptor::default();
        let state = store::load_state(&storage, &mut gradient);
        let (custom, presets) = store::load_custom_presets(&storage, settings.max_custom_presets);
        log::debug!("opened editor (state: {state:?}, presets: {presets:?})");

        Self {
            gradient,
            active: 0,
            builtin: builtin_presets(),
            custom,
            save_debounce: Debouncer::new(settings.save_delay),
            reorder_debounce: Debouncer::new(settings.reorder_delay),
            storage,
            settings,
            last_save: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn gradient(&self) -> &GradientDescriptor {
        &self.gradient
    }

    /// Index of the stop whose controls have focus.
    pub fn active_stop(&self) -> usize {
        self.active
    }

    pub fn builtin_presets(&self) -> &[Preset] {
        &self.builtin
    }

    pub fn custom_presets(&self) -> &CustomPresets {
        &self.custom
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Outcome of the most recent state save, if any.
    pub fn last_save(&self) -> Option<SaveOutcome> {
        self.last_save
    }

    /// Whether a debounced save or reorder is waiting to run.
    pub fn has_pending(&self) -> bool {
        self.save_debounce.is_pending() || self.reorder_debounce.is_pending()
    }

    // ------------------------------------------------------------------------
    // Settling
    // ------------------------------------------------------------------------

    /// Runs the debounced actions whose delay has passed by `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.reorder_debounce.poll(now) {
            self.reorder();
        }
        if self.save_debounce.poll(now) {
            self.commit();
        }
    }

    /// Runs every pending debounced action immediately.
    pub fn flush(&mut self) {
        if self.reorder_debounce.flush() {
            self.reorder();
        }
        if self.save_debounce.flush() {
            self.commit();
        }
    }

    fn reorder(&mut self) {
        stops::reorder_stops(&mut self.gradient, &mut self.active);
        self.commit();
    }

    /// Saves the live gradient now, superseding a pending debounced save.
    fn commit(&mut self) {
        self.save_debounce.cancel();
        self.last_save = Some(store::save_state(&mut self.storage, &self.gradient));
    }

    /// Re-sorts now if a moved stop is still waiting for its reorder.
    fn settle_reorder(&mut self) {
        if self.reorder_debounce.flush() {
            stops::reorder_stops(&mut self.gradient, &mut self.active);
        }
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        let len = self.gradient.stops().len();
        if index < len {
            Ok(())
        } else {
            Err(EditError::StopIndex { index, len })
        }
    }

    // ------------------------------------------------------------------------
    // Field edits
    // ------------------------------------------------------------------------

    /// Switches the gradient type. Unrecognized names are ignored.
    ///
    /// Focus returns to the first stop.
    pub fn set_type(&mut self, value: impl Into<Value>) {
        let value: Value = value.into();
        let Some(kind) = value.as_str().and_then(GradientType::parse) else {
            log::warn!("ignoring unknown gradient type {value}");
            return;
        };
        self.settle_reorder();
        self.gradient.set_kind(kind);
        self.active = 0;
        self.commit();
    }

    /// Sets the radial shape; anything but `"circle"` means ellipse.
    pub fn set_shape(&mut self, value: impl Into<Value>) {
        let value: Value = value.into();
        let shape = match value.as_str() {
            Some("circle") => RadialShape::Circle,
            _ => RadialShape::Ellipse,
        };
        self.settle_reorder();
        self.gradient.set_shape(shape);
        self.commit();
    }

    pub fn set_angle(&mut self, value: impl Into<Value>, now: Instant) {
        let current = i64::from(self.gradient.angle());
        let angle = clamp_number(&value.into(), 0, ANGLE_MAX.into(), current);
        self.gradient.set_angle(angle as u16);
        self.save_debounce.trigger(now);
    }

    pub fn set_blur(&mut self, value: impl Into<Value>, now: Instant) {
        let current = i64::from(self.gradient.blur());
        let blur = clamp_number(&value.into(), 0, BLUR_MAX.into(), current);
        self.gradient.set_blur(blur as u8);
        self.save_debounce.trigger(now);
    }

    pub fn set_noise(&mut self, value: impl Into<Value>, now: Instant) {
        let current = i64::from(self.gradient.noise());
        let noise = clamp_number(&value.into(), 0, NOISE_MAX.into(), current);
        self.gradient.set_noise(noise as u8);
        self.save_debounce.trigger(now);
    }

    /// Focuses the stop at `index`.
    pub fn select_stop(&mut self, index: usize) -> Result<(), EditError> {
        self.check_index(index)?;
        self.active = index;
        Ok(())
    }

    /// Recolors the stop at `index` and focuses it.
    ///
    /// Returns `false`, leaving the color unchanged, if `value` is not a hex
    /// color.
    pub fn set_stop_color(
        &mut self,
        index: usize,
        value: impl Into<Value>,
        now: Instant,
    ) -> Result<bool, EditError> {
        self.check_index(index)?;
        self.active = index;

        let value: Value = value.into();
        let Some(color) = value.as_str().and_then(normalize_hex) else {
            return Ok(false);
        };
        self.gradient.stops_mut()[index].set_color(color);
        self.save_debounce.trigger(now);
        Ok(true)
    }

    /// Moves the stop at `index` and focuses it.
    ///
    /// The list is re-sorted once the position input settles, so until the
    /// next [`tick`](Self::tick) past the reorder delay [`gradient`](Self::gradient)
    /// may list the stops out of order. Output and persistence always see
    /// them sorted.
    pub fn set_stop_position(
        &mut self,
        index: usize,
        value: impl Into<Value>,
        now: Instant,
    ) -> Result<(), EditError> {
        self.check_index(index)?;
        self.active = index;

        let stop = &mut self.gradient.stops_mut()[index];
        let pos = clamp_number(&value.into(), 0, POSITION_MAX.into(), i64::from(stop.pos()));
        stop.set_pos(pos as u8);
        self.reorder_debounce.trigger(now);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Stop list
    // ------------------------------------------------------------------------

    pub fn add_stop(&mut self) {
        self.settle_reorder();
        stops::add_stop(&mut self.gradient, &mut self.active);
        self.commit();
    }

    pub fn remove_stop(&mut self, index: usize) -> Result<(), EditError> {
        self.settle_reorder();
        if let Err(err) = stops::remove_stop(&mut self.gradient, &mut self.active, index) {
            log::warn!("refused to remove stop {index}: {err}");
            return Err(err);
        }
        self.commit();
        Ok(())
    }

    pub fn reverse_stops(&mut self) {
        self.settle_reorder();
        stops::reverse_stops(&mut self.gradient, &mut self.active);
        self.commit();
    }

    /// Spreads the stops evenly in their current list order.
    ///
    /// A pending reorder is dropped rather than applied first, so a stop
    /// dragged past its neighbors keeps its list slot.
    pub fn distribute_stops(&mut self) -> Result<(), EditError> {
        stops::distribute_stops(&mut self.gradient)?;
        self.reorder_debounce.cancel();
        self.gradient.sort_stops();
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Presets, palettes, randomize
    // ------------------------------------------------------------------------

    /// Applies a preset by name, with blur and noise reset.
    ///
    /// Custom presets are searched before the built-ins.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), EditError> {
        let preset = self
            .custom
            .find(name)
            .or_else(|| {
                self.builtin
                    .iter()
                    .find(|p| same_name(p.name(), name))
            })
            .ok_or_else(|| EditError::UnknownPreset(name.to_string()))?;

        let mut candidate = preset.gradient().to_value();
        candidate["blur"] = json!(0);
        candidate["noise"] = json!(0);
        self.replace(&candidate);
        Ok(())
    }

    /// Saves the live gradient as a custom preset.
    ///
    /// Returns the stored name (suffixed if `name` was taken) and whether
    /// the list reached storage.
    pub fn save_preset(&mut self, name: &str) -> Result<(String, SaveOutcome), EditError> {
        self.settle_reorder();
        let stored = self.custom.create(name, &self.gradient)?.name().to_string();
        let outcome = store::save_custom_presets(&mut self.storage, &self.custom);
        Ok((stored, outcome))
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<SaveOutcome, EditError> {
        self.custom.delete(name)?;
        Ok(store::save_custom_presets(&mut self.storage, &self.custom))
    }

    /// Sets the active stop to a palette swatch.
    pub fn apply_palette_color(&mut self, palette: &str, swatch: &str) -> Result<HexColor, EditError> {
        let color = Palette::by_name(palette)?.color(swatch)?;
        self.settle_reorder();
        let index = stops::clamp_active(self.active, self.gradient.stops().len());
        self.gradient.stops_mut()[index].set_color(color.clone());
        self.commit();
        Ok(color)
    }

    /// Replaces the gradient with a random one.
    ///
    /// Picks a type and an angle in `[0, 360]`, then 3 to 5 random colors
    /// spread evenly. Shape, blur and noise are reset.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let kind = GradientType::ALL[rng.gen_range(0..GradientType::ALL.len())];
        let count: usize = rng.gen_range(3..=5);
        let stops: Vec<Value> = (0..count)
            .map(|i| {
                let color = HexColor::from_rgb_u32(rng.gen_range(0..0xFF_FFFF));
                let pos = (i as f64 / (count - 1) as f64 * 100.0).round();
                json!({ "color": color, "pos": pos })
            })
            .collect();

        self.replace(&json!({
            "type": kind,
            "angle": rng.gen_range(0..=ANGLE_MAX),
            "shape": RadialShape::Ellipse,
            "stops": stops,
            "blur": 0,
            "noise": 0
        }));
    }

    fn replace(&mut self, candidate: &Value) {
        self.reorder_debounce.cancel();
        apply_sanitized_state(&mut self.gradient, candidate);
        self.active = 0;
        self.commit();
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// The CSS declaration for the live gradient.
    ///
    /// Output methods see the stops in position order even while a moved
    /// stop is waiting for its reorder.
    pub fn css(&self) -> String {
        generate_css(&self.gradient.sorted())
    }

    /// The body of the exported `gradient.css` file.
    pub fn css_file(&self) -> String {
        css_file_contents(&self.gradient.sorted())
    }

    /// A standalone SVG document of the given size.
    pub fn svg(&self, width: f64, height: f64) -> String {
        generate_svg(&self.gradient.sorted(), width, height)
    }

    /// Black or white, whichever reads better over the preview.
    pub fn label_color(&self) -> HexColor {
        preview_label_color(&self.gradient.sorted())
    }

    pub fn export<R: Rng + ?Sized>(
        &self,
        format: ExportFormat,
        resolution: Resolution,
        rng: &mut R,
    ) -> Result<Artifact, ExportError> {
        export::export(&self.gradient.sorted(), format, resolution, rng)
    }
}

impl<S: Storage> Configurable for GradientEditor<S> {
    fn apply_state(&mut self, candidate: &Value) {
        self.reorder_debounce.cancel();
        apply_sanitized_state(&mut self.gradient, candidate);
        self.active = stops::clamp_active(self.active, self.gradient.stops().len());
        self.commit();
    }

    fn export_state(&self) -> GradientDescriptor {
        self.gradient.sorted().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStorage, PRESETS_KEY, STATE_KEY};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stored_state(editor: &GradientEditor<MemoryStorage>) -> Option<GradientDescriptor> {
        let raw = editor.storage().get(STATE_KEY).unwrap()?;
        GradientDescriptor::from_json(&raw).ok()
    }

    fn editor_with_stops(stops: Value) -> GradientEditor<MemoryStorage> {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.apply_state(&json!({ "stops": stops }));
        editor
    }

    #[test]
    fn opens_with_stored_state() {
        let mut storage = MemoryStorage::new();
        storage.set(STATE_KEY, r#"{"type":"conic","angle":30}"#).unwrap();
        storage
            .set(PRESETS_KEY, r#"[{"name":"Dusk"},{"bad":true}]"#)
            .unwrap();

        let editor = GradientEditor::open(storage);
        assert_eq!(editor.gradient().kind(), GradientType::Conic);
        assert_eq!(editor.custom_presets().len(), 1);
        assert_eq!(editor.builtin_presets().len(), 6);
        assert_eq!(editor.active_stop(), 0);
    }

    #[test]
    fn slider_edits_save_after_settling() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        let t0 = Instant::now();

        editor.set_angle(10, t0);
        editor.set_angle("20", t0 + Duration::from_millis(100));
        editor.set_blur(5, t0 + Duration::from_millis(150));
        assert!(stored_state(&editor).is_none(), "nothing saved mid-drag");

        editor.tick(t0 + Duration::from_millis(300));
        assert!(stored_state(&editor).is_none(), "delay restarts on each edit");

        editor.tick(t0 + Duration::from_millis(350));
        let saved = stored_state(&editor).unwrap();
        assert_eq!((saved.angle(), saved.blur()), (20, 5));
        assert!(!editor.has_pending());
    }

    #[test]
    fn invalid_field_input_keeps_current_value() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        let now = Instant::now();
        editor.set_angle(45, now);
        editor.set_angle("", now);
        editor.set_angle("abc", now);
        assert_eq!(editor.gradient().angle(), 45);

        editor.set_noise(250, now);
        assert_eq!(editor.gradient().noise(), 100);

        editor.set_type("hexagonal");
        assert_eq!(editor.gradient().kind(), GradientType::Linear);
    }

    #[test]
    fn type_change_resets_focus_and_shape() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.set_type("radial");
        editor.set_shape("circle");
        editor.select_stop(1).unwrap();
        assert_eq!(editor.gradient().shape(), RadialShape::Circle);

        editor.set_type("linear");
        assert_eq!(editor.active_stop(), 0);
        assert_eq!(editor.gradient().shape(), RadialShape::Ellipse);
        assert_eq!(stored_state(&editor).unwrap().kind(), GradientType::Linear);
    }

    #[test]
    fn position_edit_reorders_after_settling() {
        let mut editor = editor_with_stops(json!([
            { "color": "#000", "pos": 0 },
            { "color": "#888", "pos": 50 },
            { "color": "#fff", "pos": 100 }
        ]));
        let t0 = Instant::now();
        editor.set_stop_position(0, 75, t0).unwrap();
        assert_eq!(editor.gradient().stops()[0].pos(), 75, "not sorted while dragging");

        editor.tick(t0 + Duration::from_millis(100));
        let positions: Vec<u8> = editor.gradient().stops().iter().map(|s| s.pos()).collect();
        assert_eq!(positions, vec![50, 75, 100]);
        assert_eq!(stored_state(&editor).unwrap().stops()[1].pos(), 75);
    }

    #[test]
    fn outputs_stay_sorted_while_dragging() {
        let mut editor = editor_with_stops(json!([
            { "color": "#000", "pos": 0 },
            { "color": "#888", "pos": 50 },
            { "color": "#fff", "pos": 100 }
        ]));
        let t0 = Instant::now();
        editor.set_stop_position(0, 90, t0).unwrap();

        assert_eq!(
            editor.css(),
            "background: linear-gradient(90deg, #888888 50%, #000000 90%, #FFFFFF 100%);"
        );
        assert!(editor.svg(10.0, 10.0).contains(
            r##"<stop offset="50%" stop-color="#888888"/><stop offset="90%" stop-color="#000000"/>"##
        ));
        let exported: Vec<u8> = editor.export_state().stops().iter().map(|s| s.pos()).collect();
        assert_eq!(exported, vec![50, 90, 100]);

        editor.set_shape("circle");
        let raw: Value = serde_json::from_str(&editor.storage().get(STATE_KEY).unwrap().unwrap()).unwrap();
        let stored: Vec<u64> = raw["stops"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["pos"].as_u64().unwrap())
            .collect();
        assert_eq!(stored, vec![50, 90, 100], "raw stored stops must be in order");
        assert!(!editor.has_pending());
    }

    #[test]
    fn stop_color_edit() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        let now = Instant::now();
        assert!(editor.set_stop_color(1, "f00", now).unwrap());
        assert_eq!(editor.active_stop(), 1);
        assert_eq!(editor.gradient().stops()[1].color().as_str(), "#FF0000");

        assert!(!editor.set_stop_color(1, "red", now).unwrap());
        assert_eq!(editor.gradient().stops()[1].color().as_str(), "#FF0000");
        assert!(matches!(
            editor.set_stop_color(9, "#000", now),
            Err(EditError::StopIndex { index: 9, len: 2 })
        ));
    }

    #[test]
    fn discrete_actions_save_immediately() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.add_stop();
        assert_eq!(stored_state(&editor).unwrap().stops().len(), 3);
        assert_eq!(editor.active_stop(), 1);

        editor.remove_stop(1).unwrap();
        assert_eq!(stored_state(&editor).unwrap().stops().len(), 2);
        assert_eq!(editor.remove_stop(0).unwrap_err().to_string(), "Minimum of 2 stops is required.");
        assert_eq!(editor.last_save(), Some(SaveOutcome::Persisted));
    }

    #[test]
    fn distribute_keeps_dragged_order() {
        let mut editor = editor_with_stops(json!([
            { "color": "#000", "pos": 0 },
            { "color": "#888", "pos": 50 },
            { "color": "#fff", "pos": 100 }
        ]));
        let now = Instant::now();
        editor.set_stop_position(0, 90, now).unwrap();
        editor.distribute_stops().unwrap();

        let layout: Vec<(&str, u8)> = editor
            .gradient()
            .stops()
            .iter()
            .map(|s| (s.color().as_str(), s.pos()))
            .collect();
        assert_eq!(layout, vec![("#000000", 0), ("#888888", 50), ("#FFFFFF", 100)]);
        assert!(!editor.has_pending());
    }

    #[test]
    fn preset_resets_effects_and_focus() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        let now = Instant::now();
        editor.set_blur(12, now);
        editor.set_noise(30, now);
        editor.select_stop(1).unwrap();

        editor.apply_preset("fire").unwrap();
        let g = editor.gradient();
        assert_eq!(g.kind(), GradientType::Radial);
        assert_eq!((g.blur(), g.noise()), (0, 0));
        assert_eq!(editor.active_stop(), 0);
        assert_eq!(stored_state(&editor).unwrap(), *g);
        assert!(!editor.has_pending());

        assert!(matches!(editor.apply_preset("Nope"), Err(EditError::UnknownPreset(_))));
    }

    #[test]
    fn custom_preset_lifecycle() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.apply_preset("Sunset").unwrap();
        let (name, outcome) = editor.save_preset("Sunset").unwrap();
        assert_eq!(name, "Sunset");
        assert!(outcome.is_persisted());
        let (name, _) = editor.save_preset("Sunset").unwrap();
        assert_eq!(name, "Sunset 2");

        // reopening restores the list
        let storage = editor.into_storage();
        let mut editor = GradientEditor::open(storage);
        assert_eq!(editor.custom_presets().len(), 2);

        editor.delete_preset("sunset 2").unwrap();
        assert_eq!(editor.custom_presets().len(), 1);
        assert!(editor.delete_preset("sunset 2").is_err());
    }

    #[test]
    fn preset_names_match_ignoring_case() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.apply_preset("ocean BLUE").unwrap();
        let ocean = editor.gradient().clone();

        editor.set_type("conic");
        editor.save_preset("Éclair").unwrap();
        editor.apply_preset("ÉCLAIR").unwrap();
        assert_eq!(editor.gradient().kind(), GradientType::Conic);

        editor.apply_preset("Ocean Blue").unwrap();
        assert_eq!(editor.gradient(), &ocean);
    }

    #[test]
    fn preset_save_reports_memory_only_on_quota() {
        let mut editor = GradientEditor::open(MemoryStorage::with_quota(64));
        let (_, outcome) = editor.save_preset("Keep").unwrap();
        assert_eq!(outcome, SaveOutcome::MemoryOnly);
        assert_eq!(editor.custom_presets().len(), 1, "list stays in memory");
    }

    #[test]
    fn palette_colors_active_stop() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.select_stop(1).unwrap();
        let color = editor.apply_palette_color("tailwind", "Rose").unwrap();
        assert_eq!(color.as_str(), "#F43F5E");
        assert_eq!(editor.gradient().stops()[1].color(), &color);
        assert!(editor.apply_palette_color("tailwind", "Chartreuse").is_err());
    }

    #[test]
    fn randomize_is_seeded_and_valid() {
        let mut a = GradientEditor::open(MemoryStorage::new());
        let mut b = GradientEditor::open(MemoryStorage::new());
        a.randomize(&mut StdRng::seed_from_u64(42));
        b.randomize(&mut StdRng::seed_from_u64(42));
        assert_eq!(a.gradient(), b.gradient());

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            a.randomize(&mut rng);
            let g = a.gradient();
            assert!((3..=5).contains(&g.stops().len()));
            assert_eq!(g.stops()[0].pos(), 0);
            assert_eq!(g.stops().last().unwrap().pos(), 100);
            assert_eq!(g.shape(), RadialShape::Ellipse);
            assert_eq!((g.blur(), g.noise()), (0, 0));
        }
    }

    #[test]
    fn flush_runs_pending_work() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        let now = Instant::now();
        editor.set_stop_position(0, 100, now).unwrap();
        editor.set_angle(12, now);
        editor.flush();

        let saved = stored_state(&editor).unwrap();
        assert_eq!(saved.angle(), 12);
        assert!(saved.stops().iter().all(|s| s.pos() == 100));
        assert!(!editor.has_pending());
    }

    #[test]
    fn export_uses_live_gradient() {
        let mut editor = GradientEditor::open(MemoryStorage::new());
        editor.apply_preset("Royal").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let css = editor
            .export(ExportFormat::Css, Resolution::HD_1080P, &mut rng)
            .unwrap();
        assert!(css.as_text().unwrap().contains("linear-gradient(45deg, #8E2DE2 0%, #4A00E0 100%)"));
        assert_eq!(editor.label_color().as_str(), "#FFFFFF");
    }
}
