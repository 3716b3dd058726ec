//! CLI errors and their exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: edit refused (minimum stops, unknown stop, preset or palette)
//! - 11: I/O error (reading an import file, writing an export)
//! - 12: input error (malformed JSON)
//! - 13: export error (SVG decode, surface allocation, encoding)

use std::fmt;

use gradient_studio::{EditError, ExportError};

pub enum CliError {
    Edit(EditError),
    Io(String),
    Input(String),
    Export(ExportError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Edit(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Export(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Edit(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Export(e) => write!(f, "{e}"),
        }
    }
}

impl From<EditError> for CliError {
    fn from(e: EditError) -> Self {
        CliError::Edit(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Io(io) => CliError::Io(format!("Error writing export: {io}")),
            other => CliError::Export(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(e.to_string())
    }
}
