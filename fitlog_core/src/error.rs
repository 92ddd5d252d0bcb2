//! Error types for the fitlog_core library.

use crate::types::{Field, RecordId};
use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied workout data failed a field constraint
    #[error("Invalid value for field {field}")]
    Validation { field: Field },

    /// Positional access outside `[0, len)`
    #[error("Index {index} out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    /// Stable id that no longer (or never) referred to a record
    #[error("No record with id {0}")]
    UnknownRecord(RecordId),

    /// Durable storage exists but could not be read or parsed
    #[error("Failed to read {path:?}{}: {reason}", line_suffix(.line))]
    StorageRead {
        path: PathBuf,
        line: Option<usize>,
        reason: String,
    },

    /// Durable storage could not be written
    #[error("Failed to write {path:?}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl Error {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: Field) -> Self {
        Error::Validation { field }
    }

    /// Name of the offending field, if this is a validation failure
    pub fn field(&self) -> Option<Field> {
        match self {
            Error::Validation { field } => Some(*field),
            _ => None,
        }
    }
}
