//! Error types for unctb

use thiserror::Error;

/// Main error type for unctb operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Read of {width} bytes at position {position} exceeds buffer length {len}")]
    OutOfBounds {
        position: usize,
        width: usize,
        len: usize,
    },

    #[error("Unsupported field kind: {0}")]
    UnsupportedKind(String),

    #[error("Invalid PKG index: {0}")]
    InvalidPkg(String),

    #[error("Invalid localization data: {0}")]
    InvalidLocale(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Table {table}, row {row}, field {field}: {source}")]
    Decode {
        table: String,
        row: usize,
        field: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type alias for unctb operations
pub type Result<T> = std::result::Result<T, Error>;
