use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

/// Well-formedness failure reported by the XML parser adapter.
///
/// The document is never partially recovered: a `ParseError` means no
/// document exists at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Syntax-level failure with a position in the input text.
    #[error("{message} at line {line}, column {column}")]
    Syntax {
        message: String,
        line: u64,
        column: u64,
    },

    /// Structural failure without a useful position.
    #[error("{0}")]
    Malformed(String),
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, line: u64, column: u64) -> Self {
        ParseError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ParseError::Malformed(message.into())
    }

    /// Line of the failure, when the parser supplied one.
    pub fn line(&self) -> Option<u64> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Malformed(_) => None,
        }
    }

    /// Column of the failure, when the parser supplied one.
    pub fn column(&self) -> Option<u64> {
        match self {
            ParseError::Syntax { column, .. } => Some(*column),
            ParseError::Malformed(_) => None,
        }
    }
}

/// File store failure modes.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested file does not exist under the base directory.
    #[error("File not found")]
    NotFound,

    /// Empty filenames cannot be mapped to a path.
    #[error("filename must not be empty")]
    EmptyFileName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// Startup configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Invalid bind address: {address} - {reason}")]
    InvalidBindAddress { address: String, reason: String },

    #[error("Invalid CORS origin: {origin}")]
    InvalidOrigin { origin: String },
}

/// Request-boundary error enumeration.
///
/// Every handler failure is one of these kinds: malformed XML, a file store
/// failure (wrapped with the endpoint's message prefix), or a missing
/// required request field caught before any core logic runs. The display
/// string is exactly what goes into the JSON `message` field.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("XML Error: {0}")]
    Parse(#[from] ParseError),

    #[error("File not found")]
    NotFound,

    #[error("Error saving file: {0}")]
    Save(StoreError),

    #[error("Error loading file: {0}")]
    Load(StoreError),

    #[error("Error retrieving files: {0}")]
    List(StoreError),

    /// Full client-facing message, e.g. "XML content is required".
    #[error("{0}")]
    MissingField(&'static str),
}

impl ServiceError {
    /// HTTP status for the error response. Everything is a generic client
    /// error except the missing-file case.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Result alias for parser and formatter operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result alias for file store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
