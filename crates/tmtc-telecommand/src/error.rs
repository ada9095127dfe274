//! Error types for telecommand table parsing

use thiserror::Error;

/// Errors that can occur while parsing telecommand tables
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Cell is not a one or two digit hex byte
    #[error("invalid hex byte: {0:?}")]
    InvalidHexByte(String),

    /// Cell carries no run of binary digits, or too many
    #[error("invalid binary field: {0:?}")]
    InvalidBinaryField(String),

    /// A column required by the table type was not found
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Result type for telecommand parsing
pub type Result<T> = std::result::Result<T, ParseError>;
