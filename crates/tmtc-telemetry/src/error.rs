//! Error types for telemetry notation parsing

use thiserror::Error;

/// Errors that can occur while reading a telemetry table cell
///
/// These never escape the field parser: a malformed cell degrades to a
/// default value and parsing continues with the next row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// Length cell carries no digits
    #[error("invalid byte length: {0:?}")]
    InvalidLength(String),

    /// Byte sequence carries no byte number
    #[error("byte sequence has no byte number: {0:?}")]
    NoByteNumber(String),

    /// Bit range does not fit a 64-bit word
    #[error("bit range b{hi}-b{lo} out of range")]
    BitRange { hi: u32, lo: u32 },
}
