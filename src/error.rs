//! Error types for cadrw

use std::io;
use thiserror::Error;

/// Main error type for cadrw operations
#[derive(Debug, Error)]
pub enum CadError {
    /// IO error occurred during stream operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The record stream ended before the requested primitive was complete.
    /// Carries the bit position for the binary backend, the line number
    /// for the text backend.
    #[error("Unexpected end of stream at position {0}")]
    UnexpectedEndOfStream(u64),

    /// A value could not be decoded as the shape its group code declares
    #[error("Malformed value: {0}")]
    Malformed(String),

    /// Unsupported drawing version for the requested operation
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// Group code outside any known range
    #[error("Invalid group code: {0}")]
    InvalidCode(i32),

    /// Invalid handle reference
    #[error("Invalid handle: {0:#X}")]
    InvalidHandle(u64),

    /// Entity type name or opcode with no constructor
    #[error("Invalid entity type: {0}")]
    InvalidEntityType(String),

    /// Text could not be represented in the target encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for cadrw operations
pub type Result<T> = std::result::Result<T, CadError>;

impl From<String> for CadError {
    fn from(s: String) -> Self {
        CadError::Custom(s)
    }
}

impl From<&str> for CadError {
    fn from(s: &str) -> Self {
        CadError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CadError::UnsupportedVersion("AC1006".to_string());
        assert_eq!(err.to_string(), "Unsupported version: AC1006");
    }

    #[test]
    fn test_end_of_stream_display() {
        let err = CadError::UnexpectedEndOfStream(131);
        assert!(err.to_string().contains("131"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let cad_err: CadError = io_err.into();
        assert!(matches!(cad_err, CadError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let err: CadError = "boom".into();
        assert!(matches!(err, CadError::Custom(_)));
    }
}
