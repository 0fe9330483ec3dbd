//! Model persistence errors.

/// Error type for model I/O
#[derive(Debug, thiserror::Error)]
pub enum ModelIoError {
    /// File or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes are not a valid model
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Model written by an unsupported format version
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Supported format version
        expected: u8,
        /// Version found in the data
        found: u8,
    },

    /// No model stored under this name
    #[error("Model not found: {0}")]
    NotFound(String),
}
