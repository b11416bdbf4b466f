//! Error types for rope operations

use thiserror::Error;

/// Result type for rope operations
pub type Result<T> = std::result::Result<T, RopeError>;

/// Errors that can occur in rope operations
#[derive(Error, Debug)]
pub enum RopeError {
    /// Index or offset outside the rope
    #[error("offset {offset} out of range for rope of length {len}")]
    OutOfRange { offset: usize, len: usize },

    /// Read failure from the byte source handed to `from_reader`
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed TOML configuration
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl RopeError {
    /// Create an out-of-range error
    pub fn out_of_range(offset: usize, len: usize) -> Self {
        Self::OutOfRange { offset, len }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
