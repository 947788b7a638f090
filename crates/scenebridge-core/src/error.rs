//! Error types for the bridge core
use std::path::PathBuf;
use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// The configured channel lies beyond the packet's slot data
    #[error("Channel index {index} out of range for payload of {len} slots")]
    ChannelOutOfRange {
        /// 0-based channel index that was requested
        index: usize,
        /// Number of slots in the payload
        len: usize,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("Failed to read config {path:?}: {source}")]
    ConfigRead {
        /// Path of the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
