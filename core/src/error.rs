//! Error types for loadgen-core

use thiserror::Error;

use crate::driver::DriverError;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection pool construction failed. This is fatal to the run:
    /// a partial pool would silently change the offered load, so no
    /// traffic is generated.
    #[error("creating connection {index} failed: {source}")]
    ConnectionSetup {
        /// Index of the connection whose creation failed.
        index: usize,
        /// The underlying driver failure.
        source: DriverError,
    },

    /// Driver error outside pool construction
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Configuration error for a required builder field that was not set.
    pub fn missing_config(field: &str) -> Self {
        CoreError::Config(format!("missing required field: {field}"))
    }
}

/// Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
