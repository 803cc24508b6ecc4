//! Layered error definitions
//!
//! Categorized by source: config / source / write

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// The point source failed or ended without a proper end marker
    #[error("point source error: {message}")]
    SourceRead {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A point could not be appended to a batch
    #[error("malformed point: {message}")]
    MalformedPoint { message: String },

    // ===== Write Errors =====
    /// Batch write failed after the retry budget was spent
    #[error("worker {worker} write error: {message}")]
    Write { worker: usize, message: String },

    /// Processor used before `init`
    #[error("processor for worker {worker} is not initialized")]
    NotInitialized { worker: usize },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source read error wrapping an IO failure
    pub fn source_read(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::SourceRead {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create malformed point error
    pub fn malformed_point(message: impl Into<String>) -> Self {
        Self::MalformedPoint {
            message: message.into(),
        }
    }

    /// Create batch write error
    pub fn write(worker: usize, message: impl Into<String>) -> Self {
        Self::Write {
            worker,
            message: message.into(),
        }
    }
}
