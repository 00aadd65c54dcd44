//! Plugin error types

use thiserror::Error;

/// Plugin dispatch errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Operation {operation} failed on {node}: {message}")]
    OperationFailed {
        node: String,
        operation: String,
        message: String,
    },

    #[error("Invalid operation input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
