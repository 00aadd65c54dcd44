//! Deployment runtime error types

use thiserror::Error;

/// Errors raised by the deployment runtime
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Blueprint error: {0}")]
    Blueprint(#[from] topoflow_core::BlueprintError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] topoflow_plugin::PluginError),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Unknown input: {0}")]
    UnknownInput(String),

    #[error("Input '{name}' does not satisfy type '{expected}'")]
    InputTypeMismatch { name: String, expected: String },

    #[error("Invalid state transition for {instance}: {from} -> {to}")]
    InvalidTransition {
        instance: String,
        from: String,
        to: String,
    },

    #[error("Workflow {workflow} failed on node '{node}': {message}")]
    WorkflowFailed {
        workflow: String,
        node: String,
        message: String,
    },

    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
