//! Plugin trait definition

use crate::context::NodeContext;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle operation kinds driven by the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Configure,
    Start,
    Stop,
    Delete,
}

impl OperationKind {
    /// Operations run during install, in order
    pub const INSTALL: &'static [OperationKind] = &[
        OperationKind::Create,
        OperationKind::Configure,
        OperationKind::Start,
    ];

    /// Operations run during uninstall, in order
    pub const UNINSTALL: &'static [OperationKind] =
        &[OperationKind::Stop, OperationKind::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Configure => "configure",
            OperationKind::Start => "start",
            OperationKind::Stop => "stop",
            OperationKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single operation dispatch to a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Dotted implementation path; the first segment names the plugin
    /// (e.g. "openstack.nova_plugin.server.create")
    pub implementation: String,

    /// Operation kind
    pub kind: OperationKind,

    /// Operation inputs, already resolved to plain JSON
    pub inputs: HashMap<String, serde_json::Value>,
}

impl OperationRequest {
    pub fn new(implementation: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            implementation: implementation.into(),
            kind,
            inputs: HashMap::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: HashMap<String, serde_json::Value>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Plugin name (first dotted segment of the implementation path)
    pub fn plugin_name(&self) -> &str {
        self.implementation.split('.').next().unwrap_or("")
    }

    /// Task path within the plugin (implementation without the plugin prefix)
    pub fn task(&self) -> &str {
        self.implementation
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or("")
    }
}

/// Plugin abstraction trait
///
/// Blueprints reference lifecycle implementations by dotted path; the
/// executor resolves the first segment against the registry and invokes
/// the matching plugin with the node's context. Plugins communicate
/// provisioned state back through the context's runtime properties.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Returns the plugin name (e.g. "openstack", "memory")
    fn name(&self) -> &str;

    /// Invoke a single lifecycle operation against the node context
    async fn invoke(&self, request: &OperationRequest, ctx: &mut NodeContext) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_request_paths() {
        let request = OperationRequest::new(
            "openstack.nova_plugin.server.create",
            OperationKind::Create,
        );
        assert_eq!(request.plugin_name(), "openstack");
        assert_eq!(request.task(), "nova_plugin.server.create");
    }

    #[test]
    fn test_install_uninstall_sequences() {
        assert_eq!(OperationKind::INSTALL.len(), 3);
        assert_eq!(OperationKind::INSTALL[0], OperationKind::Create);
        assert_eq!(OperationKind::UNINSTALL.last(), Some(&OperationKind::Delete));
    }
}
