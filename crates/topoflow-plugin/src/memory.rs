//! In-memory plugin
//!
//! Provisions resources into an in-process table instead of a cloud API.
//! Used for dry-run installs and for executor tests: it records every
//! invocation and can be told to fail a specific operation.

use crate::context::NodeContext;
use crate::error::{PluginError, Result};
use crate::plugin::{OperationKind, OperationRequest, Plugin};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Record of a single plugin invocation
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    pub implementation: String,
    pub kind: OperationKind,
    pub node_name: String,
    pub instance_id: String,
    pub at: DateTime<Utc>,
}

/// A resource held in the in-memory table
#[derive(Debug, Clone)]
pub struct MemoryResource {
    pub external_id: String,
    pub node_name: String,
    pub resource_type: String,
    pub running: bool,
}

#[derive(Default)]
struct MemoryState {
    resources: HashMap<String, MemoryResource>,
    invocations: Vec<InvocationRecord>,
    failures: Vec<(String, OperationKind)>,
    counter: u64,
}

/// In-memory plugin
pub struct MemoryPlugin {
    name: String,
    state: Mutex<MemoryState>,
}

impl MemoryPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Make a specific node's operation fail (failure-path testing)
    pub async fn fail_on(&self, node_name: impl Into<String>, kind: OperationKind) {
        let mut state = self.state.lock().await;
        state.failures.push((node_name.into(), kind));
    }

    /// Remove all injected failures
    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// All invocations so far, in dispatch order
    pub async fn invocations(&self) -> Vec<InvocationRecord> {
        self.state.lock().await.invocations.clone()
    }

    /// Currently provisioned resources
    pub async fn resources(&self) -> Vec<MemoryResource> {
        let state = self.state.lock().await;
        let mut resources: Vec<MemoryResource> = state.resources.values().cloned().collect();
        resources.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        resources
    }
}

#[async_trait]
impl Plugin for MemoryPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &OperationRequest, ctx: &mut NodeContext) -> Result<()> {
        let mut state = self.state.lock().await;

        state.invocations.push(InvocationRecord {
            implementation: request.implementation.clone(),
            kind: request.kind,
            node_name: ctx.node_name.clone(),
            instance_id: ctx.instance_id.clone(),
            at: Utc::now(),
        });

        if state
            .failures
            .iter()
            .any(|(node, kind)| *node == ctx.node_name && *kind == request.kind)
        {
            return Err(PluginError::OperationFailed {
                node: ctx.node_name.clone(),
                operation: request.kind.to_string(),
                message: "injected failure".to_string(),
            });
        }

        debug!(
            plugin = %self.name,
            task = %request.task(),
            instance = %ctx.instance_id,
            "Invoking memory operation"
        );

        match request.kind {
            OperationKind::Create => {
                state.counter += 1;
                let external_id = format!("mem-{:06}", state.counter);
                let address = format!("10.0.0.{}", state.counter);
                state.resources.insert(
                    external_id.clone(),
                    MemoryResource {
                        external_id: external_id.clone(),
                        node_name: ctx.node_name.clone(),
                        resource_type: ctx.node_type.clone(),
                        running: false,
                    },
                );
                ctx.set_external_resource(
                    external_id,
                    ctx.node_type.clone(),
                    Some(ctx.instance_id.clone()),
                );
                // Synthetic address so get_attribute has something to resolve
                ctx.set_runtime_property("ip", serde_json::Value::String(address));
            }
            OperationKind::Configure => {
                ctx.set_runtime_property("configured", serde_json::Value::Bool(true));
            }
            OperationKind::Start => {
                let external_id = ctx
                    .external_id()
                    .ok_or_else(|| PluginError::ResourceNotFound(ctx.instance_id.clone()))?;
                let resource = state
                    .resources
                    .get_mut(external_id)
                    .ok_or_else(|| PluginError::ResourceNotFound(external_id.to_string()))?;
                resource.running = true;
            }
            OperationKind::Stop => {
                if let Some(external_id) = ctx.external_id() {
                    if let Some(resource) = state.resources.get_mut(external_id) {
                        resource.running = false;
                    }
                }
            }
            OperationKind::Delete => {
                if let Some(external_id) = ctx.external_id() {
                    state.resources.remove(external_id);
                }
                ctx.clear_external_resource();
            }
        }

        Ok(())
    }
}
