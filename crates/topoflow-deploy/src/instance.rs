//! Node instances
//!
//! A node template resolves into one or more live node instances at
//! deployment time. Instances move through the lifecycle state machine
//! as the executor drives their operations; runtime properties written
//! by plugins are persisted with the instance.

use crate::error::{DeployError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use topoflow_plugin::{EXTERNAL_ID, OperationKind};

/// Lifecycle state of a node instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Uninitialized,
    Creating,
    Created,
    Configuring,
    Configured,
    Starting,
    Started,
    Stopping,
    Stopped,
    Deleting,
    Deleted,
    Failed,
}

impl InstanceState {
    /// Whether moving to `next` is a legal transition
    ///
    /// The forward chains are create -> configure -> start and
    /// stop -> delete. Stop is reachable from any state an aborted
    /// install can leave behind; the external-resource short circuit
    /// jumps straight to Started / Deleted. A Failed instance may
    /// restart its install chain (resume) or be torn down.
    pub fn can_transition_to(self, next: InstanceState) -> bool {
        use InstanceState::*;
        matches!(
            (self, next),
            (Uninitialized, Creating)
                | (Creating, Created)
                | (Created, Configuring)
                | (Configuring, Configured)
                | (Configured, Starting)
                | (Starting, Started)
                | (Started, Stopping)
                | (Created, Stopping)
                | (Configured, Stopping)
                | (Failed, Stopping)
                | (Failed, Creating)
                | (Stopping, Stopped)
                | (Stopped, Deleting)
                | (Deleting, Deleted)
                // use_external_resource short circuits
                | (Uninitialized, Started)
                | (Started, Deleted)
                | (Failed, Deleted)
                | (_, Failed)
        )
    }

    /// The (in-progress, completed) states for an operation
    pub fn for_operation(kind: OperationKind) -> (InstanceState, InstanceState) {
        match kind {
            OperationKind::Create => (InstanceState::Creating, InstanceState::Created),
            OperationKind::Configure => (InstanceState::Configuring, InstanceState::Configured),
            OperationKind::Start => (InstanceState::Starting, InstanceState::Started),
            OperationKind::Stop => (InstanceState::Stopping, InstanceState::Stopped),
            OperationKind::Delete => (InstanceState::Deleting, InstanceState::Deleted),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Uninitialized => "uninitialized",
            InstanceState::Creating => "creating",
            InstanceState::Created => "created",
            InstanceState::Configuring => "configuring",
            InstanceState::Configured => "configured",
            InstanceState::Starting => "starting",
            InstanceState::Started => "started",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::Deleting => "deleting",
            InstanceState::Deleted => "deleted",
            InstanceState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A live node instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInstance {
    /// Instance id: `<template>_<5 char suffix>`
    pub id: String,

    /// Name of the node template this instance was resolved from
    pub template: String,

    /// Node type of the template
    pub node_type: String,

    /// Current lifecycle state
    pub state: InstanceState,

    /// Runtime properties written by plugins (external_id, addresses, ...)
    pub runtime_properties: HashMap<String, serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NodeInstance {
    pub fn new(template: impl Into<String>, node_type: impl Into<String>) -> Self {
        let template = template.into();
        let now = Utc::now();
        Self {
            id: format!("{}_{}", template, instance_suffix(&template)),
            template,
            node_type: node_type.into(),
            state: InstanceState::Uninitialized,
            runtime_properties: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to the next lifecycle state
    pub fn set_state(&mut self, next: InstanceState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(DeployError::InvalidTransition {
                instance: self.id.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the instance as failed (always legal)
    pub fn mark_failed(&mut self) {
        self.state = InstanceState::Failed;
        self.updated_at = Utc::now();
    }

    /// The provisioned resource id, if any
    pub fn external_id(&self) -> Option<&str> {
        self.runtime_properties
            .get(EXTERNAL_ID)
            .and_then(|v| v.as_str())
    }
}

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 5 hex chars derived from template name, time and a process counter
fn instance_suffix(template: &str) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    template.hash(&mut hasher);
    Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .hash(&mut hasher);
    INSTANCE_COUNTER
        .fetch_add(1, Ordering::Relaxed)
        .hash(&mut hasher);
    format!("{:05x}", hasher.finish() & 0xf_ffff)
}
