//! Node operation context
//!
//! The context handed to a plugin for one lifecycle operation. Runtime
//! properties written here are persisted with the node instance and are
//! what `get_attribute` resolves against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime property key for the provisioned resource id
pub const EXTERNAL_ID: &str = "external_id";
/// Runtime property key for the provisioned resource type
pub const EXTERNAL_TYPE: &str = "external_type";
/// Runtime property key for the provisioned resource name
pub const EXTERNAL_NAME: &str = "external_name";

/// Context for a single node instance operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeContext {
    /// Node template name
    pub node_name: String,

    /// Node instance id
    pub instance_id: String,

    /// Node type (e.g. "topoflow.nodes.Server")
    pub node_type: String,

    /// Node properties, evaluated to plain JSON before dispatch
    pub properties: HashMap<String, serde_json::Value>,

    /// Mutable runtime properties, persisted with the instance
    pub runtime_properties: HashMap<String, serde_json::Value>,
}

impl NodeContext {
    pub fn new(
        node_name: impl Into<String>,
        instance_id: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            instance_id: instance_id.into(),
            node_type: node_type.into(),
            properties: HashMap::new(),
            runtime_properties: HashMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: HashMap<String, serde_json::Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Get a node property
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// The provisioned resource id, if any
    pub fn external_id(&self) -> Option<&str> {
        self.runtime_properties
            .get(EXTERNAL_ID)
            .and_then(|v| v.as_str())
    }

    /// Record the provisioned resource in the runtime properties
    pub fn set_external_resource(
        &mut self,
        id: impl Into<String>,
        resource_type: impl Into<String>,
        name: Option<String>,
    ) {
        self.runtime_properties
            .insert(EXTERNAL_ID.to_string(), serde_json::Value::String(id.into()));
        self.runtime_properties.insert(
            EXTERNAL_TYPE.to_string(),
            serde_json::Value::String(resource_type.into()),
        );
        if let Some(name) = name {
            self.runtime_properties
                .insert(EXTERNAL_NAME.to_string(), serde_json::Value::String(name));
        }
    }

    /// Clear the provisioned-resource keys after deletion
    pub fn clear_external_resource(&mut self) {
        self.runtime_properties.remove(EXTERNAL_ID);
        self.runtime_properties.remove(EXTERNAL_TYPE);
        self.runtime_properties.remove(EXTERNAL_NAME);
    }

    /// Set an arbitrary runtime property
    pub fn set_runtime_property(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.runtime_properties.insert(key.into(), value);
    }
}
