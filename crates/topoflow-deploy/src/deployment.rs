//! Deployments
//!
//! A deployment binds a blueprint to concrete input values and holds
//! the set of node instances derived from its templates. Instances are
//! keyed by id in a BTreeMap so iteration and persistence stay
//! deterministic.

use crate::error::{DeployError, Result};
use crate::instance::{InstanceState, NodeInstance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use topoflow_core::{AttributeLookup, Blueprint};

/// A deployment of a blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment name (also the persistence key)
    pub name: String,

    /// Blueprint name this deployment was created from
    pub blueprint: String,

    /// Fully merged input values (user supplied + defaults)
    pub inputs: HashMap<String, serde_json::Value>,

    /// Node instances keyed by instance id
    pub instances: BTreeMap<String, NodeInstance>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deployment {
    /// Create a deployment: merge inputs against the blueprint's input
    /// definitions and expand each template into its planned instances
    pub fn create(
        name: impl Into<String>,
        blueprint: &Blueprint,
        inputs: HashMap<String, serde_json::Value>,
    ) -> Result<Self> {
        let inputs = merge_inputs(blueprint, inputs)?;

        let mut instances = BTreeMap::new();
        for (template_name, template) in &blueprint.node_templates {
            for _ in 0..blueprint.planned_instances(template_name) {
                let instance = NodeInstance::new(template_name, &template.type_name);
                instances.insert(instance.id.clone(), instance);
            }
        }

        let now = Utc::now();
        Ok(Self {
            name: name.into(),
            blueprint: blueprint.name.clone(),
            inputs,
            instances,
            created_at: now,
            updated_at: now,
        })
    }

    /// All instances of a given template, in id order
    pub fn instances_of(&self, template: &str) -> impl Iterator<Item = &NodeInstance> {
        self.instances.values().filter(move |i| i.template == template)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Validate user inputs against the blueprint and fill in defaults
fn merge_inputs(
    blueprint: &Blueprint,
    supplied: HashMap<String, serde_json::Value>,
) -> Result<HashMap<String, serde_json::Value>> {
    for name in supplied.keys() {
        if !blueprint.inputs.contains_key(name) {
            return Err(DeployError::UnknownInput(name.clone()));
        }
    }

    let mut merged = HashMap::new();
    for (name, def) in &blueprint.inputs {
        let value = match supplied.get(name) {
            Some(v) => v.clone(),
            None => match &def.default {
                Some(default) => default.to_json()?,
                None => return Err(DeployError::MissingInput(name.clone())),
            },
        };
        if let Some(expected) = &def.type_name
            && !expected.matches(&value)
        {
            return Err(DeployError::InputTypeMismatch {
                name: name.clone(),
                expected: expected.as_str().to_string(),
            });
        }
        merged.insert(name.clone(), value);
    }
    Ok(merged)
}

impl AttributeLookup for Deployment {
    /// Look up a runtime property on an instance of the named template
    ///
    /// Prefers a Started instance (only those carry settled runtime
    /// state); falls back to the first instance in id order.
    fn attribute(&self, node: &str, path: &[String]) -> Option<serde_json::Value> {
        let instance = self
            .instances_of(node)
            .find(|i| i.state == InstanceState::Started)
            .or_else(|| self.instances_of(node).next())?;
        let root = instance.runtime_properties.get(path.first()?)?;
        walk(root, &path[1..]).cloned()
    }
}

pub(crate) fn walk<'a>(
    value: &'a serde_json::Value,
    path: &[String],
) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
