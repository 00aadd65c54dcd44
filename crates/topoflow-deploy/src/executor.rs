//! Workflow executor
//!
//! Drives node instances through the lifecycle operations in dependency
//! order. Nodes in the same dependency level run concurrently; install
//! walks create -> configure -> start, uninstall walks stop -> delete
//! over the reversed levels. Nodes marked `use_external_resource` skip
//! their plugin operations entirely.

use crate::deployment::{Deployment, walk};
use crate::error::{DeployError, Result};
use crate::instance::{InstanceState, NodeInstance};
use futures_util::future;
use std::collections::HashMap;
use topoflow_core::{AttributeLookup, Blueprint, DependencyGraph, EvalContext, Operation};
use topoflow_plugin::{
    EXTERNAL_ID, EXTERNAL_TYPE, NodeContext, OperationKind, OperationRequest, PluginRegistry,
};
use tracing::instrument;

/// Result of running a workflow over a deployment
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    /// Workflow name (install / uninstall)
    pub workflow: String,

    /// Instance ids that completed every operation
    pub succeeded: Vec<String>,

    /// Instance ids that were short-circuited (external resources,
    /// already-deleted instances)
    pub skipped: Vec<String>,

    /// (instance id, message) pairs for failed instances
    pub failed: Vec<(String, String)>,
}

impl WorkflowReport {
    fn new(workflow: &str) -> Self {
        Self {
            workflow: workflow.to_string(),
            succeeded: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn the report into an error if any instance failed
    pub fn into_result(self) -> Result<WorkflowReport> {
        match self.failed.first() {
            Some((node, message)) => Err(DeployError::WorkflowFailed {
                workflow: self.workflow.clone(),
                node: node.clone(),
                message: message.clone(),
            }),
            None => Ok(self),
        }
    }
}

/// Per-instance outcome inside a level
enum Outcome {
    Succeeded,
    Skipped,
    Failed(String),
}

/// Lifecycle workflow executor
pub struct Executor<'a> {
    blueprint: &'a Blueprint,
    registry: &'a PluginRegistry,
}

impl<'a> Executor<'a> {
    pub fn new(blueprint: &'a Blueprint, registry: &'a PluginRegistry) -> Self {
        Self {
            blueprint,
            registry,
        }
    }

    /// Run the install workflow (create -> configure -> start)
    ///
    /// Stops before the next level as soon as any instance in the
    /// current level fails; later instances stay uninitialized.
    #[instrument(skip(self, deployment), fields(deployment = %deployment.name))]
    pub async fn install(&self, deployment: &mut Deployment) -> Result<WorkflowReport> {
        let graph = DependencyGraph::build(self.blueprint)?;
        let levels = graph.levels()?;

        let mut report = WorkflowReport::new("install");
        for level in &levels {
            self.run_level(deployment, level, OperationKind::INSTALL, false, &mut report)
                .await;
            if !report.is_success() {
                tracing::error!(
                    "Install aborted: {} instance(s) failed",
                    report.failed.len()
                );
                break;
            }
        }
        Ok(report)
    }

    /// Run the uninstall workflow (stop -> delete) over reversed levels
    ///
    /// Best effort: a failing node is recorded but never blocks the
    /// teardown of the remaining nodes.
    #[instrument(skip(self, deployment), fields(deployment = %deployment.name))]
    pub async fn uninstall(&self, deployment: &mut Deployment) -> Result<WorkflowReport> {
        let graph = DependencyGraph::build(self.blueprint)?;
        let mut levels = graph.levels()?;
        levels.reverse();

        let mut report = WorkflowReport::new("uninstall");
        for level in &levels {
            self.run_level(deployment, level, OperationKind::UNINSTALL, true, &mut report)
                .await;
        }
        Ok(report)
    }

    /// Run one dependency level: every instance of the level's
    /// templates runs its operation chain concurrently
    async fn run_level(
        &self,
        deployment: &mut Deployment,
        level: &[String],
        kinds: &[OperationKind],
        best_effort: bool,
        report: &mut WorkflowReport,
    ) {
        // Snapshot for get_attribute lookups against other nodes
        let snapshot = deployment.clone();

        let ids: Vec<String> = deployment
            .instances
            .values()
            .filter(|i| level.contains(&i.template))
            .map(|i| i.id.clone())
            .collect();

        let mut batch = Vec::new();
        for id in &ids {
            if let Some(instance) = deployment.instances.remove(id) {
                batch.push(instance);
            }
        }

        let futures = batch
            .into_iter()
            .map(|instance| self.run_instance(instance, &snapshot, kinds, best_effort));
        let results = future::join_all(futures).await;

        for (instance, outcome) in results {
            match outcome {
                Outcome::Succeeded => report.succeeded.push(instance.id.clone()),
                Outcome::Skipped => report.skipped.push(instance.id.clone()),
                Outcome::Failed(message) => {
                    tracing::error!("Instance '{}' failed: {}", instance.id, message);
                    report.failed.push((instance.id.clone(), message));
                }
            }
            deployment.instances.insert(instance.id.clone(), instance);
        }
        deployment.touch();
    }

    /// Drive one instance through the operation chain
    async fn run_instance(
        &self,
        mut instance: NodeInstance,
        snapshot: &Deployment,
        kinds: &[OperationKind],
        best_effort: bool,
    ) -> (NodeInstance, Outcome) {
        let Some(template) = self.blueprint.node_templates.get(&instance.template) else {
            let message = format!("Unknown node template '{}'", instance.template);
            return (instance, Outcome::Failed(message));
        };

        let installing = kinds.contains(&OperationKind::Create);

        // Resume: already-started instances have nothing left to install
        if installing && instance.state == InstanceState::Started {
            return (instance, Outcome::Skipped);
        }

        // Instances that never got installed have nothing to tear down
        if !installing
            && matches!(
                instance.state,
                InstanceState::Uninitialized | InstanceState::Deleted
            )
        {
            return (instance, Outcome::Skipped);
        }

        if template.uses_external_resource() {
            let outcome = self.short_circuit_external(&mut instance, template, installing);
            return (instance, outcome);
        }

        for &kind in kinds {
            let (in_progress, done) = InstanceState::for_operation(kind);
            if let Err(e) = instance.set_state(in_progress) {
                instance.mark_failed();
                return (instance, Outcome::Failed(e.to_string()));
            }

            if let Some(operation) = template.lifecycle_operation(kind.as_str()) {
                tracing::debug!(
                    "Invoking {} on '{}' ({})",
                    kind,
                    instance.id,
                    operation.implementation()
                );
                if let Err(message) = self
                    .invoke_operation(&mut instance, template, operation, kind, snapshot)
                    .await
                {
                    if best_effort && kind == OperationKind::Stop {
                        tracing::warn!(
                            "Stop failed on '{}', continuing teardown: {}",
                            instance.id,
                            message
                        );
                    } else {
                        instance.mark_failed();
                        return (instance, Outcome::Failed(message));
                    }
                }
            }

            if let Err(e) = instance.set_state(done) {
                instance.mark_failed();
                return (instance, Outcome::Failed(e.to_string()));
            }
        }
        (instance, Outcome::Succeeded)
    }

    /// Handle a `use_external_resource` node without touching plugins
    fn short_circuit_external(
        &self,
        instance: &mut NodeInstance,
        template: &topoflow_core::NodeTemplate,
        installing: bool,
    ) -> Outcome {
        if installing {
            let Some(resource_id) = template.resource_id() else {
                instance.mark_failed();
                return Outcome::Failed(format!(
                    "Node '{}' uses an external resource but has no resource_id",
                    instance.template
                ));
            };
            instance
                .runtime_properties
                .insert(EXTERNAL_ID.to_string(), serde_json::json!(resource_id));
            instance.runtime_properties.insert(
                EXTERNAL_TYPE.to_string(),
                serde_json::json!(template.type_name.clone()),
            );
            if let Err(e) = instance.set_state(InstanceState::Started) {
                return Outcome::Failed(e.to_string());
            }
            tracing::info!(
                "Adopted external resource '{}' for '{}'",
                resource_id,
                instance.id
            );
        } else if let Err(e) = instance.set_state(InstanceState::Deleted) {
            return Outcome::Failed(e.to_string());
        }
        Outcome::Skipped
    }

    /// Resolve the operation's inputs and node properties, then invoke
    /// the owning plugin
    async fn invoke_operation(
        &self,
        instance: &mut NodeInstance,
        template: &topoflow_core::NodeTemplate,
        operation: &Operation,
        kind: OperationKind,
        snapshot: &Deployment,
    ) -> std::result::Result<(), String> {
        let lookup = InstanceAttributes {
            snapshot,
            own_template: &instance.template,
            own: &instance.runtime_properties,
        };
        let eval = EvalContext {
            blueprint: self.blueprint,
            inputs: &snapshot.inputs,
            attributes: Some(&lookup),
        };

        let mut properties = HashMap::new();
        for (key, value) in &template.properties {
            properties.insert(key.clone(), eval.resolve(value).map_err(|e| e.to_string())?);
        }

        let mut inputs = HashMap::new();
        if let Some(op_inputs) = operation.inputs() {
            for (key, value) in op_inputs {
                inputs.insert(key.clone(), eval.resolve(value).map_err(|e| e.to_string())?);
            }
        }

        let plugin = self
            .registry
            .resolve(operation.implementation())
            .map_err(|e| e.to_string())?;
        let request =
            OperationRequest::new(operation.implementation(), kind).with_inputs(inputs);

        let mut ctx = NodeContext::new(&instance.template, &instance.id, &instance.node_type)
            .with_properties(properties);
        ctx.runtime_properties = instance.runtime_properties.clone();

        plugin
            .invoke(&request, &mut ctx)
            .await
            .map_err(|e| e.to_string())?;

        instance.runtime_properties = ctx.runtime_properties;
        Ok(())
    }
}

/// Attribute lookup that prefers the running instance's own fresh
/// runtime properties over the level snapshot
struct InstanceAttributes<'a> {
    snapshot: &'a Deployment,
    own_template: &'a str,
    own: &'a HashMap<String, serde_json::Value>,
}

impl AttributeLookup for InstanceAttributes<'_> {
    fn attribute(&self, node: &str, path: &[String]) -> Option<serde_json::Value> {
        if node == self.own_template {
            let root = self.own.get(path.first()?)?;
            return walk(root, &path[1..]).cloned();
        }
        self.snapshot.attribute(node, path)
    }
}
