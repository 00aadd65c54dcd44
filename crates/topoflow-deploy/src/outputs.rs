//! Output resolution
//!
//! Blueprint outputs are deferred expressions evaluated against a
//! deployment's inputs and runtime properties. Resolution is total:
//! every output either resolves or the whole call fails, so callers
//! never see a partially resolved map.

use crate::deployment::Deployment;
use crate::error::Result;
use std::collections::BTreeMap;
use topoflow_core::{Blueprint, EvalContext};

/// Resolve every blueprint output against the deployment state
///
/// Returns a sorted map so repeated calls print identically.
pub fn resolve_outputs(
    blueprint: &Blueprint,
    deployment: &Deployment,
) -> Result<BTreeMap<String, serde_json::Value>> {
    let eval = EvalContext {
        blueprint,
        inputs: &deployment.inputs,
        attributes: Some(deployment),
    };

    let mut resolved = BTreeMap::new();
    for (name, output) in &blueprint.outputs {
        let value = eval.resolve(&output.value)?;
        tracing::debug!("Resolved output '{}'", name);
        resolved.insert(name.clone(), value);
    }
    Ok(resolved)
}
