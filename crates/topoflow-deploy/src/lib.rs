//! TopoFlow Deploy
//!
//! Deployment runtime on top of `topoflow-core` and `topoflow-plugin`:
//!
//! - `Deployment`: a blueprint bound to input values and node instances
//! - `Executor`: runs install / uninstall workflows in dependency order
//! - `DeploymentStore`: JSON persistence under `.topoflow/`
//! - `resolve_outputs`: evaluates blueprint outputs against live state

pub mod deployment;
pub mod error;
pub mod executor;
pub mod instance;
pub mod outputs;
pub mod store;

pub use deployment::Deployment;
pub use error::{DeployError, Result};
pub use executor::{Executor, WorkflowReport};
pub use instance::{InstanceState, NodeInstance};
pub use outputs::resolve_outputs;
pub use store::{DeploymentStore, StoreLock};
