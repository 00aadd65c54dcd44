//! TopoFlow Plugin Abstraction
//!
//! This crate provides the lifecycle plugin abstraction for TopoFlow:
//! the executor resolves every operation implementation referenced by a
//! blueprint to a plugin and invokes it with the node's context.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 TopoFlow CLI                     │
//! │            (topo install/uninstall)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              topoflow-deploy                     │
//! │            Lifecycle Executor                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │ OperationRequest + NodeContext
//! ┌─────────────────▼───────────────────────────────┐
//! │              topoflow-plugin                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │           Plugin Abstraction              │   │
//! │  │  trait Plugin { ... }                     │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   Registry   │  │ MemoryPlugin │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Real provisioning plugins (cloud APIs, agents) live out of tree; the
//! built-in [`MemoryPlugin`] keeps dry runs and tests in-process.

pub mod context;
pub mod error;
pub mod memory;
pub mod plugin;
pub mod registry;

// Re-exports
pub use context::{EXTERNAL_ID, EXTERNAL_NAME, EXTERNAL_TYPE, NodeContext};
pub use error::{PluginError, Result};
pub use memory::{InvocationRecord, MemoryPlugin, MemoryResource};
pub use plugin::{OperationKind, OperationRequest, Plugin};
pub use registry::PluginRegistry;
