//! ブループリントモデル

mod blueprint;
mod group;
mod node;
mod params;
mod relationship;

pub use blueprint::Blueprint;
pub use group::{Group, Policy};
pub use node::{NodeTemplate, Operation};
pub use params::{InputDef, InputType, OutputDef};
pub use relationship::{Relationship, RelationshipKind};
