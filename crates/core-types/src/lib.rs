//! Shared primitives for the excavation engine crates.

pub mod classify;
pub mod record;
pub mod value;

pub use classify::{classify, ValueKind};
pub use record::{Category, Relation, RelationshipEdge, RunId, VirtualObjectRecord};
pub use value::{ArrayRef, FunctionRef, ObjectRef, OpaqueRef, Value};
