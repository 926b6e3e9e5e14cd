//! Recursive excavation of runtime values into a typed virtual-object graph.
//!
//! A walk is bounded in depth (`maxDepth`) and width (`maxArraySample`), tracks
//! composite values by allocation identity so cycles and shared references end
//! in a `cycle` sentinel, and never fails: every kind of input has a branch.
//! When a document is supplied its tag/class grouping (and optionally the
//! style-rule layer) is merged into the same catalog.

pub mod api;
pub mod events;
pub mod model;
pub mod policy;
pub mod summary;
pub mod walker;

pub use api::{excavate, ExcavationInput, Excavator, DOM_ROOT_ID};
pub use model::{
    ExcavationResult, ExcavationSummary, ObjectField, TruncationCounts, ValueNode,
    FUNCTION_BODY_DISABLED, FUNCTION_SOURCE_UNAVAILABLE,
};
pub use policy::ExcavateOptions;
pub use summary::fingerprint;
pub use walker::{field_id, ROOT_ID};
