//! Live, event-driven excavation over a single-threaded host document.
//!
//! [`attach`] registers a capture-phase listener (pointer-enter and click) and,
//! optionally, a mutation observer on a [`LiveDocument`]. Every interaction
//! becomes one content-addressed [`VirtualObjectHandle`]; every coalesced
//! mutation batch triggers a bounded scan for hidden elements that still carry
//! text. Handler failures are logged and swallowed so the listener keeps
//! running until the returned [`Subscription`] is disposed.

pub mod document;
pub mod errors;
pub mod events;
pub mod model;
pub mod reactor;
pub mod scan;

pub use document::{
    CapturedTarget, DocumentBus, DomEvent, EventType, LiveDocument, MutationBatch, Phase,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use errors::{ReactorError, ReactorResult};
pub use model::{HandleKind, LiveOptions, VirtualObjectHandle};
pub use reactor::{
    attach, BatchCallback, LiveReactor, SnapshotCallback, Subscription, MUTATION_EVENT,
};
pub use scan::{
    bound_snapshot, capture_target, describe, hidden_reason, scan_hidden, ElementSnapshot,
    HiddenReason, ScanOutcome,
};
