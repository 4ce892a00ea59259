//! Event kinds, subscriber handles and the per-kind callback registry.
//!
//! Dispatch itself lives on [`GameLoop`](crate::core::GameLoop), which owns the
//! registry and applies subscriber-requested mutations between invocations.

mod callback;
mod kind;
mod registry;

pub use callback::Callback;
pub use kind::{Event, EventKind};
pub use registry::{CallbackRegistry, SlotId};
