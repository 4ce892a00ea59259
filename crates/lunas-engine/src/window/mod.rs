//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and drives a `GameLoop` from them.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
