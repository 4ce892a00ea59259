//! Lunas engine crate.
//!
//! A callback-driven game loop: subscribers register against a fixed set of
//! event kinds (`update`, `draw`, `onFocus`, `onBlur`, `onResize`) and the loop
//! dispatches them once per scheduler tick. Rendering, physics and assets are
//! left to higher layers.

pub mod core;
pub mod error;
pub mod events;
pub mod logging;
pub mod services;
pub mod time;
pub mod window;

pub use crate::core::{GameLoop, LoopConfig, LoopCtx, LoopState};
pub use crate::error::LunasError;
pub use crate::events::{Callback, Event, EventKind};
