//! Core engine-facing contracts.
//!
//! `GameLoop` owns the clock and the callback registry and drives one frame per
//! scheduler tick. The host side is reached only through the traits defined
//! here (`SurfaceProvider`, `Scheduler`) plus `time::TimeSource`, so the loop
//! runs the same under the winit runtime and under a test harness.

mod ctx;
mod game_loop;
mod host;

pub use ctx::LoopCtx;
pub use game_loop::{GameLoop, GameLoopBuilder, LoopConfig, LoopState};
pub use host::{Scheduler, Surface, SurfaceProvider, SurfaceRegistry, TickSchedule};
