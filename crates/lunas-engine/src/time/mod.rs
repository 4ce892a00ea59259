//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per game loop
//! - `reset(now)` when the loop starts, `sample(now)` once per tick
//! - timestamps come from a `TimeSource`, so tests can drive time by hand

mod frame_clock;
mod source;

pub use frame_clock::{FrameClock, FrameTime};
pub use source::{MILLIS_PER_SECOND, ManualTime, MonotonicTime, TimeSource, TimeUnit};
