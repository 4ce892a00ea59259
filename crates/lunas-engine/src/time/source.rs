use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds in one second. Divisor applied to millisecond time sources.
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Unit of the timestamps a [`TimeSource`] produces.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TimeUnit {
    /// Host clocks such as `performance.now()`-style frame timestamps.
    #[default]
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Number of units per second.
    pub fn per_second(self) -> f64 {
        match self {
            TimeUnit::Milliseconds => MILLIS_PER_SECOND,
            TimeUnit::Seconds => 1.0,
        }
    }
}

/// Monotonic time capability consumed by the game loop.
pub trait TimeSource {
    /// Current timestamp, in [`unit`](Self::unit).
    fn now(&self) -> f64;

    fn unit(&self) -> TimeUnit;
}

/// Wall-clock source backed by [`Instant`], reporting milliseconds since creation.
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * MILLIS_PER_SECOND
    }

    fn unit(&self) -> TimeUnit {
        TimeUnit::Milliseconds
    }
}

/// Host-driven time source.
///
/// Clones share the same timestamp, so a host (or a test) can keep one handle
/// and advance time while the loop owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<f64>>,
    unit: TimeUnit,
}

impl ManualTime {
    pub fn new(unit: TimeUnit) -> Self {
        Self {
            now: Rc::new(Cell::new(0.0)),
            unit,
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, by: f64) {
        self.now.set(self.now.get() + by);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn unit(&self) -> TimeUnit {
        self.unit
    }
}
