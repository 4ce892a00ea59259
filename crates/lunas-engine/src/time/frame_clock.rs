use super::source::TimeUnit;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous sample, in seconds. Never negative.
    pub dt: f64,

    /// Raw timestamp of this sample, in the clock's [`TimeUnit`].
    pub now: f64,

    /// Monotonic frame counter. The first sample of a session is frame 0.
    pub frame_index: u64,

    /// Set when `now` preceded the previous sample and `dt` was clamped to zero.
    pub regressed: bool,
}

/// Frame clock turning monotonic timestamps into per-frame delta time.
///
/// The clock does not read time itself; the loop passes `now` in from its
/// [`TimeSource`](super::TimeSource). This keeps the clock trivially testable and
/// lets one loop own exactly one clock without sharing delta-time state.
///
/// The baseline is set by [`reset`](Self::reset) when a session starts, not at
/// construction, so the first delta of every session is zero.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    unit: TimeUnit,
    frame_index: u64,
    max_dt: Option<f64>,
}

impl FrameClock {
    pub fn new(unit: TimeUnit) -> Self {
        Self {
            last: None,
            unit,
            frame_index: 0,
            max_dt: None,
        }
    }

    /// Creates a clock that clamps delta time to at most `max_dt` seconds.
    ///
    /// Keeps simulations stable after a long stall (debugger pause, minimized window).
    pub fn with_max_dt(unit: TimeUnit, max_dt: f64) -> Self {
        debug_assert!(max_dt >= 0.0);
        Self {
            max_dt: Some(max_dt),
            ..Self::new(unit)
        }
    }

    /// Sets the baseline to `now` and restarts the frame counter.
    pub fn reset(&mut self, now: f64) {
        self.last = Some(now);
        self.frame_index = 0;
    }

    /// Advances the clock to `now` and returns the resulting [`FrameTime`].
    ///
    /// A sample older than the last one, or one that is not a number, is a clock
    /// regression: `dt` is clamped to zero and the baseline stays where it was. Sampling a clock that was
    /// never reset behaves like `reset(now)` followed by a zero-delta sample.
    pub fn sample(&mut self, now: f64) -> FrameTime {
        let last = *self.last.get_or_insert(now);

        let regressed = now.is_nan() || last.is_nan() || now < last;
        let mut dt = if regressed {
            0.0
        } else {
            (now - last) / self.unit.per_second()
        };

        if let Some(max) = self.max_dt {
            dt = dt.min(max);
        }

        self.last = Some(last.max(now));

        let ft = FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
            regressed,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    pub fn is_started(&self) -> bool {
        self.last.is_some()
    }

    /// Last recorded sample. Never decreases while the clock is running.
    pub fn last_sample(&self) -> Option<f64> {
        self.last
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn max_dt(&self) -> Option<f64> {
        self.max_dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TimeUnit::default())
    }
}
