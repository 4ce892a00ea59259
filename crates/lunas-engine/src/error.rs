//! Error types for the engine core.

use thiserror::Error;

use crate::events::EventKind;

/// Errors surfaced by the game loop, the callback registry and the service registry.
///
/// `SurfaceNotFound`, `InvalidEventKind` and the service errors are returned to the
/// caller. `SubscriberFailure` and `ClockRegression` are never returned: they are
/// reported through the loop's diagnostics hook and the loop keeps running.
#[derive(Debug, Error)]
pub enum LunasError {
    #[error("rendering surface not found: {id}")]
    SurfaceNotFound { id: String },

    #[error("invalid event kind: {0}")]
    InvalidEventKind(String),

    #[error("subscriber failed during {kind} dispatch: {error:#}")]
    SubscriberFailure { kind: EventKind, error: anyhow::Error },

    #[error("clock regressed: sample {now} precedes last sample {last}")]
    ClockRegression { last: f64, now: f64 },

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("service {key} is not a {expected}")]
    ServiceTypeMismatch { key: String, expected: &'static str },
}

impl LunasError {
    /// Returns `true` for errors that are reported as diagnostics rather than returned.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            LunasError::SubscriberFailure { .. } | LunasError::ClockRegression { .. }
        )
    }
}
