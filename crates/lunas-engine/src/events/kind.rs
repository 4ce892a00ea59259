use std::fmt;
use std::str::FromStr;

use crate::error::LunasError;
use crate::time::FrameTime;

/// Closed set of event kinds the game loop dispatches.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    Update,
    Draw,
    Focus,
    Blur,
    Resize,
}

impl EventKind {
    pub const COUNT: usize = 5;

    /// All kinds, in index order.
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Update,
        EventKind::Draw,
        EventKind::Focus,
        EventKind::Blur,
        EventKind::Resize,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Canonical name, as used by hosts that configure subscribers by string.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Update => "update",
            EventKind::Draw => "draw",
            EventKind::Focus => "onFocus",
            EventKind::Blur => "onBlur",
            EventKind::Resize => "onResize",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = LunasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| LunasError::InvalidEventKind(s.to_string()))
    }
}

/// Payload delivered to subscribers.
///
/// Each variant belongs to exactly one [`EventKind`], so a payload can only ever
/// reach the subscribers of its own kind.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    /// One logical frame advanced; carries the frame's delta time.
    Update(FrameTime),
    /// Render the current state. No payload.
    Draw,
    /// The host window or page gained focus.
    Focus,
    /// The host window or page lost focus.
    Blur,
    /// The rendering surface changed size, in physical pixels.
    Resize { width: u32, height: u32 },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Update(_) => EventKind::Update,
            Event::Draw => EventKind::Draw,
            Event::Focus => EventKind::Focus,
            Event::Blur => EventKind::Blur,
            Event::Resize { .. } => EventKind::Resize,
        }
    }

    /// Delta time in seconds for `Update` events.
    pub fn dt(&self) -> Option<f64> {
        match self {
            Event::Update(ft) => Some(ft.dt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_kind() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_is_invalid_event_kind() {
        let err = "onScroll".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, LunasError::InvalidEventKind(ref s) if s == "onScroll"));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("Update".parse::<EventKind>().is_err());
    }

    #[test]
    fn payload_maps_to_its_kind() {
        assert_eq!(Event::Draw.kind(), EventKind::Draw);
        assert_eq!(Event::Resize { width: 1, height: 2 }.kind(), EventKind::Resize);
        assert_eq!(Event::Blur.dt(), None);
    }

    #[test]
    fn indices_match_all_order() {
        for (i, kind) in EventKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
