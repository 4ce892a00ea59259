use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Descriptor of a drawable target.
///
/// The target itself (window, canvas, offscreen buffer) is owned by the
/// [`SurfaceProvider`]; the loop only holds what it needs to describe it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Surface {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

/// Resolves the rendering surface a loop draws to.
pub trait SurfaceProvider {
    /// Returns the surface registered under `id`, or `None` when absent.
    fn acquire(&mut self, id: &str) -> Option<Surface>;
}

/// Shared, id-keyed set of surfaces.
///
/// Clones share the same map, so the host can publish a surface (e.g. once its
/// window exists) after handing a clone to the loop.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: Rc<RefCell<HashMap<String, Surface>>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `surface`, replacing any surface with the same id.
    pub fn insert(&self, surface: Surface) -> Option<Surface> {
        self.surfaces.borrow_mut().insert(surface.id.clone(), surface)
    }

    pub fn remove(&self, id: &str) -> Option<Surface> {
        self.surfaces.borrow_mut().remove(id)
    }

    /// Updates the size of a published surface. Returns `false` if `id` is unknown.
    pub fn resize(&self, id: &str, width: u32, height: u32) -> bool {
        match self.surfaces.borrow_mut().get_mut(id) {
            Some(surface) => {
                surface.width = width;
                surface.height = height;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<Surface> {
        self.surfaces.borrow().get(id).cloned()
    }
}

impl SurfaceProvider for SurfaceRegistry {
    fn acquire(&mut self, id: &str) -> Option<Surface> {
        self.get(id)
    }
}

/// Per-frame callback facility of the host.
///
/// Requests are one-shot: the loop asks for the next tick at the end of every
/// tick it runs, and cancels the outstanding request when it stops.
pub trait Scheduler {
    fn request_tick(&mut self);
    fn cancel_tick(&mut self);
}

/// Shared pending-tick flag.
///
/// The loop owns one clone as its [`Scheduler`]; the host keeps another and polls
/// it (`take`) to decide whether to drive another frame.
#[derive(Debug, Clone, Default)]
pub struct TickSchedule {
    pending: Rc<Cell<bool>>,
}

impl TickSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Consumes the pending request, returning whether there was one.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }
}

impl Scheduler for TickSchedule {
    fn request_tick(&mut self) {
        self.pending.set(true);
    }

    fn cancel_tick(&mut self) {
        self.pending.set(false);
    }
}
