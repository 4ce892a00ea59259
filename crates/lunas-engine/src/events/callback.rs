use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use anyhow::anyhow;

use crate::core::LoopCtx;

use super::kind::Event;

type Handler = dyn FnMut(&Event, &mut LoopCtx) -> anyhow::Result<()>;

/// Shared handle to a subscriber function.
///
/// Cloning a `Callback` yields the same subscriber: equality is identity of the
/// underlying closure, so a clone kept by the host is what `remove` matches against.
/// Two callbacks built from identical closures are different subscribers.
#[derive(Clone)]
pub struct Callback(Rc<RefCell<Handler>>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&Event, &mut LoopCtx) -> anyhow::Result<()> + 'static,
    {
        let handler: Rc<RefCell<Handler>> = Rc::new(RefCell::new(f));
        Self(handler)
    }

    pub(crate) fn invoke(&self, event: &Event, ctx: &mut LoopCtx) -> anyhow::Result<()> {
        let mut f = self
            .0
            .try_borrow_mut()
            .map_err(|_| anyhow!("subscriber invoked while already running"))?;
        (&mut *f)(event, ctx)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
