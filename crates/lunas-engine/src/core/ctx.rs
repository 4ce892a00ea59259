use crate::events::{Callback, Event, EventKind, SlotId};

use super::game_loop::LoopState;

pub(crate) enum Command {
    Add(EventKind, Callback),
    Remove(EventKind, Callback),
    RemoveSlot(EventKind, SlotId),
    Stop,
}

/// Context passed to every subscriber invocation.
///
/// Mutations are buffered and applied by the loop right after the subscriber
/// returns, in the order they were issued. Consequences for the running pass:
/// - a callback added here is not invoked in the current pass
/// - an occurrence removed here is skipped if its turn has not come yet
/// - `stop` takes effect once the current tick (or non-tick pass) completes
pub struct LoopCtx {
    state: LoopState,
    kind: EventKind,
    slot: SlotId,
    commands: Vec<Command>,
}

impl LoopCtx {
    pub(crate) fn new(state: LoopState, kind: EventKind, slot: SlotId) -> Self {
        Self {
            state,
            kind,
            slot,
            commands: Vec::new(),
        }
    }

    /// Kind of the event being dispatched.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Loop state at the time of the invocation.
    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn add(&mut self, kind: EventKind, callback: Callback) {
        self.commands.push(Command::Add(kind, callback));
    }

    /// Builds a callback from `f`, subscribes it to `kind` and returns the handle.
    pub fn on<F>(&mut self, kind: EventKind, f: F) -> Callback
    where
        F: FnMut(&Event, &mut LoopCtx) -> anyhow::Result<()> + 'static,
    {
        let callback = Callback::new(f);
        self.add(kind, callback.clone());
        callback
    }

    pub fn remove(&mut self, kind: EventKind, callback: &Callback) {
        self.commands.push(Command::Remove(kind, callback.clone()));
    }

    /// Unsubscribes the occurrence currently running.
    ///
    /// Lets a subscriber remove itself without holding its own [`Callback`],
    /// which would make the closure own itself and never be freed. Other
    /// occurrences of the same callback stay registered.
    pub fn remove_current(&mut self) {
        self.commands.push(Command::RemoveSlot(self.kind, self.slot));
    }

    /// Requests the loop to stop after the current tick.
    pub fn stop(&mut self) {
        self.commands.push(Command::Stop);
    }

    pub(crate) fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}
