use super::callback::Callback;
use super::kind::EventKind;

/// Identifies one registered occurrence of a callback.
///
/// The same callback may be registered several times; each registration gets its
/// own id, which is what dispatch uses to tell whether an occurrence is still live.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

#[derive(Debug, Clone)]
struct Slot {
    id: SlotId,
    callback: Callback,
}

/// Ordered multi-subscriber lists keyed by [`EventKind`].
///
/// Insertion order is dispatch order. Duplicates are allowed and each occurrence
/// is invoked. Removal matches by callback identity and drops the first occurrence.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    lists: [Vec<Slot>; EventKind::COUNT],
    next_id: u64,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback` to the list for `kind`.
    pub fn add(&mut self, kind: EventKind, callback: Callback) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.lists[kind.index()].push(Slot { id, callback });
        id
    }

    /// Removes the first occurrence of `callback` from the list for `kind`.
    ///
    /// Returns `false` and leaves the registry untouched when it is not registered.
    pub fn remove(&mut self, kind: EventKind, callback: &Callback) -> bool {
        let list = &mut self.lists[kind.index()];
        match list.iter().position(|slot| slot.callback == *callback) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Removes the occurrence `id`. Returns `false` if it is no longer registered.
    pub fn remove_slot(&mut self, kind: EventKind, id: SlotId) -> bool {
        let list = &mut self.lists[kind.index()];
        match list.iter().position(|slot| slot.id == id) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Stable copy of the list for `kind`, taken at the start of a dispatch pass.
    pub fn snapshot(&self, kind: EventKind) -> Vec<(SlotId, Callback)> {
        self.lists[kind.index()]
            .iter()
            .map(|slot| (slot.id, slot.callback.clone()))
            .collect()
    }

    /// Whether the occurrence `id` is still registered under `kind`.
    pub fn is_live(&self, kind: EventKind, id: SlotId) -> bool {
        self.lists[kind.index()].iter().any(|slot| slot.id == id)
    }

    pub fn contains(&self, kind: EventKind, callback: &Callback) -> bool {
        self.lists[kind.index()]
            .iter()
            .any(|slot| slot.callback == *callback)
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.lists[kind.index()].len()
    }

    pub fn is_empty(&self, kind: EventKind) -> bool {
        self.lists[kind.index()].is_empty()
    }

    pub fn clear(&mut self, kind: EventKind) {
        self.lists[kind.index()].clear();
    }

    pub fn clear_all(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}
