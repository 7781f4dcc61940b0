//! The ordered operation queue and its named index.
//!
//! Entries live in insertion order in a `Vec`; names map to stable
//! [`EntryId`]s. Removing an entry always drops every name that points at it,
//! so a name can never refer to an entry that has left the queue.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::forward::{Forward, Observer};
use super::operation::Operation;
use super::task::TaskState;

/// Stable identifier assigned to an entry when it is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A deferred operation together with what is needed to replay it.
pub struct QueueEntry {
    pub(crate) operation: Operation,
    pub(crate) forward: Rc<dyn Forward>,
    pub(crate) observer: Box<dyn Observer>,
    pub(crate) state: Rc<Cell<TaskState>>,
}

impl QueueEntry {
    /// Build an entry that is not tracked by any task.
    #[must_use]
    pub fn new(operation: Operation, forward: Rc<dyn Forward>, observer: Box<dyn Observer>) -> Self {
        Self::tracked(
            operation,
            forward,
            observer,
            Rc::new(Cell::new(TaskState::Pending)),
        )
    }

    pub(crate) fn tracked(
        operation: Operation,
        forward: Rc<dyn Forward>,
        observer: Box<dyn Observer>,
        state: Rc<Cell<TaskState>>,
    ) -> Self {
        Self {
            operation,
            forward,
            observer,
            state,
        }
    }

    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Forward the operation and hand over the observer.
    pub(crate) fn replay(self) {
        self.state.set(TaskState::Forwarding);
        self.forward.forward(&self.operation, self.observer);
    }

    /// Tear the entry down without forwarding it.
    pub(crate) fn cancel(self) {
        self.state.set(TaskState::Cancelled);
    }
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEntry")
            .field("operation", &self.operation.name())
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

struct Slot {
    id: EntryId,
    entry: QueueEntry,
}

/// FIFO queue of entries plus the name → entry index.
#[derive(Default)]
pub struct OperationQueue {
    slots: Vec<Slot>,
    names: HashMap<String, EntryId>,
    next_id: u64,
}

impl OperationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail and return the entry's id.
    pub fn push(&mut self, entry: QueueEntry) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.slots.push(Slot { id, entry });
        id
    }

    /// Remove an entry, keeping the order of the rest. Any name pointing at
    /// it is dropped as well.
    pub fn remove(&mut self, id: EntryId) -> Option<QueueEntry> {
        let index = self.slots.iter().position(|slot| slot.id == id)?;
        self.names.retain(|_, target| *target != id);
        Some(self.slots.remove(index).entry)
    }

    /// Point `name` at a queued entry, replacing any previous target.
    ///
    /// Returns `false` without registering if `id` is not queued.
    pub fn register_name(&mut self, name: &str, id: EntryId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.names.insert(name.to_string(), id);
        true
    }

    /// Remove the entry registered under `name`, along with the name.
    pub fn take_named(&mut self, name: &str) -> Option<QueueEntry> {
        let id = self.names.remove(name)?;
        self.remove(id)
    }

    /// The entry registered under `name`.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<EntryId> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Empty the queue and the name index, returning entries in FIFO order.
    pub fn drain(&mut self) -> Vec<QueueEntry> {
        self.names.clear();
        self.slots.drain(..).map(|slot| slot.entry).collect()
    }

    /// Entries in FIFO order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &QueueEntry)> {
        self.slots.iter().map(|slot| (slot.id, &slot.entry))
    }

    /// Ids in FIFO order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationQueue")
            .field("ids", &self.ids())
            .field("names", &self.names)
            .finish()
    }
}
