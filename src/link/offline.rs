//! The offline queue link.
//!
//! While the gate is open every request goes straight to the transport.
//! While it is closed, requests are queued when started, mirrored into
//! storage after every change, and replayed in order once the gate is opened
//! again by a client.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::forward::Forward;
use super::operation::Operation;
use super::queue::{EntryId, OperationQueue, QueueEntry};
use super::snapshot::Snapshot;
use super::task::{RequestTask, Route};
use crate::client::Client;
use crate::config::LinkOptions;
use crate::error::LinkError;
use crate::storage::StorageProvider;

/// Outcome of opening the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Number of queued operations handed to their forwarders.
    pub replayed: usize,
}

pub(crate) struct LinkState {
    is_open: bool,
    queue: OperationQueue,
    storage: Rc<dyn StorageProvider>,
    store_key: String,
}

impl LinkState {
    fn persist(&self) -> Result<(), LinkError> {
        let snapshot = Snapshot::project(&self.queue);
        self.storage
            .set_item(&self.store_key, &snapshot.to_json()?)?;

        tracing::debug!(
            store_key = %self.store_key,
            entries = snapshot.len(),
            "persisted offline queue"
        );
        Ok(())
    }

    fn enqueue(&mut self, entry: QueueEntry) -> Result<EntryId, LinkError> {
        let id = self.queue.push(entry);
        tracing::debug!(entry = %id, queue_len = self.queue.len(), "enqueued operation");
        self.persist()?;
        Ok(id)
    }

    pub(crate) fn dequeue(&mut self, id: EntryId) -> Result<bool, LinkError> {
        let removed = match self.queue.remove(id) {
            Some(entry) => {
                entry.cancel();
                tracing::debug!(entry = %id, queue_len = self.queue.len(), "dequeued operation");
                true
            },
            None => false,
        };

        self.persist()?;
        Ok(removed)
    }

    fn cancel_named(&mut self, name: &str) -> Result<(), LinkError> {
        if let Some(id) = self.queue.named(name) {
            tracing::debug!(entry = %id, queue_name = name, "cancelling superseded operation");
            self.dequeue(id)?;
        }
        Ok(())
    }

    /// Queue a started task's entry.
    ///
    /// Any entry already registered under the same queue name is cancelled
    /// first. If that fails the new entry is cancelled too and never queued.
    /// Once appended, the entry stays queued even if persisting fails, so its
    /// id is returned alongside the result.
    pub(crate) fn defer(&mut self, entry: QueueEntry) -> (Option<EntryId>, Result<(), LinkError>) {
        let context = entry.operation.context().clone();
        let name = context.queue_name();

        if let Some(name) = name {
            if let Err(err) = self.cancel_named(name) {
                entry.cancel();
                return (None, Err(err));
            }
        }

        let id = self.queue.push(entry);
        tracing::debug!(entry = %id, queue_len = self.queue.len(), "enqueued operation");

        if let Some(name) = name {
            if !context.cancel_queue {
                self.queue.register_name(name, id);
            }
        }

        (Some(id), self.persist())
    }
}

/// Offline-tolerant request queue link.
pub struct OfflineQueueLink {
    state: Rc<RefCell<LinkState>>,
}

impl OfflineQueueLink {
    /// Build a link from options.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::MissingStorage` if no storage was provided.
    pub fn new(options: LinkOptions) -> Result<Self, LinkError> {
        let storage = options.storage.ok_or(LinkError::MissingStorage)?;

        Ok(Self {
            state: Rc::new(RefCell::new(LinkState {
                is_open: options.is_open,
                queue: OperationQueue::new(),
                storage,
                store_key: options.store_key,
            })),
        })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open
    }

    /// Close the gate. Requests made from now on are queued.
    pub fn close(&self) {
        self.state.borrow_mut().is_open = false;
        tracing::info!("offline queue closed");
    }

    /// Open the gate and replay the queue.
    ///
    /// Without a client nothing happens and `Ok(None)` is returned: the gate
    /// keeps its state and the queue is left untouched.
    ///
    /// Replay hands every queued entry to its forwarder in FIFO order without
    /// waiting for results, then empties the queue and persists it. Entries
    /// whose forwarding later fails are not re-queued.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from persisting the emptied queue.
    pub fn open(&self, client: Option<&Client>) -> Result<Option<ReplaySummary>, LinkError> {
        if client.is_none() {
            tracing::warn!("refusing to open offline queue without a client");
            return Ok(None);
        }

        self.state.borrow_mut().is_open = true;
        tracing::info!("offline queue opened");

        self.replay().map(Some)
    }

    fn replay(&self) -> Result<ReplaySummary, LinkError> {
        let entries = self.state.borrow_mut().queue.drain();
        let replayed = entries.len();

        for entry in entries {
            entry.replay();
        }

        self.state.borrow().persist()?;
        tracing::info!(replayed, "replayed offline queue");

        Ok(ReplaySummary { replayed })
    }

    /// Route an operation.
    ///
    /// The operation is forwarded on start when the gate is open, when its
    /// context sets `skip_queue`, or when its variables carry a password.
    /// Otherwise it is queued on start.
    pub fn request(&self, operation: Operation, forward: Rc<dyn Forward>) -> RequestTask {
        let is_open = self.is_open();
        let skip_queue = operation.context().skip_queue;
        let sensitive = operation.has_sensitive_variables();

        if sensitive && !is_open && !skip_queue {
            tracing::warn!(
                operation = operation.name().unwrap_or("<anonymous>"),
                "operation carries sensitive variables; forwarding instead of queueing"
            );
        }

        let route = if is_open || skip_queue || sensitive {
            Route::Direct
        } else {
            Route::Deferred(Rc::downgrade(&self.state))
        };

        RequestTask::new(route, operation, forward)
    }

    /// Append an entry to the queue and persist.
    ///
    /// # Errors
    ///
    /// Propagates storage failures; the entry stays queued.
    pub fn enqueue(&self, entry: QueueEntry) -> Result<EntryId, LinkError> {
        self.state.borrow_mut().enqueue(entry)
    }

    /// Remove an entry and persist, even if nothing was removed.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn dequeue(&self, id: EntryId) -> Result<bool, LinkError> {
        self.state.borrow_mut().dequeue(id)
    }

    /// Write the current projection to storage.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn persist(&self) -> Result<(), LinkError> {
        self.state.borrow().persist()
    }

    /// Current projection of the queue.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::project(&self.state.borrow().queue)
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Queued ids in FIFO order.
    #[must_use]
    pub fn queued_ids(&self) -> Vec<EntryId> {
        self.state.borrow().queue.ids()
    }

    /// Entry currently registered under a queue name.
    #[must_use]
    pub fn named_entry(&self, name: &str) -> Option<EntryId> {
        self.state.borrow().queue.named(name)
    }

    #[must_use]
    pub fn store_key(&self) -> String {
        self.state.borrow().store_key.clone()
    }
}

impl std::fmt::Debug for OfflineQueueLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("OfflineQueueLink")
            .field("is_open", &state.is_open)
            .field("store_key", &state.store_key)
            .field("queue", &state.queue)
            .finish()
    }
}
