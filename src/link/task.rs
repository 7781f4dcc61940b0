//! Request tasks: the handle a caller gets back from the link.
//!
//! A task does nothing until [`RequestTask::start`] is called. Deferred tasks
//! move `Idle → Pending` on start and then to `Cancelled` (cancelled by the
//! caller or evicted by a newer entry under the same queue name) or to
//! `Forwarding` (replayed). Tasks routed straight to the transport move
//! `Idle → Forwarding`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::forward::{Forward, Observer};
use super::offline::LinkState;
use super::operation::Operation;
use super::queue::{EntryId, QueueEntry};
use crate::error::LinkError;

/// Lifecycle of a request task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Created, not started.
    Idle,
    /// Waiting in the offline queue.
    Pending,
    /// Handed to the transport.
    Forwarding,
    /// Removed before being forwarded.
    Cancelled,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Forwarding => "forwarding",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

pub(crate) enum Route {
    /// Forward on start.
    Direct,
    /// Queue on start.
    Deferred(Weak<RefCell<LinkState>>),
}

/// A lazily started, cancellable request.
pub struct RequestTask {
    route: Route,
    request: Option<(Operation, Rc<dyn Forward>)>,
    state: Rc<Cell<TaskState>>,
    entry: Option<EntryId>,
}

impl RequestTask {
    pub(crate) fn new(route: Route, operation: Operation, forward: Rc<dyn Forward>) -> Self {
        Self {
            route,
            request: Some((operation, forward)),
            state: Rc::new(Cell::new(TaskState::Idle)),
            entry: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    /// Whether this task was routed to the offline queue.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self.route, Route::Deferred(_))
    }

    /// Queue id assigned when a deferred task started.
    #[must_use]
    pub const fn entry_id(&self) -> Option<EntryId> {
        self.entry
    }

    /// Start the request, attaching `observer` to its results.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Config` if the task was already started or
    /// cancelled, and propagates storage failures from persisting the queue.
    /// A deferred entry stays queued even if persisting it fails, unless
    /// evicting an entry with the same queue name failed first.
    pub fn start(&mut self, observer: Box<dyn Observer>) -> Result<(), LinkError> {
        let Some((operation, forward)) = self.request.take() else {
            return Err(LinkError::Config(format!(
                "request task cannot be started while {}",
                self.state.get()
            )));
        };

        match &self.route {
            Route::Direct => {
                self.state.set(TaskState::Forwarding);
                forward.forward(&operation, observer);
                Ok(())
            },
            Route::Deferred(link) => {
                let Some(link) = link.upgrade() else {
                    self.state.set(TaskState::Cancelled);
                    return Err(LinkError::Config(
                        "offline queue link was dropped before the request started".to_string(),
                    ));
                };

                self.state.set(TaskState::Pending);
                let entry = QueueEntry::tracked(operation, forward, observer, Rc::clone(&self.state));
                let (id, persisted) = link.borrow_mut().defer(entry);
                self.entry = id;
                persisted
            },
        }
    }

    /// Cancel the request.
    ///
    /// A pending task is removed from the queue and the queue is persisted
    /// again. An idle task is marked cancelled and can no longer start.
    /// Cancelling a forwarding or cancelled task does nothing. Returns
    /// whether anything changed.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from persisting the queue.
    pub fn cancel(&mut self) -> Result<bool, LinkError> {
        match self.state.get() {
            TaskState::Idle => {
                self.request = None;
                self.state.set(TaskState::Cancelled);
                Ok(true)
            },
            TaskState::Pending => {
                let (Route::Deferred(link), Some(id)) = (&self.route, self.entry) else {
                    return Ok(false);
                };
                self.state.set(TaskState::Cancelled);
                if let Some(link) = link.upgrade() {
                    link.borrow_mut().dequeue(id)?;
                }
                Ok(true)
            },
            TaskState::Forwarding | TaskState::Cancelled => Ok(false),
        }
    }
}

impl fmt::Debug for RequestTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTask")
            .field("deferred", &self.is_deferred())
            .field("state", &self.state.get())
            .field("entry", &self.entry)
            .finish()
    }
}
