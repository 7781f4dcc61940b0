//! The seams between the link and the transport.
//!
//! A [`Forward`] executes an operation and feeds its results to an
//! [`Observer`]. The link never waits on either: it hands the observer over
//! and moves on.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{json, Value};

use super::operation::Operation;
use crate::error::LinkError;

/// A single result delivered by the transport.
pub type Response = Value;

/// Receives the results of a forwarded operation.
pub trait Observer {
    /// A result arrived.
    fn next(&mut self, response: Response);

    /// The operation failed; no further notifications follow.
    fn error(&mut self, error: LinkError);

    /// The result stream finished.
    fn complete(&mut self);
}

/// Executes operations against the transport.
pub trait Forward {
    /// Issue `operation` and attach `observer` to its result stream.
    ///
    /// Implementations may deliver synchronously or hold the observer and
    /// deliver later.
    fn forward(&self, operation: &Operation, observer: Box<dyn Observer>);
}

/// What an observer was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Next(Response),
    Error(String),
    Complete,
}

/// An [`Observer`] that records every notification.
///
/// Clones share the same log, so one copy can be handed to the link while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    log: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.log.borrow().clone()
    }

    /// Whether the stream has completed or errored.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.log
            .borrow()
            .iter()
            .any(|n| matches!(n, Notification::Complete | Notification::Error(_)))
    }
}

impl Observer for RecordingObserver {
    fn next(&mut self, response: Response) {
        self.log.borrow_mut().push(Notification::Next(response));
    }

    fn error(&mut self, error: LinkError) {
        self.log.borrow_mut().push(Notification::Error(error.to_string()));
    }

    fn complete(&mut self) {
        self.log.borrow_mut().push(Notification::Complete);
    }
}

/// A [`Forward`] that records what it was asked to execute and holds the
/// observers until [`flush`](Self::flush) is called.
#[derive(Default)]
pub struct RecordingForwarder {
    forwarded: RefCell<Vec<Operation>>,
    in_flight: RefCell<Vec<(Operation, Box<dyn Observer>)>>,
}

impl RecordingForwarder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation forwarded so far, in order.
    #[must_use]
    pub fn forwarded(&self) -> Vec<Operation> {
        self.forwarded.borrow().clone()
    }

    /// Number of operations whose results have not been delivered yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.borrow().len()
    }

    /// Deliver an echo response to every in-flight observer and complete it.
    ///
    /// Returns how many observers were completed.
    pub fn flush(&self) -> usize {
        self.flush_with(|operation| {
            Ok(json!({ "data": { "operation": operation.name() } }))
        })
    }

    /// Deliver the result of `respond` to every in-flight observer.
    pub fn flush_with<F>(&self, mut respond: F) -> usize
    where
        F: FnMut(&Operation) -> Result<Response, LinkError>,
    {
        let in_flight: Vec<_> = self.in_flight.borrow_mut().drain(..).collect();
        let count = in_flight.len();

        for (operation, mut observer) in in_flight {
            match respond(&operation) {
                Ok(response) => {
                    observer.next(response);
                    observer.complete();
                },
                Err(e) => observer.error(e),
            }
        }

        count
    }
}

impl Forward for RecordingForwarder {
    fn forward(&self, operation: &Operation, observer: Box<dyn Observer>) {
        self.forwarded.borrow_mut().push(operation.clone());
        self.in_flight
            .borrow_mut()
            .push((operation.clone(), observer));
    }
}

impl fmt::Debug for RecordingForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingForwarder")
            .field("forwarded", &self.forwarded.borrow().len())
            .field("in_flight", &self.in_flight.borrow().len())
            .finish()
    }
}
