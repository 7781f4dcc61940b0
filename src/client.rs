//! A client that owns one offline queue link.
//!
//! Gate and queue state belong to the client that created them and are
//! dropped with it. Only a client can reopen the gate, which is what makes
//! replay possible.

use std::rc::Rc;

use crate::config::LinkOptions;
use crate::error::LinkError;
use crate::link::{Forward, OfflineQueueLink, Operation, ReplaySummary, RequestTask};

/// Issues operations through its own offline queue link.
pub struct Client {
    link: OfflineQueueLink,
    transport: Rc<dyn Forward>,
}

impl Client {
    /// Create a client with a fresh link.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::MissingStorage` if `options` carries no storage.
    pub fn new(options: LinkOptions, transport: Rc<dyn Forward>) -> Result<Self, LinkError> {
        Ok(Self {
            link: OfflineQueueLink::new(options)?,
            transport,
        })
    }

    /// Route an operation through the link to this client's transport.
    #[must_use]
    pub fn execute(&self, operation: Operation) -> RequestTask {
        self.link.request(operation, Rc::clone(&self.transport))
    }

    /// Close the gate.
    pub fn go_offline(&self) {
        self.link.close();
    }

    /// Open the gate and replay anything queued.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from persisting the emptied queue.
    pub fn go_online(&self) -> Result<Option<ReplaySummary>, LinkError> {
        self.link.open(Some(self))
    }

    #[must_use]
    pub const fn link(&self) -> &OfflineQueueLink {
        &self.link
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Document, RecordingForwarder, RecordingObserver, TaskState};
    use crate::storage::MemoryStorage;

    fn client(forwarder: &Rc<RecordingForwarder>) -> Client {
        Client::new(
            LinkOptions::new().with_storage(Rc::new(MemoryStorage::new())),
            Rc::clone(forwarder) as Rc<dyn Forward>,
        )
        .unwrap()
    }

    fn op(source: &str) -> Operation {
        Operation::new(Document::parse(source).unwrap())
    }

    #[test]
    fn test_client_requires_storage() {
        let forwarder: Rc<dyn Forward> = Rc::new(RecordingForwarder::new());
        let err = Client::new(LinkOptions::default(), forwarder).unwrap_err();
        assert!(matches!(err, LinkError::MissingStorage));
    }

    #[test]
    fn test_offline_then_online_round_trip() {
        let forwarder = Rc::new(RecordingForwarder::new());
        let client = client(&forwarder);

        client.go_offline();
        let mut task = client.execute(op("mutation Save { save }"));
        let observer = RecordingObserver::new();
        task.start(Box::new(observer.clone())).unwrap();
        assert_eq!(task.state(), TaskState::Pending);

        let summary = client.go_online().unwrap().unwrap();
        assert_eq!(summary.replayed, 1);
        assert_eq!(task.state(), TaskState::Forwarding);

        forwarder.flush();
        assert!(observer.is_finished());
    }

    #[test]
    fn test_each_client_has_its_own_gate() {
        let forwarder = Rc::new(RecordingForwarder::new());
        let a = client(&forwarder);
        let b = client(&forwarder);

        a.go_offline();
        assert!(!a.link().is_open());
        assert!(b.link().is_open());
    }
}
