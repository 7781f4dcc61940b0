//! The offline queue link and its parts.
//!
//! - [`document`]: classifies GraphQL documents as mutation or query
//! - [`operation`]: operations and their per-call context
//! - [`forward`]: transport and observer seams
//! - [`queue`]: FIFO queue with a named index
//! - [`snapshot`]: storage-safe projection of the queue
//! - [`task`]: lazily started, cancellable request handles
//! - [`offline`]: the gate, deferral, and replay

pub mod document;
pub mod forward;
pub mod offline;
pub mod operation;
pub mod queue;
pub mod snapshot;
pub mod task;

pub use document::{Definition, Document, OperationKind};
pub use forward::{Forward, Notification, Observer, RecordingForwarder, RecordingObserver, Response};
pub use offline::{OfflineQueueLink, ReplaySummary};
pub use operation::{Operation, OperationContext, Variables};
pub use queue::{EntryId, OperationQueue, QueueEntry};
pub use snapshot::{PersistedDocument, PersistedEntry, Snapshot};
pub use task::{RequestTask, TaskState};
