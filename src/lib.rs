//! offline-link - an offline-tolerant request queue
//!
//! An [`OfflineQueueLink`] sits between a client and its transport. While
//! its gate is open, operations pass straight through. While it is closed,
//! operations are queued when started, mirrored into a [`StorageProvider`]
//! as a JSON snapshot, and replayed in order when the owning [`Client`]
//! reopens the gate.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod link;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use client::Client;
pub use config::LinkOptions;
pub use error::LinkError;
pub use link::{OfflineQueueLink, Operation, OperationContext, RequestTask};
pub use storage::StorageProvider;
