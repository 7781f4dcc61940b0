//! Scripted sessions against the offline queue.
//!
//! A script is a YAML list of steps (`close`, `request`, `start`, `cancel`,
//! `open`, `flush`) run through a real [`Client`](crate::client::Client) whose
//! transport records what it was asked to forward. Useful for checking what a
//! sequence of offline operations leaves in storage.

pub mod runner;
pub mod script;

pub use runner::{run_script, SimulationReport, StepOutcome, TaskReport};
pub use script::{Script, Step};
