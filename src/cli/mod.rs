//! Command-line interface for offline-link.

pub mod args;
pub mod commands;
