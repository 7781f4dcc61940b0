//! Command implementations for offline-link.

mod config;
mod queue;
mod simulate;

pub use config::config;
pub use queue::{clear, keys, show, status};
pub use simulate::simulate;

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::LinkError;

/// Write shell completions to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn completions(shell: Shell) -> Result<String, LinkError> {
    let mut cmd = Cli::command();
    let mut stdout = std::io::stdout();
    clap_complete::generate(shell, &mut cmd, "offline-link", &mut stdout);
    stdout.flush()?;
    Ok(String::new())
}
