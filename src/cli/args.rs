use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "offline-link")]
#[command(about = "Inspect and exercise the offline request queue")]
#[command(long_about = "offline-link - inspect and exercise the offline request queue

Operations issued while a client is offline are queued and mirrored into
storage as a JSON snapshot. This tool reads that snapshot back and can run
scripted offline/online sessions through a real queue.

QUICK START:
  offline-link status                Summarize the persisted queue
  offline-link show                  List persisted operations
  offline-link simulate session.yaml Run a scripted session

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to the `output.default_format` setting, then 'pretty'.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Log filter (e.g. 'debug', 'offline_link=trace')
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the persisted queue
    ///
    /// Shows how many operations are persisted under the store key and how
    /// many of them are mutations.
    Status(KeyArgs),

    /// List persisted operations
    Show {
        #[command(flatten)]
        key: KeyArgs,

        /// Maximum operations to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Overwrite the persisted queue with an empty snapshot
    Clear {
        #[command(flatten)]
        key: KeyArgs,

        /// Required, since queued work is discarded
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// List every key in the store
    Keys,

    /// Run a scripted offline/online session
    ///
    /// The script is YAML with a `steps` list. Each step has an `action`:
    /// close, open, request, start, cancel, or flush.
    ///
    /// # Examples
    ///
    ///   offline-link simulate session.yaml
    ///   offline-link simulate session.yaml --memory
    Simulate {
        /// Path to the script
        script: PathBuf,

        /// Keep the snapshot in memory instead of the database
        #[arg(long)]
        memory: bool,
    },

    /// Show configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Storage key selection.
#[derive(Args, Clone, Debug, Default)]
pub struct KeyArgs {
    /// Storage key to read (defaults to the configured store key)
    #[arg(long, short = 'k')]
    pub key: Option<String>,
}

/// Arguments for config.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the data and config paths
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}
