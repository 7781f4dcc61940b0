//! Config command implementation.

use colored::Colorize;

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::LinkError;
use crate::output::to_json;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the config cannot be serialized or written.
pub fn config(
    paths: &Paths,
    config: &Config,
    cmd: &ConfigCommands,
    format: OutputFormat,
) -> Result<String, LinkError> {
    match cmd {
        ConfigCommands::Show => match format {
            OutputFormat::Json => to_json(config),
            OutputFormat::Pretty => Ok(serde_yaml::to_string(config)?),
        },
        ConfigCommands::Path => {
            let database = config.database_path(paths);
            match format {
                OutputFormat::Json => to_json(&serde_json::json!({
                    "root": paths.root,
                    "config_file": paths.config_file,
                    "database": database,
                })),
                OutputFormat::Pretty => Ok(format!(
                    "{} {}\n{} {}\n{} {}",
                    "Root:    ".dimmed(),
                    paths.root.display(),
                    "Config:  ".dimmed(),
                    paths.config_file.display(),
                    "Database:".dimmed(),
                    database.display()
                )),
            }
        },
        ConfigCommands::Init { force } => {
            if paths.config_file.exists() && !force {
                return Err(LinkError::Config(format!(
                    "{} already exists; use --force to overwrite",
                    paths.config_file.display()
                )));
            }
            paths.ensure_dirs()?;
            Config::default().save_to_path(&paths.config_file)?;
            Ok(format!("Wrote {}", paths.config_file.display()))
        },
    }
}
