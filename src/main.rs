use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use offline_link::cli::args::{Cli, Commands};
use offline_link::cli::commands;
use offline_link::config::{Config, Paths};
use offline_link::storage::{Database, SqliteStorage, StorageProvider};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn open_storage(paths: &Paths, config: &Config) -> Result<SqliteStorage> {
    paths.ensure_dirs()?;
    let path = config.database_path(paths);
    let db = Database::open_at(&path)
        .with_context(|| format!("opening store at {}", path.display()))?;
    Ok(SqliteStorage::with_database(db))
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let paths = Paths::new()?;
    let config = Config::load_from_path(&paths.config_file)?;
    let format = cli.output.unwrap_or(config.output.default_format);

    let output = match &cli.command {
        Commands::Status(key) => {
            commands::status(&open_storage(&paths, &config)?, &config, key, format)?
        },
        Commands::Show { key, limit } => {
            commands::show(&open_storage(&paths, &config)?, &config, key, *limit, format)?
        },
        Commands::Clear { key, force } => {
            commands::clear(&open_storage(&paths, &config)?, &config, key, *force, format)?
        },
        Commands::Keys => commands::keys(&open_storage(&paths, &config)?, format)?,
        Commands::Simulate { script, memory } => {
            let storage: Option<Rc<dyn StorageProvider>> = if *memory {
                None
            } else {
                Some(Rc::new(open_storage(&paths, &config)?))
            };
            commands::simulate(storage, &config, script, format)?
        },
        Commands::Config(args) => commands::config(&paths, &config, &args.command, format)?,
        Commands::Completions { shell } => commands::completions(*shell)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
