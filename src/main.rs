mod cli;
mod clock;
mod config;
mod db;
mod error;
mod history;
mod ledger;
mod persistence;
mod reminders;
mod store;
mod types;
mod units;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::reminders::ReminderScheduler;
use crate::store::HydrateStore;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    init_tracing(cli_opts.verbose);

    let config = config::Config::from_cli(&cli_opts)?;
    let conn = db::init(&config.db_path)?;
    let mut store = HydrateStore::load(db::SqliteStorage::new(&conn), config.clock());
    let mut scheduler = ReminderScheduler::new(db::SqliteDispatcher::new(&conn));

    let command = cli_opts.command.unwrap_or(cli::Command::Status);
    cli::run(command, &mut store, &mut scheduler)
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "hydrate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
