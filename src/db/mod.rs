/// SQLite-backed storage: snapshot key-value table and scheduled reminders.
mod kv;
mod migrations;
mod notifications;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

pub use kv::SqliteStorage;
pub use notifications::SqliteDispatcher;

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &Path) -> Result<Connection> {
    debug!(path = %db_path.display(), "Opening database");
    let conn = Connection::open(db_path)
        .with_context(|| format!("Unable to open database at {}", db_path.display()))?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./hydrate.db` when no data dir is found.
pub fn default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let hydrate_dir = data_dir.join("hydrate");
        std::fs::create_dir_all(&hydrate_dir).ok();
        hydrate_dir.join("hydrate.db")
    } else {
        PathBuf::from("hydrate.db")
    }
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run_migrations(&conn).unwrap();
    conn
}
