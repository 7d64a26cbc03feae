pub mod migrations;
pub mod queries;

use std::time::Duration;

use anyhow::Context;
use rusqlite::Connection;

/// Opens the database and brings its schema up to date. `:memory:` yields a
/// private database, which is what the tests use.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {path}"))?;

    // Location and request rows reference users; the FK checks are off by default.
    conn.pragma_update(None, "foreign_keys", true)
        .context("failed to enable foreign keys")?;
    conn.busy_timeout(Duration::from_secs(5))
        .context("failed to set busy timeout")?;
    if path != ":memory:" {
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .context("failed to set journal mode")?;
        tracing::debug!(path, journal_mode = %mode, "database opened");
    }

    migrations::run_migrations(&conn)?;

    Ok(conn)
}
