//! Messages table schema and versioning.

use crate::contract::{
    COLUMN_AUTHOR, COLUMN_AUTHOR_KEY, COLUMN_DATE, COLUMN_ID, COLUMN_MESSAGE, TABLE_NAME,
};
use crate::error::Result;
use rusqlite::Connection;
use tracing::info;

/// Current schema version, stored in `PRAGMA user_version`.
pub const DATABASE_VERSION: i64 = 1;

/// Default database file name.
pub const DATABASE_NAME: &str = "squawker.db";

/// Bring the schema up to [`DATABASE_VERSION`].
///
/// A database at any other version is not migrated: the table is dropped
/// and recreated.
pub fn run(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version == DATABASE_VERSION {
        return Ok(());
    }

    if version != 0 {
        info!(
            from = version,
            to = DATABASE_VERSION,
            "Upgrading squawk database, dropping messages"
        );
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", TABLE_NAME))?;
    }

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            {id}         INTEGER PRIMARY KEY AUTOINCREMENT,
            {author}     TEXT NOT NULL,
            {author_key} TEXT NOT NULL,
            {message}    TEXT NOT NULL,
            {date}       INTEGER NOT NULL
        );
        PRAGMA user_version = {version};",
        table = TABLE_NAME,
        id = COLUMN_ID,
        author = COLUMN_AUTHOR,
        author_key = COLUMN_AUTHOR_KEY,
        message = COLUMN_MESSAGE,
        date = COLUMN_DATE,
        version = DATABASE_VERSION,
    ))?;

    info!(version = DATABASE_VERSION, "Squawk schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [TABLE_NAME],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn test_creates_table_and_sets_version() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        assert!(table_exists(&conn));
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, DATABASE_VERSION);
    }

    #[test]
    fn test_run_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute(
            "INSERT INTO messages (author, authorKey, message, date) VALUES ('a', 'k', 'm', 1)",
            [],
        )
        .unwrap();

        run(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_stale_version_recreates_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE messages (_id INTEGER PRIMARY KEY, body TEXT);
             INSERT INTO messages (body) VALUES ('old');
             PRAGMA user_version = 99;",
        )
        .unwrap();

        run(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        conn.execute(
            "INSERT INTO messages (author, authorKey, message, date) VALUES ('a', 'k', 'm', 1)",
            [],
        )
        .unwrap();
    }
}
