//! The squawk message store.
//!
//! A single SQLite table behind a writer lock, addressed either through typed
//! methods or through content URIs resolved by [`Route`]. Every successful
//! mutation notifies the observers of exactly the route it touched.

use crate::contract::{
    COLUMN_AUTHOR, COLUMN_AUTHOR_KEY, COLUMN_DATE, COLUMN_ID, COLUMN_MESSAGE, TABLE_NAME,
};
use crate::error::{Result, SquawkError};
use crate::observers::{ChangeEvent, ObserverConfig, ObserverHandle, ObserverId, ObserverManager};
use crate::routes::Route;
use crate::schema;
use crate::types::{
    Direction, NewSquawk, Selection, SortOrder, Squawk, SquawkId, SquawkUpdate, Timestamp,
};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Database file. `None` keeps the database in memory.
    pub path: Option<PathBuf>,

    /// Whether to create the database if it doesn't exist.
    pub create_if_missing: bool,

    /// How long a connection waits on a locked database file.
    pub busy_timeout: Duration,

    /// Buffer size for observers registered by queries.
    pub observer_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(schema::DATABASE_NAME)),
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
            observer_buffer_size: ObserverConfig::default().buffer_size,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            ..Default::default()
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }
}

const SELECT_COLUMNS: &str = "_id, author, authorKey, message, date";

/// The squawk store.
pub struct SquawkStore {
    config: StoreConfig,

    /// Single writer; also serializes reads on the same connection.
    conn: Mutex<Connection>,

    observers: Arc<ObserverManager>,
}

impl SquawkStore {
    /// Open (or create) the store described by `config`.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => {
                if !path.exists() && !config.create_if_missing {
                    return Err(SquawkError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("database not found at {}", path.display()),
                    )));
                }
                let conn = Connection::open(path)?;
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn
            }
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout)?;

        schema::run(&conn)?;

        match &config.path {
            Some(path) => info!(path = %path.display(), "Squawk store opened"),
            None => info!("In-memory squawk store opened"),
        }

        Ok(Self {
            observers: Arc::new(ObserverManager::with_buffer_size(config.observer_buffer_size)),
            config,
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(StoreConfig::in_memory())
    }

    /// Database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }

    // --- Typed operations ---

    /// Insert a squawk and notify observers of the messages collection.
    pub fn insert(&self, input: NewSquawk) -> Result<SquawkId> {
        let target = Route::Messages.uri();

        let id = {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO messages (author, authorKey, message, date) VALUES (?1, ?2, ?3, ?4)",
                params![input.author, input.author_key, input.message, input.date.0],
            )
            .map_err(|e| SquawkError::persistence(&target, e))?;
            conn.last_insert_rowid()
        };

        if id <= 0 {
            return Err(SquawkError::persistence(target, "Failed to insert row"));
        }

        let id = SquawkId(id);
        debug!(id = id.0, author_key = %input.author_key, "Inserted squawk");
        self.observers.notify(&ChangeEvent::inserted(id));
        Ok(id)
    }

    /// Query the messages collection.
    ///
    /// `selection` restricts the rows (`None` returns all of them). The
    /// returned cursor is registered for changes on the collection until it
    /// is dropped.
    pub fn query(&self, selection: Option<&Selection>, sort: SortOrder) -> Result<SquawkCursor> {
        // Register before reading so a write racing the query is not missed.
        let watch = self.observers.register(Route::Messages);

        match self.load(selection, sort) {
            Ok(rows) => Ok(SquawkCursor {
                rows: rows.into_iter(),
                watch,
                changed: Cell::new(false),
                observers: Arc::clone(&self.observers),
            }),
            Err(e) => {
                self.observers.unobserve(watch.id);
                Err(e)
            }
        }
    }

    fn load(&self, selection: Option<&Selection>, sort: SortOrder) -> Result<Vec<Squawk>> {
        let where_clause = match selection {
            Some(s) if !s.clause.trim().is_empty() => format!(" WHERE {}", s.clause),
            _ => String::new(),
        };
        let tie_break = match sort.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {}, {} {}",
            SELECT_COLUMNS, TABLE_NAME, where_clause, sort, COLUMN_ID, tie_break
        );
        let args: &[String] = selection.map(|s| s.args.as_slice()).unwrap_or(&[]);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), row_to_squawk)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Get a squawk by id.
    pub fn get(&self, id: SquawkId) -> Result<Option<Squawk>> {
        let conn = self.conn.lock();
        let squawk = conn
            .query_row(
                &format!("SELECT {} FROM {} WHERE _id = ?1", SELECT_COLUMNS, TABLE_NAME),
                [id.0],
                row_to_squawk,
            )
            .optional()?;
        Ok(squawk)
    }

    /// Number of stored squawks.
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", TABLE_NAME), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Update the columns set in `update` on one row.
    ///
    /// Returns the number of rows changed (0 or 1). A missing row is not an
    /// error; observers are only notified when a row changed.
    pub fn update_by_id(&self, id: SquawkId, update: &SquawkUpdate) -> Result<usize> {
        if update.is_empty() {
            return Err(SquawkError::Validation(format!(
                "empty update for squawk {}",
                id
            )));
        }

        let mut assignments = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(author) = &update.author {
            assignments.push(COLUMN_AUTHOR);
            values.push(Value::Text(author.clone()));
        }
        if let Some(key) = &update.author_key {
            assignments.push(COLUMN_AUTHOR_KEY);
            values.push(Value::Text(key.clone()));
        }
        if let Some(message) = &update.message {
            assignments.push(COLUMN_MESSAGE);
            values.push(Value::Text(message.clone()));
        }
        if let Some(Timestamp(date)) = update.date {
            assignments.push(COLUMN_DATE);
            values.push(Value::Integer(date));
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        values.push(Value::Integer(id.0));
        let sql = format!(
            "UPDATE {} SET {} WHERE _id = ?{}",
            TABLE_NAME,
            set_clause,
            values.len()
        );

        let route = Route::MessageWithId(id);
        let changed = {
            let conn = self.conn.lock();
            conn.execute(&sql, params_from_iter(values.iter()))
                .map_err(|e| SquawkError::persistence(route.uri(), e))?
        };

        if changed > 0 {
            debug!(id = id.0, "Updated squawk");
            self.observers.notify(&ChangeEvent::updated(id));
        }
        Ok(changed)
    }

    /// Delete one row. Returns the number of rows removed (0 or 1).
    pub fn delete_by_id(&self, id: SquawkId) -> Result<usize> {
        let route = Route::MessageWithId(id);
        let changed = {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM messages WHERE _id = ?1", [id.0])
                .map_err(|e| SquawkError::persistence(route.uri(), e))?
        };

        if changed > 0 {
            debug!(id = id.0, "Deleted squawk");
            self.observers.notify(&ChangeEvent::deleted(id));
        }
        Ok(changed)
    }

    // --- URI-addressed operations ---

    /// Insert through the collection URI. Returns the new item's URI.
    pub fn insert_at(&self, uri: &str, input: NewSquawk) -> Result<String> {
        match Route::parse(uri)? {
            Route::Messages => {
                let id = self.insert(input)?;
                Ok(Route::MessageWithId(id).uri())
            }
            Route::MessageWithId(_) => Err(SquawkError::UnsupportedRequest(uri.to_string())),
        }
    }

    /// Query through the collection URI, with an optional sort order string
    /// such as `"date DESC"` (the default).
    pub fn query_at(
        &self,
        uri: &str,
        selection: Option<&Selection>,
        sort_order: Option<&str>,
    ) -> Result<SquawkCursor> {
        match Route::parse(uri)? {
            Route::Messages => {
                // A blank sort order means the default, as an absent one does.
                let sort = match sort_order {
                    Some(s) if !s.trim().is_empty() => s.parse()?,
                    _ => SortOrder::default(),
                };
                debug!(?selection, %sort, "Querying squawks");
                self.query(selection, sort)
            }
            Route::MessageWithId(_) => Err(SquawkError::UnsupportedRequest(uri.to_string())),
        }
    }

    /// Update through an item URI.
    pub fn update_at(&self, uri: &str, update: &SquawkUpdate) -> Result<usize> {
        match Route::parse(uri)? {
            Route::MessageWithId(id) => self.update_by_id(id, update),
            Route::Messages => Err(SquawkError::UnsupportedRequest(uri.to_string())),
        }
    }

    /// Delete through an item URI.
    pub fn delete_at(&self, uri: &str) -> Result<usize> {
        match Route::parse(uri)? {
            Route::MessageWithId(id) => self.delete_by_id(id),
            Route::Messages => Err(SquawkError::UnsupportedRequest(uri.to_string())),
        }
    }

    /// MIME type for a URI.
    pub fn content_type(&self, uri: &str) -> Result<String> {
        Route::parse(uri).map(|route| route.content_type())
    }

    // --- Observers ---

    /// Register a change observer.
    pub fn observe(&self, config: ObserverConfig) -> ObserverHandle {
        self.observers.observe(config)
    }

    pub fn unobserve(&self, id: ObserverId) {
        self.observers.unobserve(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.observer_count()
    }
}

fn row_to_squawk(row: &Row<'_>) -> rusqlite::Result<Squawk> {
    Ok(Squawk {
        id: SquawkId(row.get(0)?),
        author: row.get(1)?,
        author_key: row.get(2)?,
        message: row.get(3)?,
        date: Timestamp(row.get(4)?),
    })
}

/// Forward-only result of [`SquawkStore::query`].
///
/// Holds a change registration on the messages collection so the consumer
/// can tell when to query again.
pub struct SquawkCursor {
    rows: std::vec::IntoIter<Squawk>,
    watch: ObserverHandle,
    changed: Cell<bool>,
    observers: Arc<ObserverManager>,
}

impl SquawkCursor {
    /// Whether the collection changed since this cursor was produced.
    pub fn has_changed(&self) -> bool {
        if self.watch.drain() {
            self.changed.set(true);
        }
        self.changed.get()
    }

    /// Change events for the queried collection, for use with `select!`.
    pub fn changes(&self) -> &Receiver<crate::observers::StoreEvent> {
        &self.watch.receiver
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for SquawkCursor {
    type Item = Squawk;

    fn next(&mut self) -> Option<Squawk> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl Drop for SquawkCursor {
    fn drop(&mut self) {
        self.observers.unobserve(self.watch.id);
    }
}
