//! Core types for the squawk store.

use crate::contract::{COLUMN_AUTHOR, COLUMN_AUTHOR_KEY, COLUMN_DATE, COLUMN_ID, COLUMN_MESSAGE};
use crate::error::{Result, SquawkError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row identifier assigned by the store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SquawkId(pub i64);

impl fmt::Debug for SquawkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SquawkId({})", self.0)
    }
}

impl fmt::Display for SquawkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message date as sent by the squawk server (milliseconds since Unix epoch).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Parse a string-encoded integer date.
    pub fn parse(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<i64>()
            .map(Timestamp)
            .map_err(|e| SquawkError::Validation(format!("invalid date '{}': {}", raw, e)))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A stored squawk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squawk {
    pub id: SquawkId,
    pub author: String,
    pub author_key: String,
    pub message: String,
    pub date: Timestamp,
}

impl Squawk {
    /// The columns the message list shows: `(author, message, date, authorKey)`.
    pub fn projection(&self) -> (&str, &str, Timestamp, &str) {
        (&self.author, &self.message, self.date, &self.author_key)
    }
}

/// Input for a new squawk (before the id is assigned).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSquawk {
    pub author: String,
    pub author_key: String,
    pub message: String,
    pub date: Timestamp,
}

impl NewSquawk {
    pub fn new(
        author: impl Into<String>,
        author_key: impl Into<String>,
        message: impl Into<String>,
        date: Timestamp,
    ) -> Self {
        Self {
            author: author.into(),
            author_key: author_key.into(),
            message: message.into(),
            date,
        }
    }
}

/// Fields to change on an existing squawk. `None` leaves the column as is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SquawkUpdate {
    pub author: Option<String>,
    pub author_key: Option<String>,
    pub message: Option<String>,
    pub date: Option<Timestamp>,
}

impl SquawkUpdate {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.author_key.is_none()
            && self.message.is_none()
            && self.date.is_none()
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_author_key(mut self, key: impl Into<String>) -> Self {
        self.author_key = Some(key.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_date(mut self, date: Timestamp) -> Self {
        self.date = Some(date);
        self
    }
}

/// Columns of the messages table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Id,
    Author,
    AuthorKey,
    Message,
    Date,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => COLUMN_ID,
            Column::Author => COLUMN_AUTHOR,
            Column::AuthorKey => COLUMN_AUTHOR_KEY,
            Column::Message => COLUMN_MESSAGE,
            Column::Date => COLUMN_DATE,
        }
    }
}

impl FromStr for Column {
    type Err = SquawkError;

    fn from_str(s: &str) -> Result<Self> {
        [
            Column::Id,
            Column::Author,
            Column::AuthorKey,
            Column::Message,
            Column::Date,
        ]
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| SquawkError::Validation(format!("unknown column '{}'", s)))
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort order for queries. Parsed from strings such as `"date DESC"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub direction: Direction,
}

impl SortOrder {
    pub fn new(column: Column, direction: Direction) -> Self {
        Self { column, direction }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::new(Column::Date, Direction::Desc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        write!(f, "{} {}", self.column.name(), dir)
    }
}

impl FromStr for SortOrder {
    type Err = SquawkError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let column = parts
            .next()
            .ok_or_else(|| SquawkError::Validation("empty sort order".to_string()))?
            .parse::<Column>()?;
        let direction = match parts.next() {
            None => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => {
                return Err(SquawkError::Validation(format!(
                    "invalid sort direction '{}'",
                    d
                )))
            }
        };
        if let Some(extra) = parts.next() {
            return Err(SquawkError::Validation(format!(
                "unexpected token '{}' in sort order",
                extra
            )));
        }
        Ok(SortOrder::new(column, direction))
    }
}

/// A WHERE clause with positional `?` placeholders and their bound values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub clause: String,
    pub args: Vec<String>,
}

impl Selection {
    pub fn new(clause: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            clause: clause.into(),
            args,
        }
    }
}
