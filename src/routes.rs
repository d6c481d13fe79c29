//! Content URI routing.
//!
//! The store answers to a closed set of request shapes: the messages
//! collection and a single message by id. Anything else is rejected with
//! [`SquawkError::UnsupportedRequest`].

use crate::contract::{messages_uri, AUTHORITY, PATH_MESSAGES};
use crate::error::{Result, SquawkError};
use crate::types::SquawkId;
use std::fmt;

const SCHEME: &str = "content://";

/// A resolved content URI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// `content://<authority>/messages`
    Messages,
    /// `content://<authority>/messages/<id>`
    MessageWithId(SquawkId),
}

impl Route {
    /// Resolve a URI string to a route.
    pub fn parse(uri: &str) -> Result<Self> {
        let unsupported = || SquawkError::UnsupportedRequest(uri.to_string());

        let rest = uri.strip_prefix(SCHEME).ok_or_else(unsupported)?;
        let (authority, path) = rest.split_once('/').ok_or_else(unsupported)?;
        if authority != AUTHORITY {
            return Err(unsupported());
        }

        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(PATH_MESSAGES), None, None) => Ok(Route::Messages),
            (Some(PATH_MESSAGES), Some(id), None) if is_number(id) => id
                .parse::<i64>()
                .map(|id| Route::MessageWithId(SquawkId(id)))
                .map_err(|_| unsupported()),
            _ => Err(unsupported()),
        }
    }

    /// MIME type of the resource behind this route.
    pub fn content_type(&self) -> String {
        match self {
            Route::Messages => format!("vnd.android.cursor.dir/{}.{}", AUTHORITY, PATH_MESSAGES),
            Route::MessageWithId(_) => {
                format!("vnd.android.cursor.item/{}.{}", AUTHORITY, PATH_MESSAGES)
            }
        }
    }

    /// The canonical URI for this route.
    pub fn uri(&self) -> String {
        match self {
            Route::Messages => messages_uri(),
            Route::MessageWithId(id) => format!("{}/{}", messages_uri(), id),
        }
    }

    /// Whether a change at `self` is visible from an observer of `scope`.
    pub fn is_within(&self, scope: &Route) -> bool {
        match scope {
            Route::Messages => true,
            Route::MessageWithId(_) => self == scope,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

fn is_number(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection_and_item() {
        assert_eq!(Route::parse(&messages_uri()).unwrap(), Route::Messages);

        let item = format!("{}/17", messages_uri());
        assert_eq!(
            Route::parse(&item).unwrap(),
            Route::MessageWithId(SquawkId(17))
        );
        assert_eq!(Route::MessageWithId(SquawkId(17)).uri(), item);
    }

    #[test]
    fn test_parse_rejects_unknown_shapes() {
        let bad = [
            "content://com.alexbaryzhikov.squawker.provider/users".to_string(),
            "content://other.authority/messages".to_string(),
            format!("{}/abc", messages_uri()),
            format!("{}/-1", messages_uri()),
            format!("{}/1/2", messages_uri()),
            "https://com.alexbaryzhikov.squawker.provider/messages".to_string(),
            String::new(),
        ];
        for uri in bad {
            assert!(
                matches!(Route::parse(&uri), Err(SquawkError::UnsupportedRequest(_))),
                "expected {:?} to be rejected",
                uri
            );
        }
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            Route::Messages.content_type(),
            "vnd.android.cursor.dir/com.alexbaryzhikov.squawker.provider.messages"
        );
        assert!(Route::MessageWithId(SquawkId(1))
            .content_type()
            .starts_with("vnd.android.cursor.item/"));
    }

    #[test]
    fn test_scope_containment() {
        let item = Route::MessageWithId(SquawkId(3));
        assert!(item.is_within(&Route::Messages));
        assert!(item.is_within(&item));
        assert!(!Route::Messages.is_within(&item));
        assert!(!Route::MessageWithId(SquawkId(4)).is_within(&item));
    }
}
