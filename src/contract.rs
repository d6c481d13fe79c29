//! Names shared between the store, the push payloads and the following screen.

/// Content authority for squawk URIs.
pub const AUTHORITY: &str = "com.alexbaryzhikov.squawker.provider";

/// Path segment of the messages collection.
pub const PATH_MESSAGES: &str = "messages";

pub const TABLE_NAME: &str = "messages";
pub const COLUMN_ID: &str = "_id";
pub const COLUMN_AUTHOR: &str = "author";
pub const COLUMN_AUTHOR_KEY: &str = "authorKey";
pub const COLUMN_MESSAGE: &str = "message";
pub const COLUMN_DATE: &str = "date";

// Topic keys, as stored in the authorKey column.
pub const ASSER_KEY: &str = "key_asser";
pub const CEZANNE_KEY: &str = "key_cezanne";
pub const JLIN_KEY: &str = "key_jlin";
pub const LYLA_KEY: &str = "key_lyla";
pub const NIKITA_KEY: &str = "key_nikita";

/// Always included in the message filter; never exposed as a toggle.
pub const TEST_ACCOUNT_KEY: &str = "key_test";

/// Author keys the user can follow.
pub const FOLLOWABLE_KEYS: [&str; 5] = [ASSER_KEY, CEZANNE_KEY, JLIN_KEY, LYLA_KEY, NIKITA_KEY];

/// Base `content://` URI.
pub fn base_content_uri() -> String {
    format!("content://{}", AUTHORITY)
}

/// URI of the messages collection.
pub fn messages_uri() -> String {
    format!("{}/{}", base_content_uri(), PATH_MESSAGES)
}

/// Whether `key` is one of the followable author keys.
pub fn is_followable(key: &str) -> bool {
    FOLLOWABLE_KEYS.contains(&key)
}
