//! # Squawker
//!
//! Storage and push handling for short author messages ("squawks").
//!
//! ## Core Concepts
//!
//! - **Store**: a single SQLite table of squawks, addressed by typed methods
//!   or by content URIs, with change observers per route
//! - **Filter**: which authors to show, derived from the following toggles
//! - **Ingestion**: push payload to stored squawk plus a single-slot alert
//! - **Following**: toggles mapped to topic subscribe/unsubscribe calls
//! - **Feed**: a lifecycle-scoped background loader for the message list
//!
//! ## Example
//!
//! ```ignore
//! use squawker::{AlertSlot, Ingestor, SquawkStore, StoreConfig};
//!
//! let store = Arc::new(SquawkStore::open(StoreConfig::at("./squawker.db"))?);
//! let ingestor = Ingestor::new(Arc::clone(&store), Arc::new(AlertSlot::new()));
//!
//! // Push delivery callback
//! ingestor.on_message_received(&payload)?;
//!
//! // Show what the user follows
//! let filter = build_predicate(prefs.subscriptions());
//! let feed = FeedLoader::start(store, &filter, SortOrder::default())?;
//! ```

pub mod alerts;
pub mod contract;
pub mod error;
pub mod feed;
pub mod filter;
pub mod following;
pub mod ingest;
pub mod observers;
pub mod preferences;
pub mod routes;
pub mod schema;
pub mod store;
pub mod types;

// Re-exports
pub use alerts::{truncate_for_display, Alert, AlertId, AlertSink, AlertSlot, ELLIPSIS};
pub use error::{Result, SquawkError};
pub use feed::{FeedLoader, FeedUpdate};
pub use filter::{build_predicate, AuthorFilter, SubscriptionSet};
pub use following::{SubscriptionManager, ToggleOutcome, TopicTransport};
pub use ingest::{normalize, InboundPayload, IngestConfig, IngestOutcome, Ingestor};
pub use observers::{
    ChangeEvent, ChangeKind, DropReason, ObserverConfig, ObserverHandle, ObserverId,
    ObserverManager, StoreEvent,
};
pub use preferences::FollowingPreferences;
pub use routes::Route;
pub use store::{SquawkCursor, SquawkStore, StoreConfig};
pub use types::*;
