//! Change notifications for the squawk store.
//!
//! Every mutating store operation notifies the observers registered on the
//! route it touched:
//! - inserts notify the messages collection
//! - updates and deletes notify the affected item (and so the collection)
//!
//! Delivery is synchronous and best-effort: events go to whoever is
//! registered at notify time, nothing is replayed for late observers, and
//! observers whose buffer is full are dropped.
//!
//! # Example
//!
//! ```ignore
//! let handle = store.observe(ObserverConfig::collection());
//!
//! loop {
//!     match handle.recv() {
//!         Ok(StoreEvent::Changed(change)) => reload(),
//!         Ok(StoreEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::ObserverManager;
pub use types::{
    ChangeEvent, ChangeKind, DropReason, ObserverConfig, ObserverHandle, ObserverId, StoreEvent,
};
