//! Background loading of the filtered squawk list.
//!
//! A [`FeedLoader`] owns a worker thread that runs the filtered query, sends
//! the rows to the UI and queries again whenever the messages collection
//! changes. The worker lives exactly as long as the loader: dropping it (or
//! calling [`FeedLoader::shutdown`]) cancels and joins the thread.

use crate::error::Result;
use crate::filter::AuthorFilter;
use crate::observers::{ObserverConfig, ObserverHandle, StoreEvent};
use crate::store::SquawkStore;
use crate::types::{Selection, SortOrder, Squawk};
use crossbeam_channel::{select, unbounded, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Output of the feed worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedUpdate {
    /// Fresh query result, in display order.
    Loaded(Vec<Squawk>),
    /// The query failed; keep showing what you have.
    Failed(String),
}

/// Handle to a running feed worker.
pub struct FeedLoader {
    updates: Receiver<FeedUpdate>,
    cancel: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl FeedLoader {
    /// Start loading squawks that pass `filter`, ordered by `sort`.
    pub fn start(store: Arc<SquawkStore>, filter: &AuthorFilter, sort: SortOrder) -> Result<Self> {
        debug!(selection = %filter, "Starting squawk feed");

        let selection = filter.to_selection();
        let (updates_tx, updates) = unbounded();
        let (cancel, cancel_rx) = crossbeam_channel::bounded::<()>(0);

        let worker = thread::Builder::new()
            .name("squawk-feed".to_string())
            .spawn(move || run(store, selection, sort, updates_tx, cancel_rx))?;

        Ok(Self {
            updates,
            cancel: Some(cancel),
            worker: Some(worker),
        })
    }

    /// Results from the worker, newest last.
    pub fn updates(&self) -> &Receiver<FeedUpdate> {
        &self.updates
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Disconnecting the cancel channel wakes the worker.
        drop(self.cancel.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Squawk feed worker panicked");
            }
        }
    }
}

impl Drop for FeedLoader {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Wake {
    Reload,
    Reregister,
    Stop,
}

/// Swallow the changes already buffered on `watch`. Returns
/// [`Wake::Reregister`] if the observer was dropped meanwhile.
fn coalesce(watch: &ObserverHandle) -> Wake {
    loop {
        match watch.try_recv() {
            Ok(StoreEvent::Changed(_)) => continue,
            Ok(StoreEvent::Dropped { .. }) | Err(TryRecvError::Disconnected) => {
                return Wake::Reregister
            }
            Err(TryRecvError::Empty) => return Wake::Reload,
        }
    }
}

fn run(
    store: Arc<SquawkStore>,
    selection: Selection,
    sort: SortOrder,
    updates: Sender<FeedUpdate>,
    cancel: Receiver<()>,
) {
    let mut watch = store.observe(ObserverConfig::collection());

    loop {
        let update = match store.query(Some(&selection), sort) {
            Ok(cursor) => FeedUpdate::Loaded(cursor.collect()),
            Err(e) => {
                warn!(error = %e, "Squawk query failed");
                FeedUpdate::Failed(e.to_string())
            }
        };
        if updates.send(update).is_err() {
            break;
        }

        // Only the cancel channel stops the worker. Losing the watch just
        // means registering again and reloading.
        let wake = select! {
            recv(watch.receiver) -> event => match event {
                Ok(StoreEvent::Changed(_)) => coalesce(&watch),
                Ok(StoreEvent::Dropped { .. }) | Err(_) => Wake::Reregister,
            },
            recv(cancel) -> _ => Wake::Stop,
        };

        match wake {
            Wake::Reload => {}
            Wake::Reregister => {
                debug!(observer = watch.id.0, "Feed watch dropped, registering again");
                watch = store.observe(ObserverConfig::collection());
            }
            Wake::Stop => break,
        }
    }

    store.unobserve(watch.id);
    debug!("Squawk feed stopped");
}
