//! Observer registry and change broadcast.

use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::types::{
    ChangeEvent, DropReason, ObserverConfig, ObserverHandle, ObserverId, StoreEvent,
};

/// Internal observer state.
///
/// The channel holds one slot more than `capacity`, kept free for the final
/// [`StoreEvent::Dropped`] notice.
struct Observer {
    config: ObserverConfig,
    sender: Sender<StoreEvent>,
    capacity: usize,
}

impl Observer {
    /// Try to send an event. Returns false if the observer should be dropped.
    fn try_send(&self, event: StoreEvent) -> bool {
        if self.sender.len() >= self.capacity {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn matches(&self, change: &ChangeEvent) -> bool {
        change.route.is_within(&self.config.scope)
    }
}

/// Keeps track of registered observers and notifies them of store changes.
pub struct ObserverManager {
    observers: RwLock<HashMap<ObserverId, Observer>>,
    next_id: AtomicU64,
    default_buffer_size: usize,
}

impl ObserverManager {
    pub fn new() -> Self {
        Self::with_buffer_size(ObserverConfig::default().buffer_size)
    }

    /// Create a manager whose [`register`](Self::register) uses `buffer_size`.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            default_buffer_size: buffer_size.max(1),
        }
    }

    /// Register an observer.
    pub fn observe(&self, config: ObserverConfig) -> ObserverHandle {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let capacity = config.buffer_size.max(1);
        let (sender, receiver) = bounded(capacity + 1);

        self.observers.write().insert(
            id,
            Observer {
                config,
                sender,
                capacity,
            },
        );

        ObserverHandle { id, receiver }
    }

    /// Register an observer on `scope` with the manager's default buffer size.
    pub fn register(&self, scope: crate::routes::Route) -> ObserverHandle {
        self.observe(ObserverConfig {
            buffer_size: self.default_buffer_size,
            scope,
        })
    }

    /// Unregister an observer. Unknown ids are ignored.
    pub fn unobserve(&self, id: ObserverId) {
        if let Some(observer) = self.observers.write().remove(&id) {
            let _ = observer.sender.try_send(StoreEvent::Dropped {
                reason: DropReason::Unregistered,
            });
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver `change` to every observer whose scope contains it.
    ///
    /// Observers that cannot take the event are dropped. An overflowed
    /// observer gets [`DropReason::BufferOverflow`] as its last event, unless
    /// a concurrent notify took the spare slot first; its channel then just
    /// disconnects.
    pub fn notify(&self, change: &ChangeEvent) {
        let mut to_remove = Vec::new();

        {
            let observers = self.observers.read();
            for (id, observer) in observers.iter() {
                if observer.matches(change) && !observer.try_send(StoreEvent::Changed(*change)) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut observers = self.observers.write();
            for id in to_remove {
                if let Some(observer) = observers.remove(&id) {
                    debug!(observer = id.0, "Dropping observer after failed delivery");
                    let _ = observer.sender.try_send(StoreEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for ObserverManager {
    fn default() -> Self {
        Self::new()
    }
}
