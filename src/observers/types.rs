//! Observer types for store change notifications.

use crate::routes::Route;
use crate::types::SquawkId;

/// Configuration for an observer.
#[derive(Clone, Debug)]
pub struct ObserverConfig {
    /// Max buffered events before dropping the observer.
    /// Default: 256
    pub buffer_size: usize,

    /// Which part of the store to watch.
    pub scope: Route,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            scope: Route::Messages,
        }
    }
}

impl ObserverConfig {
    /// Watch the whole messages collection.
    pub fn collection() -> Self {
        Self::default()
    }

    /// Watch a single message.
    pub fn item(id: SquawkId) -> Self {
        Self {
            scope: Route::MessageWithId(id),
            ..Default::default()
        }
    }
}

/// What happened to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted(SquawkId),
    Updated(SquawkId),
    Deleted(SquawkId),
}

impl ChangeKind {
    pub fn id(&self) -> SquawkId {
        match *self {
            ChangeKind::Inserted(id) | ChangeKind::Updated(id) | ChangeKind::Deleted(id) => id,
        }
    }
}

/// A change notification, addressed to the route that was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub route: Route,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Inserts notify the collection they were written to.
    pub fn inserted(id: SquawkId) -> Self {
        Self {
            route: Route::Messages,
            kind: ChangeKind::Inserted(id),
        }
    }

    pub fn updated(id: SquawkId) -> Self {
        Self {
            route: Route::MessageWithId(id),
            kind: ChangeKind::Updated(id),
        }
    }

    pub fn deleted(id: SquawkId) -> Self {
        Self {
            route: Route::MessageWithId(id),
            kind: ChangeKind::Deleted(id),
        }
    }
}

/// Events delivered to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// Something in the observed scope changed.
    Changed(ChangeEvent),

    /// The observer was removed.
    Dropped { reason: DropReason },
}

/// Why an observer was dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unregistered.
    Unregistered,
}

/// Unique identifier for an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Receiving end of an observer registration.
pub struct ObserverHandle {
    pub id: ObserverId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<StoreEvent>,
}

impl ObserverHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<StoreEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Discard everything buffered so far. Returns true if anything was pending.
    pub fn drain(&self) -> bool {
        let mut any = false;
        while self.receiver.try_recv().is_ok() {
            any = true;
        }
        any
    }
}
