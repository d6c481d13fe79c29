//! User-facing alerts for incoming squawks.

use crate::routes::Route;
use parking_lot::RwLock;
use std::borrow::Cow;

/// Character appended to truncated alert text.
pub const ELLIPSIS: char = '\u{2026}';

/// Identifier of the alert slot. There is only one: new alerts replace it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AlertId(pub u32);

impl AlertId {
    pub const SQUAWK: AlertId = AlertId(0);
}

/// An alert ready to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub channel: String,
    pub title: String,
    pub body: String,
    /// Where tapping the alert leads.
    pub target: Route,
}

/// Somewhere alerts can be shown.
pub trait AlertSink: Send + Sync {
    fn show(&self, alert: &Alert);
}

/// Holds at most one active alert.
#[derive(Debug, Default)]
pub struct AlertSlot {
    current: RwLock<Option<Alert>>,
}

impl AlertSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Alert> {
        self.current.read().clone()
    }

    /// Clear the slot, returning what was there.
    pub fn dismiss(&self) -> Option<Alert> {
        self.current.write().take()
    }
}

impl AlertSink for AlertSlot {
    fn show(&self, alert: &Alert) {
        *self.current.write() = Some(alert.clone());
    }
}

/// Shorten `text` to `max_chars` characters plus [`ELLIPSIS`].
/// Text that already fits is returned unchanged.
pub fn truncate_for_display(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut short = String::with_capacity(cut + ELLIPSIS.len_utf8());
            short.push_str(&text[..cut]);
            short.push(ELLIPSIS);
            Cow::Owned(short)
        }
    }
}
