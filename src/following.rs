//! Topic subscriptions for followed authors.
//!
//! Each author key is a pub/sub topic. Turning a toggle on subscribes to the
//! topic, turning it off unsubscribes. Calls are fire-and-forget: the outcome
//! is logged and returned, but a failure never rolls back the toggle.

use crate::contract::{is_followable, FOLLOWABLE_KEYS};
use crate::error::Result;
use crate::preferences::FollowingPreferences;
use tracing::{info, warn};

/// The external pub/sub service.
pub trait TopicTransport: Send + Sync {
    fn subscribe_to_topic(&self, topic: &str) -> Result<()>;
    fn unsubscribe_from_topic(&self, topic: &str) -> Result<()>;
}

/// Result of a single toggle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Subscribed(String),
    Unsubscribed(String),
    /// The transport call failed; the toggle keeps its new value.
    Failed { topic: String, reason: String },
    /// The key is not a followable author.
    Ignored(String),
}

/// Maps toggle changes to transport calls.
pub struct SubscriptionManager<T: TopicTransport> {
    transport: T,
}

impl<T: TopicTransport> SubscriptionManager<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// React to a toggle that has already been persisted.
    pub fn on_toggle(&self, author_key: &str, subscribed: bool) -> ToggleOutcome {
        let result = if subscribed {
            self.transport.subscribe_to_topic(author_key)
        } else {
            self.transport.unsubscribe_from_topic(author_key)
        };

        match result {
            Ok(()) if subscribed => {
                info!(topic = author_key, "Subscribed to topic");
                ToggleOutcome::Subscribed(author_key.to_string())
            }
            Ok(()) => {
                info!(topic = author_key, "Unsubscribed from topic");
                ToggleOutcome::Unsubscribed(author_key.to_string())
            }
            Err(e) => {
                warn!(topic = author_key, subscribed, error = %e, "Topic call failed");
                ToggleOutcome::Failed {
                    topic: author_key.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Persist a toggle, then call the transport if the value changed.
    ///
    /// Keys outside the followable set are ignored, and nothing is written.
    /// Returns `None` when the stored value was already `subscribed`.
    pub fn toggle(
        &self,
        prefs: &mut FollowingPreferences,
        author_key: &str,
        subscribed: bool,
    ) -> Result<Option<ToggleOutcome>> {
        if !is_followable(author_key) {
            return Ok(Some(ToggleOutcome::Ignored(author_key.to_string())));
        }
        if !prefs.set(author_key, subscribed)? {
            return Ok(None);
        }
        Ok(Some(self.on_toggle(author_key, subscribed)))
    }

    /// Re-issue the transport call for every followable key from `prefs`.
    pub fn resync(&self, prefs: &FollowingPreferences) -> Vec<ToggleOutcome> {
        FOLLOWABLE_KEYS
            .iter()
            .map(|key| self.on_toggle(key, prefs.is_following(key)))
            .collect()
    }
}
