//! Push ingestion: inbound payload to stored squawk plus alert.
//!
//! Each payload is handled on its own, with no state kept between calls:
//!
//! 1. empty payloads are ignored
//! 2. fields are validated and the message is trimmed
//! 3. the squawk is inserted into the store
//! 4. an alert with the author and the (shortened) message is shown
//!
//! Steps 3 and 4 are independent. A failed insert is logged and reported in
//! the outcome, and the alert is shown anyway.

use crate::alerts::{truncate_for_display, Alert, AlertId, AlertSink};
use crate::contract::{COLUMN_AUTHOR, COLUMN_AUTHOR_KEY, COLUMN_DATE, COLUMN_MESSAGE};
use crate::error::{Result, SquawkError};
use crate::routes::Route;
use crate::store::SquawkStore;
use crate::types::{NewSquawk, SquawkId, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Data payload of a push message. Keys match the column names.
pub type InboundPayload = HashMap<String, String>;

/// Ingestion settings.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Longest message shown in an alert before it is cut.
    pub max_display_chars: usize,

    /// Alert channel name.
    pub alert_channel: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_display_chars: 30,
            alert_channel: "Squawker".to_string(),
        }
    }
}

/// What happened to one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The payload was empty.
    Ignored,

    /// The alert was shown. `stored` is the new row, or `None` with
    /// `persist_error` set if the insert failed.
    Delivered {
        alert: Alert,
        stored: Option<SquawkId>,
        persist_error: Option<String>,
    },
}

/// Turns push payloads into stored squawks and alerts.
pub struct Ingestor {
    store: Arc<SquawkStore>,
    alerts: Arc<dyn AlertSink>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(store: Arc<SquawkStore>, alerts: Arc<dyn AlertSink>) -> Self {
        Self::with_config(store, alerts, IngestConfig::default())
    }

    pub fn with_config(
        store: Arc<SquawkStore>,
        alerts: Arc<dyn AlertSink>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            alerts,
            config,
        }
    }

    /// Handle one received payload.
    ///
    /// Returns a validation error, with nothing stored or shown, when a
    /// required field is missing or the date is not an integer.
    pub fn on_message_received(&self, payload: &InboundPayload) -> Result<IngestOutcome> {
        if payload.is_empty() {
            debug!("Ignoring empty push payload");
            return Ok(IngestOutcome::Ignored);
        }
        info!(?payload, "Message data payload");

        let squawk = normalize(payload)?;
        let alert = self.build_alert(&squawk);

        let (stored, persist_error) = match self.store.insert(squawk) {
            Ok(id) => (Some(id), None),
            Err(e) => {
                warn!(error = %e, "Failed to store squawk");
                (None, Some(e.to_string()))
            }
        };

        self.alerts.show(&alert);

        Ok(IngestOutcome::Delivered {
            alert,
            stored,
            persist_error,
        })
    }

    /// Called when the push registration token changes.
    pub fn on_new_token(&self, token: &str) {
        debug!(token, "Refreshed push token");
    }

    fn build_alert(&self, squawk: &NewSquawk) -> Alert {
        Alert {
            id: AlertId::SQUAWK,
            channel: self.config.alert_channel.clone(),
            title: squawk.author.clone(),
            body: truncate_for_display(&squawk.message, self.config.max_display_chars)
                .into_owned(),
            target: Route::Messages,
        }
    }
}

/// Validate a payload and build the row to store, with the message trimmed.
pub fn normalize(payload: &InboundPayload) -> Result<NewSquawk> {
    let field = |name: &str| {
        payload
            .get(name)
            .ok_or_else(|| SquawkError::missing_field(name))
    };

    Ok(NewSquawk {
        author: field(COLUMN_AUTHOR)?.clone(),
        author_key: field(COLUMN_AUTHOR_KEY)?.clone(),
        message: trim_message(field(COLUMN_MESSAGE)?).to_string(),
        date: Timestamp::parse(field(COLUMN_DATE)?)?,
    })
}

/// Strip leading and trailing spaces and control characters.
pub fn trim_message(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertSlot, ELLIPSIS};

    fn payload(pairs: &[(&str, &str)]) -> InboundPayload {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ingestor() -> (Ingestor, Arc<SquawkStore>, Arc<AlertSlot>) {
        let store = Arc::new(SquawkStore::open_in_memory().unwrap());
        let slot = Arc::new(AlertSlot::new());
        let ingestor = Ingestor::new(Arc::clone(&store), slot.clone());
        (ingestor, store, slot)
    }

    #[test]
    fn test_trim_message() {
        assert_eq!(trim_message("  hello world  "), "hello world");
        assert_eq!(trim_message("\t\nhi\r\n"), "hi");
        assert_eq!(trim_message("   "), "");
    }

    #[test]
    fn test_empty_payload_is_ignored() {
        let (ingestor, store, slot) = ingestor();
        let outcome = ingestor.on_message_received(&InboundPayload::new()).unwrap();

        assert_eq!(outcome, IngestOutcome::Ignored);
        assert_eq!(store.count().unwrap(), 0);
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_missing_field_has_no_side_effects() {
        let (ingestor, store, slot) = ingestor();
        let result = ingestor.on_message_received(&payload(&[
            ("author", "Asser"),
            ("message", "hi"),
            ("date", "1"),
        ]));

        match result {
            Err(SquawkError::Validation(msg)) => assert!(msg.contains("authorKey")),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(store.count().unwrap(), 0);
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let (ingestor, _store, _slot) = ingestor();
        let result = ingestor.on_message_received(&payload(&[
            ("author", "Asser"),
            ("authorKey", "key_asser"),
            ("message", "hi"),
            ("date", "noon"),
        ]));
        assert!(matches!(result, Err(SquawkError::Validation(_))));
    }

    #[test]
    fn test_long_message_truncated_only_in_alert() {
        let (ingestor, store, slot) = ingestor();
        let text = "x".repeat(45);
        let outcome = ingestor
            .on_message_received(&payload(&[
                ("author", "Lyla"),
                ("authorKey", "key_lyla"),
                ("message", &text),
                ("date", "5"),
            ]))
            .unwrap();

        let IngestOutcome::Delivered { stored, .. } = outcome else {
            panic!("Expected delivery");
        };
        let row = store.get(stored.unwrap()).unwrap().unwrap();
        assert_eq!(row.message, text);

        let alert = slot.current().unwrap();
        assert_eq!(alert.body, format!("{}{}", "x".repeat(30), ELLIPSIS));
        assert_eq!(alert.title, "Lyla");
        assert_eq!(alert.id, AlertId::SQUAWK);
    }

    #[test]
    fn test_custom_display_limit() {
        let store = Arc::new(SquawkStore::open_in_memory().unwrap());
        let slot = Arc::new(AlertSlot::new());
        let ingestor = Ingestor::with_config(
            store,
            slot.clone(),
            IngestConfig {
                max_display_chars: 5,
                ..Default::default()
            },
        );

        ingestor
            .on_message_received(&payload(&[
                ("author", "Nikita"),
                ("authorKey", "key_nikita"),
                ("message", "abcdefgh"),
                ("date", "1"),
            ]))
            .unwrap();
        assert_eq!(slot.current().unwrap().body, format!("abcde{}", ELLIPSIS));
    }
}
