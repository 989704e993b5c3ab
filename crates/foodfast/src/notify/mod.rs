//! # Notifications
//!
//! Outbound events for live tracking. Order and delivery code describe what happened as
//! an [`Event`] and hand it to a [`Notifier`]; the [`relay`] fans it out to the browser
//! connections that joined the event's room.
//!
//! Delivery is at-most-once. Nothing is stored for clients that connect later, and a
//! failed emit never undoes the state change it describes. Instead every mutation reports
//! one [`NotificationOutcome`] per event, wrapped with its result in [`Notified`].

pub mod relay;

pub use relay::{Envelope, NotificationRelay, RelayClient, Subscription};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const NEW_ORDER: &str = "new_order";
pub const STATUS_UPDATE: &str = "status_update";
pub const ADMIN_DATA_UPDATE: &str = "admin_data_update";
pub const DELIVERY_CANCELLED: &str = "delivery_cancelled";

/// Wire payload of `POST /socket/emit`. Without a room the event goes to everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Event {
    pub fn to_room(event: &str, room: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.to_string(),
            room: Some(room.into()),
            data,
        }
    }

    pub fn broadcast(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            room: None,
            data,
        }
    }
}

/// What the relay acknowledged. A remote relay may not report a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitReceipt {
    pub recipients: Option<usize>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    #[error("Notification relay is closed")]
    RelayClosed,

    #[error("Relay transport error: {0}")]
    Transport(String),

    #[error("Relay rejected the event with status {0}")]
    Rejected(u16),
}

/// Sends events to subscribers. Implemented in process by [`RelayClient`] and over the
/// network by [`HttpNotifier`](crate::remote::HttpNotifier).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn emit(&self, event: Event) -> Result<EmitReceipt, NotifyError>;
}

/// Result of one attempted emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum NotificationOutcome {
    Delivered {
        event: String,
        room: Option<String>,
        recipients: Option<usize>,
    },
    Failed {
        event: String,
        room: Option<String>,
        error: String,
    },
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// A committed result plus the fate of the notifications it triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct Notified<T> {
    pub value: T,
    pub notifications: Vec<NotificationOutcome>,
}

impl<T> Notified<T> {
    pub fn all_delivered(&self) -> bool {
        self.notifications.iter().all(NotificationOutcome::is_delivered)
    }
}

/// Emits each event in order and records the outcome. Failures are logged, not returned.
pub async fn emit_all(notifier: &dyn Notifier, events: Vec<Event>) -> Vec<NotificationOutcome> {
    let mut outcomes = Vec::with_capacity(events.len());
    for event in events {
        let Event { event: name, room, .. } = event.clone();
        match notifier.emit(event).await {
            Ok(receipt) => {
                debug!(event = %name, ?room, recipients = ?receipt.recipients, "Notification sent");
                outcomes.push(NotificationOutcome::Delivered {
                    event: name,
                    room,
                    recipients: receipt.recipients,
                });
            }
            Err(e) => {
                warn!(event = %name, ?room, error = %e, "Notification failed");
                outcomes.push(NotificationOutcome::Failed {
                    event: name,
                    room,
                    error: e.to_string(),
                });
            }
        }
    }
    outcomes
}
