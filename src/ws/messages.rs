//! WebSocket message types: the JSON envelope and its constructors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PortalEvent;

/// Top-level WebSocket message envelope.
///
/// ```json
/// {"id": "…", "type": "event", "event": "job-expired",
///  "timestamp": "…", "payload": {"jobId": 7, "jobTitle": "…", "message": "…"}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for commands; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// Command or event name (`ping`, `pong`, `new-application`, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

impl WsMessage {
    /// Wraps a bus event for delivery.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the payload cannot be encoded.
    pub fn from_event(event: &PortalEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            event: Some(event.name().to_string()),
            timestamp: Utc::now(),
            payload: event.payload()?,
        })
    }

    /// Reply to the command with id `id`.
    #[must_use]
    pub fn response(id: String, event: &str, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            event: Some(event.to_string()),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            event: None,
            timestamp: Utc::now(),
            payload: serde_json::json!({ "code": code, "message": message }),
        }
    }

    /// The `pong` reply to a `ping` command.
    #[must_use]
    pub fn pong(id: String) -> Self {
        let now = Utc::now();
        Self::response(
            id,
            "pong",
            serde_json::json!({
                "message": "Server is alive",
                "timestamp": now.to_rfc3339(),
            }),
        )
    }
}
