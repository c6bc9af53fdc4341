//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single authenticated WebSocket
//! connection: answers client commands and forwards bus events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use super::messages::{WsMessage, WsMessageType};
use crate::domain::{ConnectionHandle, EventBus};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and answers them.
/// - Forwards every event delivered to `handle` to the client.
///
/// The handle is disconnected from `bus` when the loop ends, whichever
/// side closed first.
pub async fn run_connection(socket: WebSocket, mut handle: ConnectionHandle, bus: EventBus) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let connection_id = handle.id();
    let principal = handle.principal();
    tracing::info!(
        %connection_id,
        user_id = %principal.id,
        role = %principal.role,
        "ws client connected"
    );

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(text.as_str());
                        if let Some(reply) = reply
                            && ws_tx.send(Message::text(reply)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%connection_id, error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = handle.recv() => {
                match event {
                    Ok(event) => {
                        let json = match WsMessage::from_event(&event)
                            .and_then(|msg| serde_json::to_string(&msg))
                        {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::warn!(event = event.name(), error = %e, "dropping unserializable event");
                                continue;
                            }
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(%connection_id, lagged = n, "ws client lagged behind event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    bus.disconnect(&mut handle).await;
    tracing::info!(%connection_id, "ws client disconnected");
}

/// Handles a text frame from the client, returning an optional JSON reply.
fn handle_text_message(text: &str) -> Option<String> {
    let reply = match serde_json::from_str::<WsMessage>(text) {
        Err(_) if text.trim() == "ping" => WsMessage::pong(String::new()),
        Err(_) => WsMessage::error(String::new(), 400, "malformed JSON"),
        Ok(msg) if msg.msg_type != WsMessageType::Command => {
            WsMessage::error(msg.id, 400, "expected a command")
        }
        Ok(msg) => match msg.event.as_deref() {
            Some("ping") => WsMessage::pong(msg.id),
            _ => WsMessage::error(msg.id, 404, "unknown command"),
        },
    };
    serde_json::to_string(&reply).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn reply(text: &str) -> serde_json::Value {
        let Some(json) = handle_text_message(text) else {
            panic!("every frame gets a reply");
        };
        let Ok(value) = serde_json::from_str(&json) else {
            panic!("reply is JSON");
        };
        value
    }

    #[test]
    fn ping_gets_pong() {
        let value = reply(r#"{"id":"1","type":"command","event":"ping"}"#);
        assert_eq!(value.get("type"), Some(&serde_json::json!("response")));
        assert_eq!(value.get("event"), Some(&serde_json::json!("pong")));
        assert_eq!(value.get("id"), Some(&serde_json::json!("1")));
    }

    #[test]
    fn bare_ping_is_accepted() {
        let value = reply("ping");
        assert_eq!(value.get("event"), Some(&serde_json::json!("pong")));
    }

    #[test]
    fn garbage_and_unknown_commands_are_errors() {
        let value = reply("{not json");
        assert_eq!(value.get("type"), Some(&serde_json::json!("error")));

        let value = reply(r#"{"type":"command","event":"subscribe"}"#);
        assert_eq!(
            value.get("payload").and_then(|p| p.get("code")),
            Some(&serde_json::json!(404))
        );
    }
}
