//! Axum WebSocket upgrade handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::auth::bearer_token;
use crate::error::PortalError;

/// Query parameters accepted on `/ws`.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Bearer token, for clients that cannot set headers on the handshake.
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /ws` — Authenticate, then upgrade HTTP connection to WebSocket.
///
/// The identity gate runs before the upgrade: a missing, invalid or expired
/// token is answered with `401` and no connection or group membership is
/// created. Without an event bus the endpoint answers `503`.
///
/// # Errors
///
/// Returns [`PortalError::RealtimeUnavailable`] or
/// [`PortalError::Unauthorized`].
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<WsParams>, QueryRejection>,
) -> Result<Response, PortalError> {
    let Some(bus) = state.event_bus.clone() else {
        return Err(PortalError::RealtimeUnavailable);
    };

    let params = params.map(|Query(p)| p).unwrap_or_default();
    let credential = params
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_token(&headers));
    let handle = bus.connect(&state.tokens, credential).await?;

    let connection_id = handle.id();
    let evict_bus = bus.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!(%connection_id, error = %e, "ws upgrade failed");
            tokio::spawn(async move {
                evict_bus.evict(connection_id).await;
            });
        })
        .on_upgrade(move |socket| run_connection(socket, handle, bus))
        .into_response())
}
