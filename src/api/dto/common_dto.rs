//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Body of `GET /`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfoResponse {
    /// Always `true`.
    pub success: bool,
    /// Service greeting.
    pub message: String,
    /// Crate version.
    pub version: String,
    /// Whether `/ws` accepts connections on this instance.
    pub realtime: bool,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy` while the process serves requests.
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Whether the event bus is running.
    pub realtime: bool,
    /// Live real-time connections.
    pub connections: usize,
}
