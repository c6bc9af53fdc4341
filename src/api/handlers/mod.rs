//! REST endpoint handlers organized by resource.

pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod jobs;
pub mod resumes;
pub mod system;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health_handler))
        .nest("/auth", auth::routes())
        .nest("/jobs", jobs::routes())
        .nest("/applications", applications::routes())
        .nest("/resumes", resumes::routes())
        .nest("/dashboard", dashboard::routes())
        .nest("/stats", dashboard::routes())
}
