//! REST API layer: route handlers, DTOs, router composition and the
//! OpenAPI document.
//!
//! Resource endpoints are mounted under `/api`; service info and health
//! live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Job Portal API",
        description = "REST API for job postings, applications and HR resume files. Real-time `new-application` and `job-expired` notifications are delivered over the `/ws` WebSocket."
    ),
    paths(
        handlers::system::root_handler,
        handlers::system::health_handler,
        handlers::auth::register,
        handlers::auth::login,
        handlers::jobs::list_jobs,
        handlers::jobs::list_active_jobs,
        handlers::jobs::create_job,
        handlers::jobs::my_jobs,
        handlers::jobs::expire_job,
        handlers::jobs::apply,
        handlers::applications::list_for_caller,
        handlers::applications::list_received,
        handlers::applications::list_for_job,
        handlers::applications::list_submitted,
        handlers::resumes::upload,
        handlers::resumes::list,
        handlers::resumes::url,
        handlers::resumes::download,
        handlers::resumes::remove,
        handlers::dashboard::dashboard,
    ),
    components(schemas(ErrorResponse, ErrorBody)),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Service info and health"),
        (name = "Auth", description = "Registration and login"),
        (name = "Jobs", description = "Job board, posting, expiry and applying"),
        (name = "Applications", description = "Role-scoped application listings"),
        (name = "Resumes", description = "HR resume uploads and downloads"),
        (name = "Dashboard", description = "HR counters"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` JWT security scheme.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
}
