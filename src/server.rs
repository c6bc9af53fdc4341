//! Process wiring: store selection, application state and the router.
//!
//! `main` calls [`build_state`] then [`build_app`]; integration tests call
//! [`build_app`] directly with a state over an in-process store.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
#[cfg(not(feature = "swagger-ui"))]
use utoipa::OpenApi;

use crate::api;
use crate::app_state::AppState;
use crate::auth::{PasswordService, TokenService};
use crate::config::PortalConfig;
use crate::domain::EventBus;
use crate::error::PortalError;
use crate::persistence::{MemoryStore, PortalStore, PostgresStore};
use crate::storage::LocalDiskStorage;
use crate::ws::handler::ws_handler;

/// Builds the application state described by `config`.
///
/// Connects to PostgreSQL when persistence is enabled, otherwise uses the
/// in-process store. Resumes go to local disk under the configured
/// directory. The event bus exists only when real-time delivery is
/// enabled.
///
/// # Errors
///
/// Returns [`PortalError::PersistenceError`] if the database cannot be
/// reached or migrated.
pub async fn build_state(config: &PortalConfig) -> Result<AppState, PortalError> {
    let store: Arc<dyn PortalStore> = if config.persistence_enabled {
        let store = PostgresStore::connect(config).await?;
        tracing::info!("using PostgreSQL store");
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, data lives in process memory only");
        Arc::new(MemoryStore::new())
    };

    let resumes = Arc::new(LocalDiskStorage::new(&config.resume_storage_dir));
    tracing::info!(dir = %config.resume_storage_dir.display(), "resume storage on local disk");

    let tokens = Arc::new(TokenService::new(&config.token_config()));
    let event_bus = config
        .realtime_enabled
        .then(|| EventBus::new(config.event_bus_capacity));
    if event_bus.is_none() {
        tracing::info!("real-time notifications disabled");
    }

    Ok(AppState::new(
        store,
        resumes,
        config.resume_max_bytes,
        tokens,
        PasswordService::default(),
        event_bus,
    ))
}

/// Builds the CORS layer from the configured origins.
fn cors_layer(config: &PortalConfig) -> CorsLayer {
    let Some(origins) = &config.cors_origins else {
        return CorsLayer::permissive();
    };
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the complete router: REST API, `/ws`, OpenAPI document, tracing
/// and CORS.
pub fn build_app(state: AppState, config: &PortalConfig) -> Router {
    let router = api::build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-doc/openapi.json", <api::ApiDoc as utoipa::OpenApi>::openapi()),
    );
    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-doc/openapi.json",
        get(|| async { axum::Json(api::ApiDoc::openapi()) }),
    );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(state)
}
