//! Registration and login handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, PortalError};

/// `POST /api/auth/register` — Create an account.
///
/// # Errors
///
/// Returns [`PortalError`] for blank fields, an unknown role, or a taken
/// email.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    summary = "Register",
    description = "Creates an account (role `USER` unless `HR` is requested) and returns a bearer token.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing field or unknown role", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Json(req) = payload?;
    let session = state.account_service.register(req.try_into()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token: None,
            data: session.into(),
        }),
    ))
}

/// `POST /api/auth/login` — Exchange credentials for a token.
///
/// # Errors
///
/// Returns [`PortalError::Unauthorized`] for a wrong email or password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies email and password and returns a bearer token, also repeated at the top level.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Json(req) = payload?;
    let session = state
        .account_service
        .login(&req.email, &req.password)
        .await?;
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(session.token.clone()),
        data: session.into(),
    }))
}

/// Auth routes, mounted under `/api/auth`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
