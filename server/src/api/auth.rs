//! Login, logout and auth-status routes.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{expired_session_cookie, session_cookie};
use crate::host::HostState;

/// Body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The shared password.
    pub password: String,
}

/// Outcome of a login attempt.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Whether a login cookie was issued.
    pub success: bool,
    /// Human-readable result.
    pub message: String,
}

/// Whether the caller currently passes the access gate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    /// `true` if gated routes would accept this request.
    pub is_authenticated: bool,
}

async fn login(State(state): State<Arc<HostState>>, Json(body): Json<LoginRequest>) -> Response {
    match state.gate().login(&body.password) {
        Some(token) => (
            [(header::SET_COOKIE, session_cookie(&token))],
            Json(LoginResponse {
                success: true,
                message: "Logged in".to_string(),
            }),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                message: "Invalid password".to_string(),
            }),
        )
            .into_response(),
    }
}

async fn logout(State(state): State<Arc<HostState>>, headers: HeaderMap) -> Response {
    state.gate().logout(&headers);
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
        .into_response()
}

async fn auth_status(State(state): State<Arc<HostState>>, headers: HeaderMap) -> Json<AuthStatus> {
    Json(AuthStatus {
        is_authenticated: state.gate().is_authorized(&headers),
    })
}

/// Authentication routes.
pub fn router(state: Arc<HostState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth-status", get(auth_status))
        .with_state(state)
}
