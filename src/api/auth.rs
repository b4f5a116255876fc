//! Authentication API endpoints.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth;
use crate::errors::AppError;
use crate::AppState;

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/auth/login - Exchange the admin password for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let Some(expected) = state.config.admin_password.as_deref() else {
        return Err(AppError::Unauthorized(
            "Authentication is not configured".to_string(),
        ));
    };

    if !auth::verify_password(&request.password, expected) {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    success(LoginResponse {
        token: state.sessions.issue(),
    })
}

/// POST /api/auth/logout - End the session behind the bearer token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    match token {
        Some(token) if state.sessions.revoke(token) => success(()),
        _ => Err(AppError::Unauthorized(
            "No live session for that token".to_string(),
        )),
    }
}
