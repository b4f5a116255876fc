//! Password session authentication for the admin panel.
//!
//! Login exchanges the admin password for an opaque session token; admin
//! routes require the token as a bearer credential. Password comparison is
//! constant-time to mitigate timing attacks.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Live admin session tokens, held in application state.
#[derive(Clone, Default)]
pub struct Sessions {
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new session token.
    pub fn issue(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let mut tokens = match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tokens.insert(token.clone());
        token
    }

    /// Whether a token belongs to a live session.
    pub fn contains(&self, token: &str) -> bool {
        let tokens = match self.tokens.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tokens.contains(token)
    }

    /// End a session. Returns whether the token was live.
    pub fn revoke(&self, token: &str) -> bool {
        let mut tokens = match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tokens.remove(token)
    }
}

/// Session authentication layer for admin routes.
pub async fn session_auth_layer(
    admin_password: Option<String>,
    sessions: Sessions,
    request: Request,
    next: Next,
) -> Response {
    // If no admin password is configured, allow all requests (dev mode)
    if admin_password.is_none() {
        return next.run(request).await;
    }

    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    match bearer {
        Some(token) if sessions.contains(&token) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid or expired session token"),
        None => unauthorized_response("Missing session token"),
    }
}

/// Perform constant-time password comparison.
pub fn verify_password(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
