//! Session authentication middleware
//!
//! Extracts the session JWT from the `session_token` cookie or the
//! `Authorization: Bearer` header, resolves it through the [`AuthGateway`]
//! and makes the [`AuthUser`] available to handlers via Axum's Extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::auth_gateway::{AuthError, AuthGateway, AuthUser};
use crate::models::ErrorResponse;

pub const SESSION_COOKIE: &str = "session_token";

/// Find the session token, preferring the cookie over the header
///
/// `Ok(None)` means neither is present; a malformed `Authorization` header
/// is an error.
pub fn extract_token(
    headers: &HeaderMap,
) -> Result<Option<String>, (StatusCode, Json<ErrorResponse>)> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        })
        .filter(|token| !token.is_empty());

    if let Some(token) = from_cookie {
        return Ok(Some(token.to_string()));
    }

    let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(None);
    };

    auth_header
        .strip_prefix("Bearer ")
        .map(|token| Some(token.to_string()))
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "Invalid Authorization header format. Expected 'Bearer <token>'",
                    "INVALID_AUTH_FORMAT",
                )),
            )
        })
}

/// Require an active session
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - Token is malformed, expired or signed with another secret
/// - Token type is not "session"
/// - The session was signed out
pub async fn require_auth(
    State(gateway): State<Arc<AuthGateway>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_token(request.headers())?.ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Missing authentication token (cookie or Authorization header)",
                "MISSING_AUTH",
            )),
        )
    })?;

    let auth_user = gateway.authenticate(&token).await.map_err(|e| {
        debug!("Rejected session token: {}", e);
        let status = match e {
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        (status, Json(ErrorResponse::new(e.to_string(), e.code())))
    })?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
