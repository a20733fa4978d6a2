//! Authentication middleware
//!
//! Extracts and validates bearer tokens from requests and attaches the
//! resolved [`RequestIdentity`] to the request extensions.

use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::Role;

/// Legacy token header, honoured only when enabled in configuration
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Identity of the authenticated caller for the lifetime of one request.
///
/// Built from verified token claims; the account is not re-read from the
/// store, so a role change takes effect when the caller's next token is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    pub account_id: Uuid,
    pub role: Role,
}

/// Handlers take `RequestIdentity` as an argument to read what the
/// middleware attached. Absence means the route was not behind
/// [`require_auth`], which is reported as unauthenticated.
impl<S: Send + Sync> FromRequestParts<S> for RequestIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthenticated("No token, authorization denied".to_string()))
    }
}

/// Locate the bearer token on a request.
///
/// `Authorization: Bearer <token>` is canonical. A missing header is
/// `Unauthenticated`; a header in any other shape is `InvalidToken`.
pub fn bearer_token(headers: &HeaderMap, accept_legacy: bool) -> Result<String, AppError> {
    if headers.contains_key(AUTHORIZATION) {
        return headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::InvalidToken("Invalid authorization header format".to_string())
            });
    }

    if accept_legacy {
        if let Some(value) = headers.get(LEGACY_TOKEN_HEADER) {
            return value
                .to_str()
                .ok()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidToken("Invalid token header".to_string()));
        }
    }

    Err(AppError::Unauthenticated(
        "No token, authorization denied".to_string(),
    ))
}

/// Verify the request's bearer token and attach the caller's identity
pub async fn require_auth(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers(), state.accept_legacy_header)?;
    let identity = state.tokens.verify(&token).inspect_err(|e| {
        debug!("Rejected bearer token: {}", e);
    })?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
