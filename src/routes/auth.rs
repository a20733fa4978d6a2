//! Authentication route handlers
//!
//! Provides register, login, me, and verify endpoints.

use super::ApiJson;
use crate::accounts::{authenticate, register_account, NewAccount};
use crate::auth::{bearer_token, require_role, RequestIdentity, Role};
use crate::error::{not_found_error, AppError};
use crate::models::{AccountEnvelope, AuthResponse, LoginRequest, RegisterRequest};
use crate::state::SharedState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub identity: RequestIdentity,
}

/// POST /api/auth/register
///
/// Open an account and sign the caller in. New accounts are employees;
/// asking for `admin` requires an admin bearer token.
pub async fn register(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = req.normalized();
    req.validate()?;

    let role = req.role.unwrap_or_default();
    if role == Role::Admin {
        let token = bearer_token(&headers, state.accept_legacy_header)?;
        let caller = state.tokens.verify(&token)?;
        require_role(&caller, &[Role::Admin])?;
    }

    let account = register_account(
        &state,
        NewAccount {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role,
        },
    )
    .await?;

    let token = state.tokens.issue(account.id, account.role)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            account: (&account).into(),
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with email and password, receive a JWT.
pub async fn login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let account = authenticate(&state, &req.email, &req.password).await?;
    let token = state.tokens.issue(account.id, account.role)?;
    info!("Account {} signed in", account.id);

    Ok(Json(AuthResponse {
        success: true,
        token,
        account: (&account).into(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<AccountEnvelope>, AppError> {
    let account = state
        .bounded("account lookup", state.accounts.find_by_id(identity.account_id))
        .await?
        .ok_or_else(|| not_found_error("Account not found"))?;

    Ok(Json(AccountEnvelope {
        success: true,
        account: super::employee::describe(&state, &account).await?,
    }))
}

/// GET /api/auth/verify
///
/// Confirms the presented token is valid without touching the store.
pub async fn verify(identity: RequestIdentity) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        identity,
    })
}
