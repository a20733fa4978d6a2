//! JWT token management
//!
//! Handles creation and validation of bearer tokens. The signing secret is
//! loaded once at startup and held by [`TokenIssuer`] in the shared state.

use crate::auth::{RequestIdentity, Role};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: Uuid,
    /// Account role at issue time
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// A freshly minted token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 bearer tokens with a fixed TTL
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for an account, valid for the configured TTL from now
    pub fn issue(&self, account_id: Uuid, role: Role) -> Result<IssuedToken, AppError> {
        self.issue_at(account_id, role, Utc::now())
    }

    /// Issue a token as if minted at `issued_at`
    pub fn issue_at(
        &self,
        account_id: Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let iat = issued_at.timestamp();
        let exp = iat.saturating_add(self.ttl_secs);
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: account_id,
            role,
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and resolve the identity it carries
    pub fn verify(&self, token: &str) -> Result<RequestIdentity, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock. A token is rejected once
    /// `now >= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<RequestIdentity, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::InvalidToken("Token expired".to_string()),
                ErrorKind::InvalidSignature => {
                    AppError::InvalidToken("Invalid token signature".to_string())
                }
                _ => AppError::InvalidToken("Token is not valid".to_string()),
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(AppError::InvalidToken("Token expired".to_string()));
        }

        Ok(RequestIdentity {
            account_id: claims.sub,
            role: claims.role,
        })
    }
}
