//! Application state management
//!
//! Contains shared state accessible across all handlers. Everything here is
//! read-only after startup; mutable data lives behind the stores.

use crate::auth::TokenIssuer;
use crate::config::AuthConfig;
use crate::db::{
    with_timeout, AccountStore, AttendanceStore, DepartmentStore, LeaveStore, PayslipStore, Store,
};
use crate::error::ApiResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
pub struct AppState {
    /// Credential store
    pub accounts: Arc<dyn AccountStore>,
    pub departments: Arc<dyn DepartmentStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub leaves: Arc<dyn LeaveStore>,
    pub payslips: Arc<dyn PayslipStore>,

    /// Token signing and verification, keyed by the process-wide secret
    pub tokens: TokenIssuer,

    /// Accept `x-auth-token` in addition to `Authorization: Bearer`
    pub accept_legacy_header: bool,

    /// Upper bound for any single store call
    pub store_timeout: Duration,
}

impl AppState {
    /// Build state over a single backend serving every collection
    pub fn new<S: Store + 'static>(store: Arc<S>, auth: &AuthConfig, store_timeout: Duration) -> Self {
        Self {
            accounts: store.clone(),
            departments: store.clone(),
            attendance: store.clone(),
            leaves: store.clone(),
            payslips: store,
            tokens: TokenIssuer::new(auth.jwt_secret.as_bytes(), auth.token_ttl),
            accept_legacy_header: auth.accept_legacy_header,
            store_timeout,
        }
    }

    /// Run a store call under the configured timeout
    pub async fn bounded<T, F>(&self, what: &str, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        with_timeout(self.store_timeout, what, fut).await
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
