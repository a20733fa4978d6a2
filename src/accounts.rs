//! Account service
//!
//! Registration, credential checks and admin seeding on top of the
//! credential store.

use crate::auth::{hash_password_async, verify_password_async, Role};
use crate::config::SeedAdmin;
use crate::error::{ApiResult, AppError};
use crate::models::{normalize_email, Account};
use crate::state::AppState;
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

/// Uniform login failure; does not reveal whether the email exists
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Verified against when the email is unknown so both failure paths cost a bcrypt check
static DUMMY_HASH: OnceCell<Option<String>> = OnceCell::const_new();

/// The padding hash, computed once on the blocking pool
async fn dummy_hash() -> Option<&'static String> {
    DUMMY_HASH
        .get_or_init(|| async {
            hash_password_async("staffdesk-timing-pad".to_string())
                .await
                .ok()
        })
        .await
        .as_ref()
}

/// Fields needed to open an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Hash the password and insert the account. Fails with `Duplicate` when the
/// email is already registered.
pub async fn register_account(state: &AppState, new: NewAccount) -> ApiResult<Account> {
    let email = normalize_email(&new.email);

    if state
        .bounded("account lookup", state.accounts.find_by_email(&email))
        .await?
        .is_some()
    {
        return Err(AppError::Duplicate(crate::db::DUPLICATE_EMAIL.to_string()));
    }

    let password_hash = hash_password_async(new.password).await?;

    let now = Utc::now();
    let account = Account {
        id: Uuid::new_v4(),
        email,
        password_hash,
        role: new.role,
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        phone: None,
        address: None,
        department_id: None,
        position: None,
        joining_date: now.date_naive(),
        created_at: now,
        updated_at: now,
    };

    // The store enforces uniqueness again for concurrent registrations
    let created = state
        .bounded("account insert", state.accounts.create_account(account))
        .await?;

    info!("Registered {} account {}", created.role, created.id);
    Ok(created)
}

/// Check an email/password pair. Unknown email and wrong password fail identically.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> ApiResult<Account> {
    let email = normalize_email(email);
    let account = state
        .bounded("account lookup", state.accounts.find_by_email(&email))
        .await?;

    let Some(account) = account else {
        if let Some(dummy) = dummy_hash().await {
            verify_password_async(password.to_string(), dummy.clone()).await?;
        }
        return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password_async(password.to_string(), account.password_hash.clone()).await? {
        return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
    }

    Ok(account)
}

/// Create the configured admin account unless the email is already taken.
/// Returns whether an account was created.
pub async fn seed_admin(state: &AppState, seed: &SeedAdmin) -> ApiResult<bool> {
    let new = NewAccount {
        email: seed.email.clone(),
        password: seed.password.clone(),
        first_name: "System".to_string(),
        last_name: "Admin".to_string(),
        role: Role::Admin,
    };

    match register_account(state, new).await {
        Ok(account) => {
            info!("Seeded admin account {}", account.email);
            Ok(true)
        }
        Err(AppError::Duplicate(_)) => {
            warn!("Seed admin {} already exists, skipping", normalize_email(&seed.email));
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
