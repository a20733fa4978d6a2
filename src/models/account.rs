//! Account model and the auth/profile DTOs built on it

use crate::auth::{IssuedToken, Role};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").expect("phone pattern is valid")
});

/// A registered employee or administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // Never send password hash to client
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department_id: Option<Uuid>,
    pub position: Option<String>,
    pub joining_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Account as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department_id: Option<Uuid>,
    pub department_name: Option<String>,
    pub position: Option<String>,
    pub joining_date: NaiveDate,
}

impl AccountResponse {
    pub fn with_department_name(mut self, name: Option<String>) -> Self {
        self.department_name = name;
        self
    }
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            display_name: account.display_name(),
            phone: account.phone.clone(),
            address: account.address.clone(),
            department_id: account.department_id,
            department_name: None,
            position: account.position.clone(),
            joining_date: account.joining_date,
        }
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        email(message = "A valid email is required"),
        length(max = 255, message = "Email is too long")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    pub role: Option<Role>,
}

impl RegisterRequest {
    /// Canonical email, so validation sees what will be stored
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body returned by register and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    #[serde(flatten)]
    pub token: IssuedToken,
    pub account: AccountResponse,
}

#[derive(Debug, Serialize)]
pub struct AccountEnvelope {
    pub success: bool,
    pub account: AccountResponse,
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub success: bool,
    pub employees: Vec<AccountResponse>,
}

/// Self-service profile edit. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid"))]
    pub phone: Option<String>,
    #[validate(length(max = 500, message = "Address is too long"))]
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, account: &mut Account, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            account.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            account.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            account.phone = Some(phone);
        }
        if let Some(address) = self.address {
            account.address = Some(address);
        }
        account.updated_at = now;
    }
}

/// Admin placement of an employee. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentUpdate {
    pub department_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "Position must be 1-100 characters"))]
    pub position: Option<String>,
}

impl AssignmentUpdate {
    pub fn apply(self, account: &mut Account, now: DateTime<Utc>) {
        if let Some(department_id) = self.department_id {
            account.department_id = Some(department_id);
        }
        if let Some(position) = self.position {
            account.position = Some(position);
        }
        account.updated_at = now;
    }
}
