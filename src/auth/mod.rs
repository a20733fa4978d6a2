//! Authentication and authorization module
//!
//! Provides bcrypt password hashing, JWT bearer tokens, the request
//! authentication middleware and the per-route role gate.

mod gate;
mod jwt;
mod middleware;
mod password;

pub use gate::require_role;
pub use jwt::{Claims, IssuedToken, TokenIssuer};
pub use middleware::{bearer_token, require_auth, RequestIdentity};
pub use password::{hash_password, hash_password_async, verify_password, verify_password_async};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account roles. There is no hierarchy: routes list the roles they accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}
