//! Role gate for privileged routes

use crate::auth::{RequestIdentity, Role};
use crate::error::AppError;

/// Authorize the caller when their role is one of `allowed`.
///
/// Roles are compared by membership only; `admin` does not imply `employee`.
pub fn require_role(identity: &RequestIdentity, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&identity.role) {
        return Ok(());
    }

    let wanted: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(AppError::Forbidden(format!(
        "Requires {} role, you have {}",
        wanted.join(" or "),
        identity.role
    )))
}
