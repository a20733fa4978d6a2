//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains the stored entities and the request/response structures used by the API.

pub mod account;
pub mod attendance;
pub mod department;
pub mod leave;
pub mod payslip;

// Re-export commonly used types
pub use account::*;
pub use attendance::*;
pub use department::*;
pub use leave::*;
pub use payslip::*;

use serde::Serialize;

/// Message-only response (no data)
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
