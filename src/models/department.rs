//! Department model and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or replace a department's fields
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Department name is required"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,
}

impl DepartmentRequest {
    /// Trimmed name; blank names fail validation after trimming
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

#[derive(Debug, Serialize)]
pub struct DepartmentEnvelope {
    pub success: bool,
    pub department: Department,
}

#[derive(Debug, Serialize)]
pub struct DepartmentListResponse {
    pub success: bool,
    pub departments: Vec<Department>,
}
