//! Department route handlers
//!
//! Any signed-in account can read departments; writes are admin-only.

use super::{parse_id, ApiJson};
use crate::auth::{require_role, RequestIdentity, Role};
use crate::error::{not_found_error, AppError};
use crate::models::{
    Department, DepartmentEnvelope, DepartmentListResponse, DepartmentRequest, MessageResponse,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// GET /api/department
pub async fn list(
    State(state): State<SharedState>,
    _identity: RequestIdentity,
) -> Result<Json<DepartmentListResponse>, AppError> {
    let departments = state
        .bounded("department list", state.departments.list_departments())
        .await?;

    Ok(Json(DepartmentListResponse {
        success: true,
        departments,
    }))
}

/// GET /api/department/{id}
pub async fn get(
    State(state): State<SharedState>,
    _identity: RequestIdentity,
    Path(id): Path<String>,
) -> Result<Json<DepartmentEnvelope>, AppError> {
    let id = parse_id(&id, "department")?;
    let department = state
        .bounded("department lookup", state.departments.find_department(id))
        .await?
        .ok_or_else(|| not_found_error("Department not found"))?;

    Ok(Json(DepartmentEnvelope {
        success: true,
        department,
    }))
}

/// POST /api/department (admin)
pub async fn create(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    ApiJson(req): ApiJson<DepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentEnvelope>), AppError> {
    require_role(&identity, &[Role::Admin])?;
    let req = req.normalized();
    req.validate()?;

    let now = Utc::now();
    let department = Department {
        id: Uuid::new_v4(),
        name: req.name,
        description: req.description,
        created_at: now,
        updated_at: now,
    };

    let department = state
        .bounded("department insert", state.departments.create_department(department))
        .await?;
    info!("Created department {} ({})", department.name, department.id);

    Ok((
        StatusCode::CREATED,
        Json(DepartmentEnvelope {
            success: true,
            department,
        }),
    ))
}

/// PUT /api/department/{id} (admin)
pub async fn update(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<DepartmentRequest>,
) -> Result<Json<DepartmentEnvelope>, AppError> {
    require_role(&identity, &[Role::Admin])?;
    let id = parse_id(&id, "department")?;
    let req = req.normalized();
    req.validate()?;

    let department = state
        .bounded("department update", state.departments.update_department(id, req))
        .await?
        .ok_or_else(|| not_found_error("Department not found"))?;

    Ok(Json(DepartmentEnvelope {
        success: true,
        department,
    }))
}

/// DELETE /api/department/{id} (admin)
pub async fn delete(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&identity, &[Role::Admin])?;
    let id = parse_id(&id, "department")?;

    let removed = state
        .bounded("department delete", state.departments.delete_department(id))
        .await?;
    if !removed {
        return Err(not_found_error("Department not found"));
    }

    info!("Deleted department {}", id);
    Ok(Json(MessageResponse::new("Department deleted successfully")))
}
