//! Leave request handlers

use super::{parse_id, ApiJson};
use crate::auth::{require_role, RequestIdentity, Role};
use crate::error::{not_found_error, validation_error, AppError};
use crate::models::{
    validate_leave_window, ApplyLeaveRequest, LeaveEnvelope, LeaveListResponse, LeaveStatus,
    ReviewLeaveRequest,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use validator::Validate;

/// GET /api/employee/leaves
pub async fn list_own(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<LeaveListResponse>, AppError> {
    let leaves = state
        .bounded("leave list", state.leaves.leaves_for(identity.account_id))
        .await?;

    Ok(Json(LeaveListResponse {
        success: true,
        leaves,
    }))
}

/// POST /api/employee/leaves
pub async fn apply(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    ApiJson(req): ApiJson<ApplyLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveEnvelope>), AppError> {
    req.validate()?;

    let now = Utc::now();
    validate_leave_window(req.start_date, req.end_date, now.date_naive())?;

    let leave = state
        .bounded(
            "leave insert",
            state.leaves.create_leave(req.into_leave(identity.account_id, now)),
        )
        .await?;
    info!(
        "Leave {} requested by {} ({} to {})",
        leave.id, identity.account_id, leave.start_date, leave.end_date
    );

    Ok((
        StatusCode::CREATED,
        Json(LeaveEnvelope {
            success: true,
            leave,
        }),
    ))
}

/// PUT /api/leaves/{id}/status (admin)
pub async fn review(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ReviewLeaveRequest>,
) -> Result<Json<LeaveEnvelope>, AppError> {
    require_role(&identity, &[Role::Admin])?;
    let id = parse_id(&id, "leave")?;

    if req.status == LeaveStatus::Pending {
        return Err(validation_error("Status must be approved or rejected"));
    }

    let leave = state
        .bounded("leave review", state.leaves.review_leave(id, req.status))
        .await?
        .ok_or_else(|| not_found_error("Leave request not found"))?;
    info!("Leave {} {} by {}", leave.id, leave.status.as_str(), identity.account_id);

    Ok(Json(LeaveEnvelope {
        success: true,
        leave,
    }))
}
