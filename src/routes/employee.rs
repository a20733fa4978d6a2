//! Employee handlers: profile, attendance, and admin placement

use super::{parse_id, ApiJson};
use crate::auth::{require_role, RequestIdentity, Role};
use crate::error::{not_found_error, ApiResult, AppError};
use crate::models::{
    Account, AccountEnvelope, AccountListResponse, AccountResponse, AssignmentUpdate,
    AttendanceHistoryResponse, AttendanceRecord, ProfileUpdate, TodayStatusResponse,
    ATTENDANCE_HISTORY_LIMIT,
};
use crate::state::{AppState, SharedState};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct MarkAttendanceResponse {
    pub success: bool,
    pub message: String,
    pub attendance: AttendanceRecord,
}

/// GET /api/employee (admin)
pub async fn list_employees(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<AccountListResponse>, AppError> {
    require_role(&identity, &[Role::Admin])?;

    let accounts = state
        .bounded("account list", state.accounts.list_accounts())
        .await?;
    let names: HashMap<_, _> = state
        .bounded("department list", state.departments.list_departments())
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();

    let employees = accounts
        .iter()
        .map(|account| {
            let name = account.department_id.and_then(|id| names.get(&id).cloned());
            AccountResponse::from(account).with_department_name(name)
        })
        .collect();

    Ok(Json(AccountListResponse {
        success: true,
        employees,
    }))
}

/// PUT /api/employee/{id} (admin)
///
/// Place an employee in a department and/or set their position.
pub async fn assign(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<AssignmentUpdate>,
) -> Result<Json<AccountEnvelope>, AppError> {
    require_role(&identity, &[Role::Admin])?;
    let id = parse_id(&id, "employee")?;
    update.validate()?;

    let account = state
        .bounded("account assignment", state.accounts.assign_account(id, update))
        .await?
        .ok_or_else(|| not_found_error("Employee not found"))?;
    info!(
        "Account {} assigned to department {:?} by {}",
        account.id, account.department_id, identity.account_id
    );

    Ok(Json(AccountEnvelope {
        success: true,
        account: describe(&state, &account).await?,
    }))
}

/// Client view of an account with its department name resolved
pub(super) async fn describe(state: &AppState, account: &Account) -> ApiResult<AccountResponse> {
    let name = match account.department_id {
        Some(id) => state
            .bounded("department lookup", state.departments.find_department(id))
            .await?
            .map(|d| d.name),
        None => None,
    };
    Ok(AccountResponse::from(account).with_department_name(name))
}

/// GET /api/employee/profile
pub async fn get_profile(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<AccountEnvelope>, AppError> {
    let account = state
        .bounded("account lookup", state.accounts.find_by_id(identity.account_id))
        .await?
        .ok_or_else(|| not_found_error("Employee not found"))?;

    Ok(Json(AccountEnvelope {
        success: true,
        account: describe(&state, &account).await?,
    }))
}

/// PUT /api/employee/profile
pub async fn update_profile(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<AccountEnvelope>, AppError> {
    update.validate()?;

    let account = state
        .bounded(
            "profile update",
            state.accounts.update_profile(identity.account_id, update),
        )
        .await?
        .ok_or_else(|| not_found_error("Employee not found"))?;

    Ok(Json(AccountEnvelope {
        success: true,
        account: describe(&state, &account).await?,
    }))
}

/// GET /api/employee/attendance
pub async fn attendance_history(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<AttendanceHistoryResponse>, AppError> {
    let attendance = state
        .bounded(
            "attendance history",
            state
                .attendance
                .recent_attendance(identity.account_id, ATTENDANCE_HISTORY_LIMIT),
        )
        .await?;

    Ok(Json(AttendanceHistoryResponse {
        success: true,
        attendance,
    }))
}

/// GET /api/employee/attendance/today
pub async fn attendance_today(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<TodayStatusResponse>, AppError> {
    let today = Utc::now().date_naive();
    let record = state
        .bounded(
            "attendance lookup",
            state.attendance.attendance_on(identity.account_id, today),
        )
        .await?;

    Ok(Json(TodayStatusResponse {
        success: true,
        status: record.map(|r| r.status),
    }))
}

/// POST /api/employee/attendance/mark
///
/// Marks the caller present for today (UTC). A second mark on the same day
/// is rejected by the store.
pub async fn mark_attendance(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<MarkAttendanceResponse>, AppError> {
    let record = AttendanceRecord::present(identity.account_id, Utc::now());
    let attendance = state
        .bounded("attendance mark", state.attendance.mark_attendance(record))
        .await?;

    info!("Attendance marked for {} on {}", identity.account_id, attendance.date);

    Ok(Json(MarkAttendanceResponse {
        success: true,
        message: "Attendance marked successfully".to_string(),
        attendance,
    }))
}
