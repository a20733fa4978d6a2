//! Payslip handlers

use super::{parse_id, ApiJson};
use crate::auth::{require_role, RequestIdentity, Role};
use crate::error::{not_found_error, AppError};
use crate::models::{CreatePayslipRequest, PayslipEnvelope, PayslipListResponse};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use validator::Validate;

/// GET /api/employee/payslips
pub async fn list_own(
    State(state): State<SharedState>,
    identity: RequestIdentity,
) -> Result<Json<PayslipListResponse>, AppError> {
    let payslips = state
        .bounded("payslip list", state.payslips.payslips_for(identity.account_id))
        .await?;

    Ok(Json(PayslipListResponse {
        success: true,
        payslips,
    }))
}

/// POST /api/payslips (admin)
pub async fn create(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    ApiJson(req): ApiJson<CreatePayslipRequest>,
) -> Result<(StatusCode, Json<PayslipEnvelope>), AppError> {
    require_role(&identity, &[Role::Admin])?;
    req.validate()?;

    state
        .bounded("account lookup", state.accounts.find_by_id(req.employee_id))
        .await?
        .ok_or_else(|| not_found_error("Employee not found"))?;

    let payslip = req.into_payslip(Utc::now())?;
    let payslip = state
        .bounded("payslip insert", state.payslips.create_payslip(payslip))
        .await?;
    info!(
        "Generated payslip {} for {} ({})",
        payslip.id, payslip.employee_id, payslip.date
    );

    Ok((
        StatusCode::CREATED,
        Json(PayslipEnvelope {
            success: true,
            payslip,
        }),
    ))
}

/// PUT /api/payslips/{id}/paid (admin)
pub async fn mark_paid(
    State(state): State<SharedState>,
    identity: RequestIdentity,
    Path(id): Path<String>,
) -> Result<Json<PayslipEnvelope>, AppError> {
    require_role(&identity, &[Role::Admin])?;
    let id = parse_id(&id, "payslip")?;

    let payslip = state
        .bounded("payslip update", state.payslips.mark_payslip_paid(id))
        .await?
        .ok_or_else(|| not_found_error("Payslip not found"))?;

    Ok(Json(PayslipEnvelope {
        success: true,
        payslip,
    }))
}
