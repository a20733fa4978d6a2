//! Leave requests

use crate::error::{validation_error, ApiResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Casual,
    Annual,
    Unpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Sick => "sick",
            LeaveType::Casual => "casual",
            LeaveType::Annual => "annual",
            LeaveType::Unpaid => "unpaid",
        }
    }
}

impl FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sick" => Ok(LeaveType::Sick),
            "casual" => Ok(LeaveType::Casual),
            "annual" => Ok(LeaveType::Annual),
            "unpaid" => Ok(LeaveType::Unpaid),
            other => Err(format!("unknown leave type '{}'", other)),
        }
    }
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            other => Err(format!("unknown leave status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: LeaveType,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Inclusive date ranges that share at least one day
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// Rejected requests no longer block the calendar
    pub fn blocks_calendar(&self) -> bool {
        self.status != LeaveStatus::Rejected
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: LeaveType,
    #[validate(length(max = 1000, message = "Reason is too long"))]
    pub reason: Option<String>,
}

impl ApplyLeaveRequest {
    pub fn into_leave(self, employee_id: Uuid, now: DateTime<Utc>) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
            kind: self.kind,
            reason: self.reason,
            status: LeaveStatus::Pending,
            created_at: now,
        }
    }
}

/// Reject windows that start in the past or end before they start
pub fn validate_leave_window(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> ApiResult<()> {
    if start < today {
        return Err(validation_error("Start date cannot be in the past"));
    }
    if end < start {
        return Err(validation_error("End date cannot be before start date"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ReviewLeaveRequest {
    pub status: LeaveStatus,
}

#[derive(Debug, Serialize)]
pub struct LeaveEnvelope {
    pub success: bool,
    pub leave: LeaveRequest,
}

#[derive(Debug, Serialize)]
pub struct LeaveListResponse {
    pub success: bool,
    pub leaves: Vec<LeaveRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn leave(start: &str, end: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            kind: LeaveType::Annual,
            reason: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_window_validation() {
        let today = date("2026-03-10");

        assert!(validate_leave_window(date("2026-03-10"), date("2026-03-10"), today).is_ok());
        assert!(validate_leave_window(date("2026-03-11"), date("2026-03-15"), today).is_ok());
        assert!(validate_leave_window(date("2026-03-09"), date("2026-03-15"), today).is_err());
        assert!(validate_leave_window(date("2026-03-15"), date("2026-03-12"), today).is_err());
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let existing = leave("2026-03-10", "2026-03-12", LeaveStatus::Pending);

        assert!(existing.overlaps(date("2026-03-12"), date("2026-03-14")));
        assert!(existing.overlaps(date("2026-03-08"), date("2026-03-10")));
        assert!(existing.overlaps(date("2026-03-11"), date("2026-03-11")));
        assert!(!existing.overlaps(date("2026-03-13"), date("2026-03-20")));
        assert!(!existing.overlaps(date("2026-03-01"), date("2026-03-09")));
    }

    #[test]
    fn test_rejected_leave_does_not_block() {
        assert!(leave("2026-03-10", "2026-03-12", LeaveStatus::Pending).blocks_calendar());
        assert!(leave("2026-03-10", "2026-03-12", LeaveStatus::Approved).blocks_calendar());
        assert!(!leave("2026-03-10", "2026-03-12", LeaveStatus::Rejected).blocks_calendar());
    }

    #[test]
    fn test_apply_request_reads_type_field() {
        let req: ApplyLeaveRequest = serde_json::from_str(
            r#"{"startDate":"2026-03-10","endDate":"2026-03-11","type":"sick"}"#,
        )
        .unwrap();
        assert_eq!(req.kind, LeaveType::Sick);
        assert!(req.reason.is_none());
    }
}
