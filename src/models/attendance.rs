//! Attendance records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Number of records returned by the attendance history endpoint
pub const ATTENDANCE_HISTORY_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            other => Err(format!("unknown attendance status '{}'", other)),
        }
    }
}

/// One employee's attendance for one calendar day (UTC)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Instant the record was marked
    pub time: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn present(employee_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            date: now.date_naive(),
            status: AttendanceStatus::Present,
            time: now,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceHistoryResponse {
    pub success: bool,
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize)]
pub struct TodayStatusResponse {
    pub success: bool,
    pub status: Option<AttendanceStatus>,
}
