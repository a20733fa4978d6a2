//! Storage layer
//!
//! Async store traits consumed by the handlers, with a PostgreSQL backend for
//! deployments and an in-process backend for development and tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::{ApiResult, AppError};
use crate::models::{
    Account, AssignmentUpdate, AttendanceRecord, Department, DepartmentRequest, LeaveRequest,
    LeaveStatus, Payslip, ProfileUpdate,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// Credential store. At most one account exists per (normalized) email.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; `Duplicate` if the email is taken
    async fn create_account(&self, account: Account) -> ApiResult<Account>;
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<Account>>;
    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Account>>;
    async fn list_accounts(&self) -> ApiResult<Vec<Account>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ApiResult<Option<Account>>;
    /// Set department and position. `None` when the account is unknown,
    /// `NotFound` when the department is.
    async fn assign_account(&self, id: Uuid, update: AssignmentUpdate)
        -> ApiResult<Option<Account>>;
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    /// Insert a department; `Duplicate` if the name is taken
    async fn create_department(&self, department: Department) -> ApiResult<Department>;
    async fn list_departments(&self) -> ApiResult<Vec<Department>>;
    async fn find_department(&self, id: Uuid) -> ApiResult<Option<Department>>;
    async fn update_department(
        &self,
        id: Uuid,
        update: DepartmentRequest,
    ) -> ApiResult<Option<Department>>;
    /// Returns whether a department was removed
    async fn delete_department(&self, id: Uuid) -> ApiResult<bool>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Record attendance; `Duplicate` if the employee already has a record for that day
    async fn mark_attendance(&self, record: AttendanceRecord) -> ApiResult<AttendanceRecord>;
    async fn attendance_on(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> ApiResult<Option<AttendanceRecord>>;
    /// Most recent records first
    async fn recent_attendance(
        &self,
        employee_id: Uuid,
        limit: usize,
    ) -> ApiResult<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Insert a leave request; `Duplicate` if it overlaps a non-rejected request
    async fn create_leave(&self, leave: LeaveRequest) -> ApiResult<LeaveRequest>;
    /// Newest start date first
    async fn leaves_for(&self, employee_id: Uuid) -> ApiResult<Vec<LeaveRequest>>;
    /// Move a pending request to `status`. `None` when the id is unknown,
    /// `Validation` when the request was already reviewed.
    async fn review_leave(&self, id: Uuid, status: LeaveStatus)
        -> ApiResult<Option<LeaveRequest>>;
}

#[async_trait]
pub trait PayslipStore: Send + Sync {
    /// Insert a payslip; `Duplicate` if one exists for that employee and date
    async fn create_payslip(&self, payslip: Payslip) -> ApiResult<Payslip>;
    /// Newest first
    async fn payslips_for(&self, employee_id: Uuid) -> ApiResult<Vec<Payslip>>;
    async fn mark_payslip_paid(&self, id: Uuid) -> ApiResult<Option<Payslip>>;
}

/// Everything the HTTP layer needs from a backend
pub trait Store: AccountStore + DepartmentStore + AttendanceStore + LeaveStore + PayslipStore {}

impl<T> Store for T where T: AccountStore + DepartmentStore + AttendanceStore + LeaveStore + PayslipStore
{}

/// Fail a store call that does not complete within `limit`
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!("{} exceeded {:?}", what, limit))),
    }
}

pub(crate) const DUPLICATE_EMAIL: &str = "An account with this email already exists";
pub(crate) const DUPLICATE_DEPARTMENT: &str = "A department with this name already exists";
pub(crate) const DUPLICATE_ATTENDANCE: &str = "Attendance already marked for today";
pub(crate) const OVERLAPPING_LEAVE: &str = "You have an overlapping leave request";
pub(crate) const DUPLICATE_PAYSLIP: &str = "A payslip already exists for this employee and date";
pub(crate) const ALREADY_REVIEWED: &str = "Leave request has already been reviewed";
pub(crate) const UNKNOWN_DEPARTMENT: &str = "Department not found";
