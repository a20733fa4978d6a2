//! In-memory store
//!
//! Backs the service when no database is configured, and the test suite.
//! Each collection sits behind its own lock; uniqueness checks and inserts
//! happen under a single write guard.

use super::{
    AccountStore, AttendanceStore, DepartmentStore, LeaveStore, PayslipStore, ALREADY_REVIEWED,
    DUPLICATE_ATTENDANCE, DUPLICATE_DEPARTMENT, DUPLICATE_EMAIL, DUPLICATE_PAYSLIP,
    OVERLAPPING_LEAVE, UNKNOWN_DEPARTMENT,
};
use crate::error::{ApiResult, AppError};
use crate::models::{
    Account, AssignmentUpdate, AttendanceRecord, Department, DepartmentRequest, LeaveRequest,
    LeaveStatus, Payslip, PayslipStatus, ProfileUpdate,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Accounts {
    by_id: HashMap<Uuid, Account>,
    email_index: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<Accounts>,
    departments: RwLock<HashMap<Uuid, Department>>,
    attendance: RwLock<HashMap<(Uuid, NaiveDate), AttendanceRecord>>,
    leaves: RwLock<HashMap<Uuid, LeaveRequest>>,
    payslips: RwLock<HashMap<Uuid, Payslip>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: Account) -> ApiResult<Account> {
        let mut accounts = self.accounts.write().await;

        if accounts.email_index.contains_key(&account.email) {
            return Err(AppError::Duplicate(DUPLICATE_EMAIL.to_string()));
        }

        accounts.email_index.insert(account.email.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .email_index
            .get(email)
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Account>> {
        Ok(self.accounts.read().await.by_id.get(&id).cloned())
    }

    async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<Account> = accounts.by_id.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ApiResult<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.by_id.get_mut(&id).map(|account| {
            update.apply(account, Utc::now());
            account.clone()
        }))
    }

    async fn assign_account(
        &self,
        id: Uuid,
        update: AssignmentUpdate,
    ) -> ApiResult<Option<Account>> {
        // Department guard held so the referenced department cannot vanish mid-update
        let departments = self.departments.read().await;
        let mut accounts = self.accounts.write().await;

        let Some(account) = accounts.by_id.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(department_id) = update.department_id {
            if !departments.contains_key(&department_id) {
                return Err(AppError::NotFound(UNKNOWN_DEPARTMENT.to_string()));
            }
        }

        update.apply(account, Utc::now());
        Ok(Some(account.clone()))
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn create_department(&self, department: Department) -> ApiResult<Department> {
        let mut departments = self.departments.write().await;

        if departments.values().any(|d| d.name == department.name) {
            return Err(AppError::Duplicate(DUPLICATE_DEPARTMENT.to_string()));
        }

        departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn list_departments(&self) -> ApiResult<Vec<Department>> {
        let mut all: Vec<Department> = self.departments.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_department(&self, id: Uuid) -> ApiResult<Option<Department>> {
        Ok(self.departments.read().await.get(&id).cloned())
    }

    async fn update_department(
        &self,
        id: Uuid,
        update: DepartmentRequest,
    ) -> ApiResult<Option<Department>> {
        let mut departments = self.departments.write().await;

        if departments
            .values()
            .any(|d| d.id != id && d.name == update.name)
        {
            return Err(AppError::Duplicate(DUPLICATE_DEPARTMENT.to_string()));
        }

        Ok(departments.get_mut(&id).map(|department| {
            department.name = update.name;
            department.description = update.description;
            department.updated_at = Utc::now();
            department.clone()
        }))
    }

    async fn delete_department(&self, id: Uuid) -> ApiResult<bool> {
        let removed = self.departments.write().await.remove(&id).is_some();
        if removed {
            // Mirror ON DELETE SET NULL
            let mut accounts = self.accounts.write().await;
            for account in accounts.by_id.values_mut() {
                if account.department_id == Some(id) {
                    account.department_id = None;
                }
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn mark_attendance(&self, record: AttendanceRecord) -> ApiResult<AttendanceRecord> {
        let mut attendance = self.attendance.write().await;
        let key = (record.employee_id, record.date);

        if attendance.contains_key(&key) {
            return Err(AppError::Duplicate(DUPLICATE_ATTENDANCE.to_string()));
        }

        attendance.insert(key, record.clone());
        Ok(record)
    }

    async fn attendance_on(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> ApiResult<Option<AttendanceRecord>> {
        Ok(self.attendance.read().await.get(&(employee_id, date)).cloned())
    }

    async fn recent_attendance(
        &self,
        employee_id: Uuid,
        limit: usize,
    ) -> ApiResult<Vec<AttendanceRecord>> {
        let attendance = self.attendance.read().await;
        let mut records: Vec<AttendanceRecord> = attendance
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(limit);
        Ok(records)
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn create_leave(&self, leave: LeaveRequest) -> ApiResult<LeaveRequest> {
        let mut leaves = self.leaves.write().await;

        let overlapping = leaves.values().any(|existing| {
            existing.employee_id == leave.employee_id
                && existing.blocks_calendar()
                && existing.overlaps(leave.start_date, leave.end_date)
        });
        if overlapping {
            return Err(AppError::Duplicate(OVERLAPPING_LEAVE.to_string()));
        }

        leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn leaves_for(&self, employee_id: Uuid) -> ApiResult<Vec<LeaveRequest>> {
        let leaves = self.leaves.read().await;
        let mut own: Vec<LeaveRequest> = leaves
            .values()
            .filter(|l| l.employee_id == employee_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(own)
    }

    async fn review_leave(
        &self,
        id: Uuid,
        status: LeaveStatus,
    ) -> ApiResult<Option<LeaveRequest>> {
        let mut leaves = self.leaves.write().await;
        let Some(leave) = leaves.get_mut(&id) else {
            return Ok(None);
        };

        if leave.status != LeaveStatus::Pending {
            return Err(AppError::Validation(ALREADY_REVIEWED.to_string()));
        }

        leave.status = status;
        Ok(Some(leave.clone()))
    }
}

#[async_trait]
impl PayslipStore for MemoryStore {
    async fn create_payslip(&self, payslip: Payslip) -> ApiResult<Payslip> {
        let mut payslips = self.payslips.write().await;

        if payslips
            .values()
            .any(|p| p.employee_id == payslip.employee_id && p.date == payslip.date)
        {
            return Err(AppError::Duplicate(DUPLICATE_PAYSLIP.to_string()));
        }

        payslips.insert(payslip.id, payslip.clone());
        Ok(payslip)
    }

    async fn payslips_for(&self, employee_id: Uuid) -> ApiResult<Vec<Payslip>> {
        let payslips = self.payslips.read().await;
        let mut own: Vec<Payslip> = payslips
            .values()
            .filter(|p| p.employee_id == employee_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(own)
    }

    async fn mark_payslip_paid(&self, id: Uuid) -> ApiResult<Option<Payslip>> {
        let mut payslips = self.payslips.write().await;
        Ok(payslips.get_mut(&id).map(|payslip| {
            payslip.status = PayslipStatus::Paid;
            payslip.clone()
        }))
    }
}
