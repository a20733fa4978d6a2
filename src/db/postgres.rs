//! PostgreSQL store
//!
//! Connection pooling via deadpool-postgres, with TLS when the connection
//! string asks for it.

use super::{
    AccountStore, AttendanceStore, DepartmentStore, LeaveStore, PayslipStore, ALREADY_REVIEWED,
    DUPLICATE_ATTENDANCE, DUPLICATE_DEPARTMENT, DUPLICATE_EMAIL, DUPLICATE_PAYSLIP,
    OVERLAPPING_LEAVE, UNKNOWN_DEPARTMENT,
};
use crate::config::DatabaseConfig;
use crate::error::{ApiResult, AppError};
use crate::models::{
    Account, AssignmentUpdate, AttendanceRecord, Deductions, Department, DepartmentRequest,
    LeaveRequest, LeaveStatus, Payslip, PayslipStatus, ProfileUpdate,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::{error::SqlState, NoTls, Row};
use tracing::{debug, info};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, phone, \
     address, department_id, position, joining_date, created_at, updated_at";
const DEPARTMENT_COLUMNS: &str = "id, name, description, created_at, updated_at";
const ATTENDANCE_COLUMNS: &str = "id, employee_id, date, status, time";
const LEAVE_COLUMNS: &str =
    "id, employee_id, start_date, end_date, kind, reason, status, created_at";
const PAYSLIP_COLUMNS: &str = "id, employee_id, date, basic_salary, allowances, overtime, tax, \
     insurance, other_deductions, net_salary, status, generated_at";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS departments (
        id UUID PRIMARY KEY,
        name VARCHAR(100) UNIQUE NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        email VARCHAR(255) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        role VARCHAR(20) NOT NULL CHECK (role IN ('admin', 'employee')),
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        phone VARCHAR(32),
        address TEXT,
        department_id UUID REFERENCES departments(id) ON DELETE SET NULL,
        position VARCHAR(100),
        joining_date DATE NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    );

    CREATE TABLE IF NOT EXISTS attendance (
        id UUID PRIMARY KEY,
        employee_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        date DATE NOT NULL,
        status VARCHAR(20) NOT NULL CHECK (status IN ('present', 'absent', 'late')),
        time TIMESTAMPTZ NOT NULL,
        UNIQUE (employee_id, date)
    );

    CREATE TABLE IF NOT EXISTS leaves (
        id UUID PRIMARY KEY,
        employee_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        kind VARCHAR(20) NOT NULL,
        reason TEXT,
        status VARCHAR(20) NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
        created_at TIMESTAMPTZ NOT NULL,
        CHECK (end_date >= start_date)
    );

    CREATE TABLE IF NOT EXISTS payslips (
        id UUID PRIMARY KEY,
        employee_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        date DATE NOT NULL,
        basic_salary DOUBLE PRECISION NOT NULL,
        allowances DOUBLE PRECISION NOT NULL DEFAULT 0,
        overtime DOUBLE PRECISION NOT NULL DEFAULT 0,
        tax DOUBLE PRECISION NOT NULL DEFAULT 0,
        insurance DOUBLE PRECISION NOT NULL DEFAULT 0,
        other_deductions DOUBLE PRECISION NOT NULL DEFAULT 0,
        net_salary DOUBLE PRECISION NOT NULL,
        status VARCHAR(20) NOT NULL CHECK (status IN ('pending', 'paid')),
        generated_at TIMESTAMPTZ NOT NULL,
        UNIQUE (employee_id, date)
    );

    CREATE INDEX IF NOT EXISTS idx_leaves_employee_id ON leaves(employee_id);
    CREATE INDEX IF NOT EXISTS idx_accounts_department_id ON accounts(department_id);
";

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Build the pool and check that the database answers
    pub async fn connect(config: &DatabaseConfig) -> ApiResult<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.dbname = Some(config.database.clone());
        cfg.pool = Some(PoolConfig::new(config.max_pool_size));
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let created = if config.require_tls {
            let certs = rustls_native_certs::load_native_certs();
            let mut root_store = rustls::RootCertStore::empty();
            for cert in certs.certs {
                root_store.add(cert).ok();
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
            cfg.create_pool(Some(Runtime::Tokio1), tls)
        } else {
            cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        };
        let pool =
            created.map_err(|e| AppError::Internal(format!("Failed to create pool: {}", e)))?;

        let client = pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        drop(client);

        info!(
            "Database pool established ({}:{}/{}, TLS: {})",
            config.host, config.port, config.database, config.require_tls
        );

        Ok(Self { pool })
    }

    /// Create tables if they don't exist
    pub async fn init_schema(&self) -> ApiResult<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        info!("Database tables initialized");
        Ok(())
    }
}

/// Translate constraint violations into the domain taxonomy
fn constraint_error(e: tokio_postgres::Error, duplicate: &str) -> AppError {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            AppError::Duplicate(duplicate.to_string())
        }
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            AppError::NotFound("Referenced record not found".to_string())
        }
        Some(code) if *code == SqlState::STRING_DATA_RIGHT_TRUNCATION => {
            AppError::Validation("Value is too long".to_string())
        }
        _ => AppError::Database(e),
    }
}

fn parse_column<T: std::str::FromStr<Err = String>>(row: &Row, column: &str) -> ApiResult<T> {
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e| AppError::Internal(format!("Corrupt '{}' column: {}", column, e)))
}

fn account_from_row(row: &Row) -> ApiResult<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(row, "role")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        department_id: row.try_get("department_id")?,
        position: row.try_get("position")?,
        joining_date: row.try_get("joining_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn department_from_row(row: &Row) -> ApiResult<Department> {
    Ok(Department {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn attendance_from_row(row: &Row) -> ApiResult<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        date: row.try_get("date")?,
        status: parse_column(row, "status")?,
        time: row.try_get("time")?,
    })
}

fn leave_from_row(row: &Row) -> ApiResult<LeaveRequest> {
    Ok(LeaveRequest {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        kind: parse_column(row, "kind")?,
        reason: row.try_get("reason")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn payslip_from_row(row: &Row) -> ApiResult<Payslip> {
    Ok(Payslip {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        date: row.try_get("date")?,
        basic_salary: row.try_get("basic_salary")?,
        allowances: row.try_get("allowances")?,
        overtime: row.try_get("overtime")?,
        deductions: Deductions {
            tax: row.try_get("tax")?,
            insurance: row.try_get("insurance")?,
            other: row.try_get("other_deductions")?,
        },
        net_salary: row.try_get("net_salary")?,
        status: parse_column(row, "status")?,
        generated_at: row.try_get("generated_at")?,
    })
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: Account) -> ApiResult<Account> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &account.id,
                    &account.email,
                    &account.password_hash,
                    &account.role.as_str(),
                    &account.first_name,
                    &account.last_name,
                    &account.phone,
                    &account.address,
                    &account.department_id,
                    &account.position,
                    &account.joining_date,
                    &account.created_at,
                    &account.updated_at,
                ],
            )
            .await
            .map_err(|e| constraint_error(e, DUPLICATE_EMAIL))?;

        debug!("Inserted account {}", account.id);
        account_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<Account>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        client
            .query_opt(&sql, &[&email])
            .await?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Account>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        client
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }

    async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC");
        client
            .query(&sql, &[])
            .await?
            .iter()
            .map(account_from_row)
            .collect()
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> ApiResult<Option<Account>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE accounts SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                updated_at = $6
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        client
            .query_opt(
                &sql,
                &[
                    &id,
                    &update.first_name,
                    &update.last_name,
                    &update.phone,
                    &update.address,
                    &Utc::now(),
                ],
            )
            .await?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }

    async fn assign_account(
        &self,
        id: Uuid,
        update: AssignmentUpdate,
    ) -> ApiResult<Option<Account>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE accounts SET
                department_id = COALESCE($2, department_id),
                position = COALESCE($3, position),
                updated_at = $4
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        client
            .query_opt(
                &sql,
                &[&id, &update.department_id, &update.position, &Utc::now()],
            )
            .await
            .map_err(|e| match constraint_error(e, UNKNOWN_DEPARTMENT) {
                AppError::NotFound(_) => AppError::NotFound(UNKNOWN_DEPARTMENT.to_string()),
                other => other,
            })?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }
}

#[async_trait]
impl DepartmentStore for PgStore {
    async fn create_department(&self, department: Department) -> ApiResult<Department> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO departments ({DEPARTMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5)
             RETURNING {DEPARTMENT_COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &department.id,
                    &department.name,
                    &department.description,
                    &department.created_at,
                    &department.updated_at,
                ],
            )
            .await
            .map_err(|e| constraint_error(e, DUPLICATE_DEPARTMENT))?;
        department_from_row(&row)
    }

    async fn list_departments(&self) -> ApiResult<Vec<Department>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY name");
        client
            .query(&sql, &[])
            .await?
            .iter()
            .map(department_from_row)
            .collect()
    }

    async fn find_department(&self, id: Uuid) -> ApiResult<Option<Department>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1");
        client
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(department_from_row)
            .transpose()
    }

    async fn update_department(
        &self,
        id: Uuid,
        update: DepartmentRequest,
    ) -> ApiResult<Option<Department>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE departments SET name = $2, description = $3, updated_at = $4
             WHERE id = $1
             RETURNING {DEPARTMENT_COLUMNS}"
        );
        client
            .query_opt(&sql, &[&id, &update.name, &update.description, &Utc::now()])
            .await
            .map_err(|e| constraint_error(e, DUPLICATE_DEPARTMENT))?
            .as_ref()
            .map(department_from_row)
            .transpose()
    }

    async fn delete_department(&self, id: Uuid) -> ApiResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM departments WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn mark_attendance(&self, record: AttendanceRecord) -> ApiResult<AttendanceRecord> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO attendance ({ATTENDANCE_COLUMNS}) VALUES ($1, $2, $3, $4, $5)
             RETURNING {ATTENDANCE_COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &record.id,
                    &record.employee_id,
                    &record.date,
                    &record.status.as_str(),
                    &record.time,
                ],
            )
            .await
            .map_err(|e| constraint_error(e, DUPLICATE_ATTENDANCE))?;
        attendance_from_row(&row)
    }

    async fn attendance_on(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> ApiResult<Option<AttendanceRecord>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = $1 AND date = $2"
        );
        client
            .query_opt(&sql, &[&employee_id, &date])
            .await?
            .as_ref()
            .map(attendance_from_row)
            .transpose()
    }

    async fn recent_attendance(
        &self,
        employee_id: Uuid,
        limit: usize,
    ) -> ApiResult<Vec<AttendanceRecord>> {
        let client = self.pool.get().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance
             WHERE employee_id = $1
             ORDER BY date DESC
             LIMIT $2"
        );
        client
            .query(&sql, &[&employee_id, &limit])
            .await?
            .iter()
            .map(attendance_from_row)
            .collect()
    }
}

#[async_trait]
impl LeaveStore for PgStore {
    async fn create_leave(&self, leave: LeaveRequest) -> ApiResult<LeaveRequest> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        // Serializes concurrent requests for the same employee
        let owner = tx
            .query_opt(
                "SELECT id FROM accounts WHERE id = $1 FOR UPDATE",
                &[&leave.employee_id],
            )
            .await?;
        if owner.is_none() {
            return Err(AppError::NotFound("Employee not found".to_string()));
        }

        let clash = tx
            .query_opt(
                "SELECT id FROM leaves
                 WHERE employee_id = $1 AND status <> 'rejected'
                   AND start_date <= $3 AND end_date >= $2
                 LIMIT 1",
                &[&leave.employee_id, &leave.start_date, &leave.end_date],
            )
            .await?;
        if clash.is_some() {
            return Err(AppError::Duplicate(OVERLAPPING_LEAVE.to_string()));
        }

        let sql = format!(
            "INSERT INTO leaves ({LEAVE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {LEAVE_COLUMNS}"
        );
        let row = tx
            .query_one(
                &sql,
                &[
                    &leave.id,
                    &leave.employee_id,
                    &leave.start_date,
                    &leave.end_date,
                    &leave.kind.as_str(),
                    &leave.reason,
                    &leave.status.as_str(),
                    &leave.created_at,
                ],
            )
            .await?;
        let created = leave_from_row(&row)?;

        tx.commit().await?;
        Ok(created)
    }

    async fn leaves_for(&self, employee_id: Uuid) -> ApiResult<Vec<LeaveRequest>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leaves WHERE employee_id = $1 ORDER BY start_date DESC"
        );
        client
            .query(&sql, &[&employee_id])
            .await?
            .iter()
            .map(leave_from_row)
            .collect()
    }

    async fn review_leave(
        &self,
        id: Uuid,
        status: LeaveStatus,
    ) -> ApiResult<Option<LeaveRequest>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE leaves SET status = $2 WHERE id = $1 AND status = 'pending'
             RETURNING {LEAVE_COLUMNS}"
        );
        if let Some(row) = client.query_opt(&sql, &[&id, &status.as_str()]).await? {
            return leave_from_row(&row).map(Some);
        }

        let exists = client
            .query_opt("SELECT 1 FROM leaves WHERE id = $1", &[&id])
            .await?
            .is_some();
        if exists {
            return Err(AppError::Validation(ALREADY_REVIEWED.to_string()));
        }
        Ok(None)
    }
}

#[async_trait]
impl PayslipStore for PgStore {
    async fn create_payslip(&self, payslip: Payslip) -> ApiResult<Payslip> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO payslips ({PAYSLIP_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {PAYSLIP_COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &payslip.id,
                    &payslip.employee_id,
                    &payslip.date,
                    &payslip.basic_salary,
                    &payslip.allowances,
                    &payslip.overtime,
                    &payslip.deductions.tax,
                    &payslip.deductions.insurance,
                    &payslip.deductions.other,
                    &payslip.net_salary,
                    &payslip.status.as_str(),
                    &payslip.generated_at,
                ],
            )
            .await
            .map_err(|e| constraint_error(e, DUPLICATE_PAYSLIP))?;
        payslip_from_row(&row)
    }

    async fn payslips_for(&self, employee_id: Uuid) -> ApiResult<Vec<Payslip>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {PAYSLIP_COLUMNS} FROM payslips WHERE employee_id = $1 ORDER BY date DESC"
        );
        client
            .query(&sql, &[&employee_id])
            .await?
            .iter()
            .map(payslip_from_row)
            .collect()
    }

    async fn mark_payslip_paid(&self, id: Uuid) -> ApiResult<Option<Payslip>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE payslips SET status = $2 WHERE id = $1 RETURNING {PAYSLIP_COLUMNS}"
        );
        client
            .query_opt(&sql, &[&id, &PayslipStatus::Paid.as_str()])
            .await?
            .as_ref()
            .map(payslip_from_row)
            .transpose()
    }
}
