//! Payslip records

use crate::error::{validation_error, ApiResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayslipStatus {
    Pending,
    Paid,
}

impl PayslipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayslipStatus::Pending => "pending",
            PayslipStatus::Paid => "paid",
        }
    }
}

impl FromStr for PayslipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayslipStatus::Pending),
            "paid" => Ok(PayslipStatus::Paid),
            other => Err(format!("unknown payslip status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Deductions {
    #[validate(range(min = 0.0, max = 1.0e12, message = "Tax must be between 0 and 1e12"))]
    pub tax: f64,
    #[validate(range(min = 0.0, max = 1.0e12, message = "Insurance must be between 0 and 1e12"))]
    pub insurance: f64,
    #[validate(range(min = 0.0, max = 1.0e12, message = "Other deductions must be between 0 and 1e12"))]
    pub other: f64,
}

impl Deductions {
    pub fn total(&self) -> f64 {
        self.tax + self.insurance + self.other
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub basic_salary: f64,
    pub allowances: f64,
    pub overtime: f64,
    pub deductions: Deductions,
    pub net_salary: f64,
    pub status: PayslipStatus,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayslipRequest {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    #[validate(range(min = 0.0, max = 1.0e12, message = "Basic salary must be between 0 and 1e12"))]
    pub basic_salary: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0e12, message = "Allowances must be between 0 and 1e12"))]
    pub allowances: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0e12, message = "Overtime must be between 0 and 1e12"))]
    pub overtime: f64,
    #[serde(default)]
    #[validate(nested)]
    pub deductions: Deductions,
}

impl CreatePayslipRequest {
    /// Compute net pay and build the payslip; deductions may not exceed gross pay
    pub fn into_payslip(self, now: DateTime<Utc>) -> ApiResult<Payslip> {
        let gross = self.basic_salary + self.allowances + self.overtime;
        let net_salary = gross - self.deductions.total();
        if !net_salary.is_finite() {
            return Err(validation_error("Payslip amounts are out of range"));
        }
        if net_salary < 0.0 {
            return Err(validation_error("Deductions exceed gross pay"));
        }

        Ok(Payslip {
            id: Uuid::new_v4(),
            employee_id: self.employee_id,
            date: self.date,
            basic_salary: self.basic_salary,
            allowances: self.allowances,
            overtime: self.overtime,
            deductions: self.deductions,
            net_salary,
            status: PayslipStatus::Pending,
            generated_at: now,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PayslipEnvelope {
    pub success: bool,
    pub payslip: Payslip,
}

#[derive(Debug, Serialize)]
pub struct PayslipListResponse {
    pub success: bool,
    pub payslips: Vec<Payslip>,
}
