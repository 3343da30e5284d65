use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::payroll::SalaryConfig;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum EmpStatus {
    Active,
    Deactive,
    #[strum(to_string = "On Leave")]
    #[serde(rename = "On Leave")]
    OnLeave,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "emp_code": "1001",
        "full_name": "Ayesha Rahman",
        "department": "Engineering",
        "job_title": "Developer",
        "emp_status": "Active",
        "start_time": "08:00:00",
        "end_time": "17:00:00",
        "monthly_salary": 45000.0,
        "daily_salary": 0.0,
        "weekly_salary": 0.0,
        "total_salary": 45000.0
    })
)]
pub struct Employee {
    pub id: u64,

    /// Human-readable 4-digit-style code, assigned sequentially at create.
    #[schema(example = "1001")]
    pub emp_code: String,

    pub full_name: String,
    pub department: String,
    pub job_title: String,

    #[schema(example = "Active")]
    pub emp_status: String,

    /// Configured shift window. Overnight windows (end <= start) are
    /// rejected at save time.
    #[schema(value_type = Option<String>, format = "time", nullable = true)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time", nullable = true)]
    pub end_time: Option<NaiveTime>,

    pub monthly_salary: f64,
    pub daily_salary: f64,
    pub weekly_salary: f64,

    /// Derived: monthly*1 + daily*30 + weekly*4, recomputed at every save.
    pub total_salary: f64,
}

impl Employee {
    pub fn salary_config(&self) -> SalaryConfig {
        SalaryConfig {
            monthly: self.monthly_salary,
            daily: self.daily_salary,
            weekly: self.weekly_salary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emp_status_labels_round_trip() {
        assert_eq!(EmpStatus::OnLeave.to_string(), "On Leave");
        assert_eq!("On Leave".parse::<EmpStatus>(), Ok(EmpStatus::OnLeave));
        assert_eq!("Active".parse::<EmpStatus>(), Ok(EmpStatus::Active));
    }
}
