use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Status of a single attendance row. Stored as its display label; parsing
/// folds the legacy `In`/`Out` labels found in older rows into `Present`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    #[strum(to_string = "Present", serialize = "In", serialize = "Out")]
    Present,
    Absent,
    Leave,
    Holiday,
    Friday,
}

impl AttendanceStatus {
    /// Absence-like statuses must not carry check-in/check-out times.
    pub fn is_absence_like(self) -> bool {
        !matches!(self, AttendanceStatus::Present)
    }
}

/// One row per employee per date. `emp_name`, `department`, `job_title` and
/// `daily_bonus` are snapshots copied from the employee at write time, so a
/// later department rename never rewrites attendance history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "emp_code": "1001",
        "emp_name": "Ayesha Rahman",
        "department": "Engineering",
        "job_title": "Developer",
        "daily_bonus": 500.0,
        "date": "2025-06-02",
        "attendance_status": "Present",
        "check_in_time": "2025-06-02T08:05:00",
        "check_out_time": "2025-06-02T18:45:00",
        "working_hours": "10h 40m"
    })
)]
pub struct Attendance {
    pub id: u64,
    pub emp_code: String,
    pub emp_name: String,
    pub department: String,
    pub job_title: String,
    pub daily_bonus: f64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub attendance_status: String,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_in_time: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,
    #[schema(example = "10h 40m", nullable = true)]
    pub working_hours: Option<String>,
}

impl Attendance {
    /// Parsed status; `None` for labels this version no longer knows.
    pub fn status(&self) -> Option<AttendanceStatus> {
        self.attendance_status.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_labels_fold_into_present() {
        assert_eq!("In".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert_eq!("Out".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert_eq!("Present".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
    }

    #[test]
    fn display_uses_canonical_labels() {
        assert_eq!(AttendanceStatus::Present.to_string(), "Present");
        assert_eq!(AttendanceStatus::Friday.to_string(), "Friday");
    }

    #[test]
    fn unknown_labels_do_not_parse() {
        assert!("Vacation".parse::<AttendanceStatus>().is_err());
    }
}
