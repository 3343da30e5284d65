//! Payroll aggregation over a date range of attendance rows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::payroll::duration::parse_duration;

/// Day-counting convention for the per-hour denominator: one attendance row
/// stands for 12 hours, independent of actual worked time.
pub const PAYROLL_DAY_HOURS: i64 = 12;

/// Monthly-equivalent multipliers applied to the daily and weekly salary
/// components. Fixed, never prorated to the requested range.
pub const DAILY_MULTIPLIER: f64 = 30.0;
pub const WEEKLY_MULTIPLIER: f64 = 4.0;

/// An employee's salary components. Any subset may be nonzero; they are
/// summed, not selected. Missing fields default to 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct SalaryConfig {
    #[schema(example = 45000.0)]
    pub monthly: f64,
    #[schema(example = 0.0)]
    pub daily: f64,
    #[schema(example = 0.0)]
    pub weekly: f64,
}

impl SalaryConfig {
    pub fn total(&self) -> f64 {
        self.monthly + self.daily * DAILY_MULTIPLIER + self.weekly * WEEKLY_MULTIPLIER
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCounts {
    pub present: usize,
    pub absent: usize,
    pub leave: usize,
    pub holiday: usize,
    pub friday: usize,
}

/// Per-status row lists, kept alongside the counts so callers can render
/// drill-down detail without refetching.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CategoryDetails {
    pub present: Vec<Attendance>,
    pub absent: Vec<Attendance>,
    pub leave: Vec<Attendance>,
    pub holiday: Vec<Attendance>,
    pub friday: Vec<Attendance>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayrollSummary {
    #[schema(example = 45000.0)]
    pub total_salary: f64,
    #[schema(example = 187.5)]
    pub per_hour: f64,
    /// Record count times the fixed 12 h/day convention.
    #[schema(example = 240)]
    pub total_hours: i64,
    /// Sum of the stored working-hours strings, in fractional hours.
    #[schema(example = 171.5)]
    pub total_working_hours: f64,
    pub counts: CategoryCounts,
    pub details: CategoryDetails,
}

/// Aggregate a salary configuration and a range's attendance rows.
///
/// Fails soft everywhere: unparseable working-hours strings contribute 0,
/// unknown status labels count toward `total_hours` but land in no bucket,
/// and an empty input yields an all-zero summary.
pub fn aggregate_payroll(salary: &SalaryConfig, records: &[Attendance]) -> PayrollSummary {
    let total_salary = salary.total();
    let total_hours = records.len() as i64 * PAYROLL_DAY_HOURS;
    let per_hour = if total_hours == 0 {
        0.0
    } else {
        total_salary / total_hours as f64
    };

    let mut total_working_minutes: i64 = 0;
    let mut details = CategoryDetails::default();

    for record in records {
        if let Some(text) = &record.working_hours {
            total_working_minutes += parse_duration(text).unwrap_or(0);
        }

        match record.status() {
            Some(AttendanceStatus::Present) => details.present.push(record.clone()),
            Some(AttendanceStatus::Absent) => details.absent.push(record.clone()),
            Some(AttendanceStatus::Leave) => details.leave.push(record.clone()),
            Some(AttendanceStatus::Holiday) => details.holiday.push(record.clone()),
            Some(AttendanceStatus::Friday) => details.friday.push(record.clone()),
            None => {}
        }
    }

    let counts = CategoryCounts {
        present: details.present.len(),
        absent: details.absent.len(),
        leave: details.leave.len(),
        holiday: details.holiday.len(),
        friday: details.friday.len(),
    };

    PayrollSummary {
        total_salary,
        per_hour,
        total_hours,
        total_working_hours: total_working_minutes as f64 / 60.0,
        counts,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(status: &str, working_hours: Option<&str>) -> Attendance {
        Attendance {
            id: 0,
            emp_code: "1001".to_string(),
            emp_name: "Ayesha Rahman".to_string(),
            department: "Engineering".to_string(),
            job_title: "Developer".to_string(),
            daily_bonus: 0.0,
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            attendance_status: status.to_string(),
            check_in_time: None,
            check_out_time: None,
            working_hours: working_hours.map(str::to_string),
        }
    }

    #[test]
    fn empty_range_is_all_zero() {
        let summary = aggregate_payroll(&SalaryConfig::default(), &[]);
        assert_eq!(summary.total_salary, 0.0);
        assert_eq!(summary.per_hour, 0.0);
        assert_eq!(summary.total_hours, 0);
        assert_eq!(summary.total_working_hours, 0.0);
        assert_eq!(summary.counts, CategoryCounts::default());
    }

    #[test]
    fn monthly_only_twenty_records() {
        let salary = SalaryConfig {
            monthly: 45000.0,
            daily: 0.0,
            weekly: 0.0,
        };
        let records: Vec<_> = (0..20).map(|_| record("Present", Some("8h 0m"))).collect();

        let summary = aggregate_payroll(&salary, &records);
        assert_eq!(summary.total_salary, 45000.0);
        assert_eq!(summary.total_hours, 240);
        assert_eq!(summary.per_hour, 187.5);
        assert_eq!(summary.total_working_hours, 160.0);
        assert_eq!(summary.counts.present, 20);
    }

    #[test]
    fn salary_components_are_summed_with_fixed_multipliers() {
        let salary = SalaryConfig {
            monthly: 10000.0,
            daily: 500.0,
            weekly: 2000.0,
        };
        // 10000 + 500*30 + 2000*4
        assert_eq!(salary.total(), 33000.0);
    }

    #[test]
    fn partitions_by_status_with_drilldown_lists() {
        let records = vec![
            record("Present", Some("8h 0m")),
            record("Absent", None),
            record("Holiday", None),
            record("Leave", None),
            record("Friday", None),
            record("Present", Some("9h 30m")),
        ];

        let summary = aggregate_payroll(&SalaryConfig::default(), &records);
        assert_eq!(summary.counts.present, 2);
        assert_eq!(summary.counts.absent, 1);
        assert_eq!(summary.counts.holiday, 1);
        assert_eq!(summary.counts.leave, 1);
        assert_eq!(summary.counts.friday, 1);
        assert_eq!(summary.details.present.len(), 2);
        assert_eq!(summary.details.absent[0].attendance_status, "Absent");
        assert_eq!(summary.total_hours, 6 * PAYROLL_DAY_HOURS);
    }

    #[test]
    fn legacy_in_out_labels_count_as_present() {
        let records = vec![record("In", Some("8h 0m")), record("Out", Some("08:30"))];
        let summary = aggregate_payroll(&SalaryConfig::default(), &records);
        assert_eq!(summary.counts.present, 2);
        assert_eq!(summary.total_working_hours, 16.5);
    }

    #[test]
    fn bad_working_hours_strings_contribute_zero() {
        let records = vec![
            record("Present", Some("10h 40m")),
            record("Present", Some("-")),
            record("Present", None),
        ];
        let summary = aggregate_payroll(&SalaryConfig::default(), &records);
        // only the first row parses: 640 minutes
        assert!((summary.total_working_hours - 640.0 / 60.0).abs() < 1e-9);
        // all three still count toward the denominator convention
        assert_eq!(summary.total_hours, 36);
    }

    #[test]
    fn unknown_status_counts_toward_hours_but_no_bucket() {
        let records = vec![record("Vacation?", None), record("Present", None)];
        let summary = aggregate_payroll(&SalaryConfig::default(), &records);
        assert_eq!(summary.total_hours, 24);
        assert_eq!(summary.counts.present, 1);
        assert_eq!(summary.counts.absent, 0);
    }
}
