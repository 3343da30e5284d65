use crate::{
    auth::auth::AuthUser,
    config::Config,
    model::{attendance::Attendance, employee::Employee},
    payroll::{
        aggregate_payroll, classify_record,
        duration::{compute_overtime_and_shortfall, overtime_label, parse_duration,
            standard_shift_minutes},
        ClassifyPolicy, PayrollSummary, TimingBucket,
    },
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PayrollQuery {
    #[param(example = "1001")]
    pub emp_code: String,
    #[param(example = "2025-06-01", value_type = String)]
    pub from: NaiveDate,
    #[param(example = "2025-06-30", value_type = String)]
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimingQuery {
    #[param(example = "1001")]
    pub emp_code: String,
    #[param(example = "2025-06-01", value_type = String)]
    pub from: NaiveDate,
    #[param(example = "2025-06-30", value_type = String)]
    pub to: NaiveDate,
    /// `strict30` (default) or `narrow15`
    #[param(example = "strict30")]
    pub policy: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollSummaryResponse {
    pub emp_code: String,
    pub full_name: String,
    #[schema(value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to: NaiveDate,
    pub summary: PayrollSummary,
}

/// One row of the timing report: the bucket plus the day's overtime and
/// shortfall against the employee's standard shift.
#[derive(Serialize, ToSchema)]
pub struct TimingEntry {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub attendance_status: String,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_in_time: Option<chrono::NaiveDateTime>,
    #[schema(example = "Late")]
    pub bucket: String,
    #[schema(example = "1h 10m")]
    pub overtime: String,
    pub shortfall_minutes: i64,
}

#[derive(Serialize, ToSchema, Default)]
pub struct TimingCounts {
    pub early: usize,
    pub on_time: usize,
    pub late: usize,
    pub no_clock_in: usize,
    pub absent: usize,
    pub leave: usize,
    pub holiday: usize,
    pub friday: usize,
    /// Rows whose stored status label is no longer recognized.
    pub unclassified: usize,
}

#[derive(Serialize, ToSchema)]
pub struct TimingReportResponse {
    pub emp_code: String,
    pub policy: ClassifyPolicy,
    pub counts: TimingCounts,
    pub entries: Vec<TimingEntry>,
}

async fn fetch_employee(
    pool: &MySqlPool,
    emp_code: &str,
) -> actix_web::Result<Option<Employee>> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE emp_code = ?")
        .bind(emp_code)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, emp_code = %emp_code, "Failed to fetch employee");
            ErrorInternalServerError("Internal Server Error")
        })
}

async fn fetch_range(
    pool: &MySqlPool,
    emp_code: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> actix_web::Result<Vec<Attendance>> {
    sqlx::query_as::<_, Attendance>(
        r#"
        SELECT * FROM attendance
        WHERE emp_code = ? AND date BETWEEN ? AND ?
        ORDER BY date
        "#,
    )
    .bind(emp_code)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!(error = %e, emp_code = %emp_code, "Failed to fetch attendance range");
        ErrorInternalServerError("Internal Server Error")
    })
}

/// Payroll summary for an employee over a date range
#[utoipa::path(
    get,
    path = "/api/v1/payroll/summary",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Aggregated payroll summary", body = PayrollSummaryResponse),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn payroll_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if query.from > query.to {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "from cannot be after to"
        })));
    }

    let employee = match fetch_employee(pool.get_ref(), &query.emp_code).await? {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let records = fetch_range(pool.get_ref(), &query.emp_code, query.from, query.to).await?;

    let summary = aggregate_payroll(&employee.salary_config(), &records);

    Ok(HttpResponse::Ok().json(PayrollSummaryResponse {
        emp_code: employee.emp_code,
        full_name: employee.full_name,
        from: query.from,
        to: query.to,
        summary,
    }))
}

/// Early/on-time/late timing report
#[utoipa::path(
    get,
    path = "/api/v1/payroll/timing",
    params(TimingQuery),
    responses(
        (status = 200, description = "Per-record timing classification", body = TimingReportResponse),
        (status = 400, description = "Unknown policy or invalid range"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn timing_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<TimingQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if query.from > query.to {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "from cannot be after to"
        })));
    }

    let policy = match query.policy.as_deref() {
        None => ClassifyPolicy::Strict30,
        Some(label) => match label.parse::<ClassifyPolicy>() {
            Ok(p) => p,
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Unknown policy. Allowed: strict30, narrow15"
                })));
            }
        },
    };

    let employee = match fetch_employee(pool.get_ref(), &query.emp_code).await? {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let shift_start = employee.start_time.unwrap_or(config.default_shift_start);
    let standard_minutes = match (employee.start_time, employee.end_time) {
        (Some(start), Some(end)) => Some(standard_shift_minutes(start, end)),
        _ => None,
    };

    let records = fetch_range(pool.get_ref(), &query.emp_code, query.from, query.to).await?;

    let mut counts = TimingCounts::default();
    let mut entries = Vec::with_capacity(records.len());

    for record in &records {
        let bucket = match record.status() {
            Some(status) => {
                let bucket = classify_record(status, record.check_in_time, shift_start, policy);
                match bucket {
                    TimingBucket::Early => counts.early += 1,
                    TimingBucket::OnTime => counts.on_time += 1,
                    TimingBucket::Late => counts.late += 1,
                    TimingBucket::NoClockIn => counts.no_clock_in += 1,
                    TimingBucket::Absent => counts.absent += 1,
                    TimingBucket::Leave => counts.leave += 1,
                    TimingBucket::Holiday => counts.holiday += 1,
                    TimingBucket::Friday => counts.friday += 1,
                }
                bucket.to_string()
            }
            None => {
                counts.unclassified += 1;
                record.attendance_status.clone()
            }
        };

        // overtime/shortfall only where both sides are known; missing
        // inputs render the dash sentinel
        let (overtime, shortfall_minutes) = match (standard_minutes, &record.working_hours) {
            (Some(standard), Some(text)) => match parse_duration(text) {
                Ok(worked) => {
                    let split = compute_overtime_and_shortfall(worked, standard);
                    (overtime_label(split.overtime_minutes), split.shortfall_minutes)
                }
                Err(_) => (overtime_label(0), 0),
            },
            _ => (overtime_label(0), 0),
        };

        entries.push(TimingEntry {
            date: record.date,
            attendance_status: record.attendance_status.clone(),
            check_in_time: record.check_in_time,
            bucket,
            overtime,
            shortfall_minutes,
        });
    }

    Ok(HttpResponse::Ok().json(TimingReportResponse {
        emp_code: employee.emp_code,
        policy,
        counts,
        entries,
    }))
}
