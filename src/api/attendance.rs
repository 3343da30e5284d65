use crate::{
    api::admin::log_activity,
    auth::auth::AuthUser,
    model::attendance::{Attendance, AttendanceStatus},
    payroll::duration::working_hours_label,
    utils::{emp_code_filter, employee_cache},
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = "1001")]
    pub emp_code: String,
    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Present")]
    pub attendance_status: AttendanceStatus,
    #[schema(example = "2025-06-02T08:05:00", value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,
    #[schema(example = "2025-06-02T18:45:00", value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    pub attendance_status: Option<AttendanceStatus>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,
}

/// Absence-marking flow: one status applied to many employees for one date.
#[derive(Deserialize, ToSchema)]
pub struct MarkAbsences {
    #[schema(example = "2025-06-06", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Friday")]
    pub attendance_status: AttendanceStatus,
    #[schema(example = json!(["1001", "1002"]))]
    pub emp_codes: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkAbsencesResponse {
    pub inserted: usize,
    /// Unknown codes and employees already holding a row for the date.
    pub skipped: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub emp_code: Option<String>,
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

async fn attendance_exists(
    pool: &MySqlPool,
    emp_code: &str,
    date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    // one row per employee per date, enforced here rather than by a
    // declared constraint
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM attendance WHERE emp_code = ? AND date = ? LIMIT 1)",
    )
    .bind(emp_code)
    .bind(date)
    .fetch_one(pool)
    .await
}

async fn insert_attendance(
    pool: &MySqlPool,
    emp_code: &str,
    snapshot: &employee_cache::EmployeeSnapshot,
    date: NaiveDate,
    status: AttendanceStatus,
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
    working_hours: Option<String>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO attendance
        (emp_code, emp_name, department, job_title, daily_bonus,
         date, attendance_status, check_in_time, check_out_time, working_hours)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(emp_code)
    .bind(&snapshot.full_name)
    .bind(&snapshot.department)
    .bind(&snapshot.job_title)
    .bind(snapshot.daily_salary)
    .bind(date)
    .bind(status.to_string())
    .bind(check_in)
    .bind(check_out)
    .bind(working_hours)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Manual attendance entry
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance recorded"),
        (status = 400, description = "Duplicate date or check times on a non-Present status"),
        (status = 404, description = "Unknown employee"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // fast negative via the in-memory filter before any query
    if !emp_code_filter::might_exist(&payload.emp_code) {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Unknown employee code"
        })));
    }

    let snapshot = employee_cache::lookup(pool.get_ref(), &payload.emp_code)
        .await
        .map_err(|e| {
            error!(error = %e, emp_code = %payload.emp_code, "Failed to fetch employee snapshot");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let snapshot = match snapshot {
        Some(s) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Unknown employee code"
            })));
        }
    };

    // non-Present rows must not carry clock times
    if payload.attendance_status.is_absence_like()
        && (payload.check_in_time.is_some() || payload.check_out_time.is_some())
    {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Check-in/check-out times are only valid for Present status"
        })));
    }

    let exists = attendance_exists(pool.get_ref(), &payload.emp_code, payload.date)
        .await
        .map_err(|e| {
            error!(error = %e, emp_code = %payload.emp_code, "Failed duplicate check");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if exists {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Attendance for this employee and date already exists"
        })));
    }

    let working_hours = match payload.attendance_status {
        AttendanceStatus::Present => Some(working_hours_label(
            payload.check_in_time,
            payload.check_out_time,
        )),
        _ => None,
    };

    if let Err(e) = insert_attendance(
        pool.get_ref(),
        &payload.emp_code,
        &snapshot,
        payload.date,
        payload.attendance_status,
        payload.check_in_time,
        payload.check_out_time,
        working_hours,
    )
    .await
    {
        error!(error = %e, emp_code = %payload.emp_code, "Failed to insert attendance");
        return Ok(HttpResponse::InternalServerError().json(json!({
            "message": "Internal Server Error"
        })));
    }

    log_activity(
        pool.get_ref(),
        &auth.username,
        "create",
        &format!("attendance:{}:{}", payload.emp_code, payload.date),
    )
    .await;

    Ok(HttpResponse::Created().json(json!({
        "message": "Attendance recorded successfully"
    })))
}

/// Bulk absence marking
#[utoipa::path(
    post,
    path = "/api/v1/attendance/absences",
    request_body = MarkAbsences,
    responses(
        (status = 200, description = "Absences marked", body = MarkAbsencesResponse),
        (status = 400, description = "Status is not absence-like"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn mark_absences(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<MarkAbsences>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if !payload.attendance_status.is_absence_like() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Use the manual-entry endpoint for Present records"
        })));
    }

    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for emp_code in &payload.emp_codes {
        let snapshot = match employee_cache::lookup(pool.get_ref(), emp_code).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                skipped += 1;
                continue;
            }
            Err(e) => {
                error!(error = %e, emp_code = %emp_code, "Snapshot lookup failed");
                skipped += 1;
                continue;
            }
        };

        match attendance_exists(pool.get_ref(), emp_code, payload.date).await {
            Ok(false) => {}
            Ok(true) => {
                skipped += 1;
                continue;
            }
            Err(e) => {
                error!(error = %e, emp_code = %emp_code, "Duplicate check failed");
                skipped += 1;
                continue;
            }
        }

        match insert_attendance(
            pool.get_ref(),
            emp_code,
            &snapshot,
            payload.date,
            payload.attendance_status,
            None,
            None,
            None,
        )
        .await
        {
            Ok(()) => inserted += 1,
            Err(e) => {
                error!(error = %e, emp_code = %emp_code, "Failed to insert absence");
                skipped += 1;
            }
        }
    }

    log_activity(
        pool.get_ref(),
        &auth.username,
        "mark-absences",
        &format!("attendance:{}", payload.date),
    )
    .await;

    Ok(HttpResponse::Ok().json(MarkAbsencesResponse { inserted, skipped }))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(emp_code) = &query.emp_code {
        conditions.push("emp_code = ?");
        bindings.push(emp_code.clone());
    }

    if let Some(from) = query.from {
        conditions.push("date >= ?");
        bindings.push(from.to_string());
    }

    if let Some(to) = query.to {
        conditions.push("date <= ?");
        bindings.push(to.to_string());
    }

    if let Some(status) = &query.status {
        conditions.push("attendance_status = ?");
        bindings.push(status.clone());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM attendance {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting attendance rows");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count attendance");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT * FROM attendance {} ORDER BY date DESC, emp_code LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, Attendance>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let records = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch attendance");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Edit an attendance record
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id", Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Attendance updated"),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let attendance_id = path.into_inner();

    let current = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, attendance_id, "Failed to fetch attendance");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Attendance record not found"
            })));
        }
    };

    let status = match body.attendance_status {
        Some(s) => s,
        None => match current.status() {
            Some(s) => s,
            None => {
                // legacy label we can no longer edit around
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Record has an unknown status; set attendance_status explicitly"
                })));
            }
        },
    };

    // absence-like statuses force the clock fields back to NULL
    let (check_in, check_out) = if status.is_absence_like() {
        (None, None)
    } else {
        (
            body.check_in_time.or(current.check_in_time),
            body.check_out_time.or(current.check_out_time),
        )
    };

    let working_hours = match status {
        AttendanceStatus::Present => Some(working_hours_label(check_in, check_out)),
        _ => None,
    };

    sqlx::query(
        r#"
        UPDATE attendance
        SET attendance_status = ?, check_in_time = ?, check_out_time = ?, working_hours = ?
        WHERE id = ?
        "#,
    )
    .bind(status.to_string())
    .bind(check_in)
    .bind(check_out)
    .bind(working_hours)
    .bind(attendance_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, attendance_id, "Failed to update attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    log_activity(
        pool.get_ref(),
        &auth.username,
        "update",
        &format!("attendance:{}", attendance_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance updated successfully"
    })))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let attendance_id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(attendance_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, attendance_id, "Failed to delete attendance");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    log_activity(
        pool.get_ref(),
        &auth.username,
        "delete",
        &format!("attendance:{}", attendance_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
