use crate::{api::admin::log_activity, auth::auth::AuthUser, model::leave_request::LeaveRequest};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2025-07-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-07-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by employee code
    pub emp_code: Option<String>,
    /// Filter by leave status
    #[param(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "status": "pending"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let emp_code = auth
        .employee_code
        .clone()
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "A reason is required"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (emp_code, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(&emp_code)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.trim())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, emp_code = %emp_code, "Failed to create leave request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse)
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    filter: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    // employees only ever see their own requests
    if auth.is_employee() {
        let own = auth
            .employee_code
            .clone()
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;
        conditions.push("emp_code = ?");
        bindings.push(own);
    } else if let Some(emp_code) = &filter.emp_code {
        conditions.push("emp_code = ?");
        bindings.push(emp_code.clone());
    }

    if let Some(status) = &filter.status {
        conditions.push("status = ?");
        bindings.push(status.clone());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests {}", where_clause);
    debug!(sql = %count_sql, "Counting leave requests");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leave requests");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT * FROM leave_requests {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let data = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch leave requests");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get one leave request
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leaves/{leave_id}",
    params(
        ("leave_id", Path, description = "Leave request ID")
    ),
    responses(
        (status = 200, description = "Leave request", body = LeaveRequest),
        (status = 404, description = "Not found")
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to fetch leave request");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match leave {
        Some(leave) => {
            // employees only ever see their own requests
            if auth.is_employee() && auth.employee_code.as_deref() != Some(leave.emp_code.as_str())
            {
                return Err(actix_web::error::ErrorForbidden("Not your leave request"));
            }
            Ok(HttpResponse::Ok().json(leave))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found"
        }))),
    }
}

async fn transition_leave(
    auth: &AuthUser,
    pool: &MySqlPool,
    leave_id: u64,
    new_status: &str,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(new_status)
    .bind(leave_id)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to transition leave request");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No pending leave request with that ID"
        })));
    }

    log_activity(
        pool,
        &auth.username,
        new_status,
        &format!("leave:{}", leave_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request updated",
        "status": new_status
    })))
}

/* =========================
Approve / reject
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leaves/{leave_id}/approve",
    params(
        ("leave_id", Path, description = "Leave request ID")
    ),
    responses(
        (status = 200, description = "Approved"),
        (status = 404, description = "No pending request")
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    transition_leave(&auth, pool.get_ref(), path.into_inner(), "approved").await
}

#[utoipa::path(
    put,
    path = "/api/v1/leaves/{leave_id}/reject",
    params(
        ("leave_id", Path, description = "Leave request ID")
    ),
    responses(
        (status = 200, description = "Rejected"),
        (status = 404, description = "No pending request")
    ),
    tag = "Leave",
    security(("bearer_auth" = []))
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    transition_leave(&auth, pool.get_ref(), path.into_inner(), "rejected").await
}
