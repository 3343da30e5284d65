use crate::{
    auth::auth::AuthUser,
    model::{
        activity_log::ActivityLog, app_update::AppUpdate, backup::BackupRecord,
        system_log::SystemLog,
    },
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

const APP_UPDATE_COLUMNS: &[&str] = &["version", "title", "notes", "released_on"];

/// Append a who-did-what row. Best effort: a failed audit write is logged
/// and never fails the calling handler.
pub async fn log_activity(pool: &MySqlPool, actor: &str, action: &str, resource: &str) {
    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO activity_logs (actor, action, resource)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(actor)
    .bind(action)
    .bind(resource)
    .execute(pool)
    .await
    {
        warn!(error = %e, actor = %actor, action = %action, "Failed to append activity log");
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSystemLog {
    #[schema(example = "error")]
    pub level: String,
    #[schema(example = "backup")]
    pub source: String,
    pub message: String,
}

#[derive(Deserialize, IntoParams)]
pub struct LogFilter {
    pub level: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
pub struct ActivityFilter {
    pub actor: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateBackup {
    #[schema(example = "staffhub-2025-06-02.sql.gz")]
    pub filename: String,
    pub size_bytes: i64,
    #[schema(example = "completed")]
    pub status: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAppUpdate {
    #[schema(example = "1.4.0")]
    pub version: String,
    pub title: String,
    pub notes: String,
    #[schema(example = "2025-06-01", value_type = String, format = "date")]
    pub released_on: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
}

fn paging(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(50).clamp(1, 200);
    (page, per_page, (page - 1) * per_page)
}

/// Append a system log row
#[utoipa::path(
    post,
    path = "/api/v1/admin/system-logs",
    request_body = CreateSystemLog,
    responses(
        (status = 201, description = "Log recorded"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn create_system_log(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSystemLog>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    sqlx::query(
        r#"
        INSERT INTO system_logs (level, source, message)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&payload.level)
    .bind(&payload.source)
    .bind(&payload.message)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to append system log");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Log recorded"
    })))
}

/// List system logs
#[utoipa::path(
    get,
    path = "/api/v1/admin/system-logs",
    params(LogFilter),
    responses(
        (status = 200, description = "System logs, newest first", body = [SystemLog])
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_system_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    filter: web::Query<LogFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (_, per_page, offset) = paging(filter.page, filter.per_page);

    let (sql, level) = match &filter.level {
        Some(level) => (
            "SELECT * FROM system_logs WHERE level = ? ORDER BY id DESC LIMIT ? OFFSET ?",
            Some(level.clone()),
        ),
        None => (
            "SELECT * FROM system_logs ORDER BY id DESC LIMIT ? OFFSET ?",
            None,
        ),
    };

    let mut query = sqlx::query_as::<_, SystemLog>(sql);
    if let Some(level) = &level {
        query = query.bind(level);
    }
    query = query.bind(per_page as i64).bind(offset as i64);

    let logs = query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch system logs");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(logs))
}

/// List activity logs
#[utoipa::path(
    get,
    path = "/api/v1/admin/activity-logs",
    params(ActivityFilter),
    responses(
        (status = 200, description = "Activity logs, newest first", body = [ActivityLog])
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_activity_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    filter: web::Query<ActivityFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (_, per_page, offset) = paging(filter.page, filter.per_page);

    let (sql, actor) = match &filter.actor {
        Some(actor) => (
            "SELECT * FROM activity_logs WHERE actor = ? ORDER BY id DESC LIMIT ? OFFSET ?",
            Some(actor.clone()),
        ),
        None => (
            "SELECT * FROM activity_logs ORDER BY id DESC LIMIT ? OFFSET ?",
            None,
        ),
    };

    let mut query = sqlx::query_as::<_, ActivityLog>(sql);
    if let Some(actor) = &actor {
        query = query.bind(actor);
    }
    query = query.bind(per_page as i64).bind(offset as i64);

    let logs = query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch activity logs");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(logs))
}

/// Record a backup run
#[utoipa::path(
    post,
    path = "/api/v1/admin/backups",
    request_body = CreateBackup,
    responses(
        (status = 201, description = "Backup recorded"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn create_backup_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateBackup>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    sqlx::query(
        r#"
        INSERT INTO backup_history (filename, size_bytes, status)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&payload.filename)
    .bind(payload.size_bytes)
    .bind(&payload.status)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to record backup");
        ErrorInternalServerError("Internal Server Error")
    })?;

    log_activity(
        pool.get_ref(),
        &auth.username,
        "backup",
        &format!("backup:{}", payload.filename),
    )
    .await;

    Ok(HttpResponse::Created().json(json!({
        "message": "Backup recorded"
    })))
}

/// List backup history
#[utoipa::path(
    get,
    path = "/api/v1/admin/backups",
    responses(
        (status = 200, description = "Backup history, newest first", body = [BackupRecord])
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_backups(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let backups =
        sqlx::query_as::<_, BackupRecord>("SELECT * FROM backup_history ORDER BY id DESC LIMIT 100")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch backup history");
                ErrorInternalServerError("Database error")
            })?;

    Ok(HttpResponse::Ok().json(backups))
}

/// Publish a changelog entry
#[utoipa::path(
    post,
    path = "/api/v1/admin/updates",
    request_body = CreateAppUpdate,
    responses(
        (status = 201, description = "Changelog entry created"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn create_app_update(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAppUpdate>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    sqlx::query(
        r#"
        INSERT INTO app_updates (version, title, notes, released_on)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.version)
    .bind(&payload.title)
    .bind(&payload.notes)
    .bind(payload.released_on)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create changelog entry");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Changelog entry created"
    })))
}

/// List changelog entries
#[utoipa::path(
    get,
    path = "/api/v1/admin/updates",
    responses(
        (status = 200, description = "Changelog, newest release first", body = [AppUpdate])
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_app_updates(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let updates =
        sqlx::query_as::<_, AppUpdate>("SELECT * FROM app_updates ORDER BY released_on DESC")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch changelog");
                ErrorInternalServerError("Database error")
            })?;

    Ok(HttpResponse::Ok().json(updates))
}

/// Edit a changelog entry
#[utoipa::path(
    put,
    path = "/api/v1/admin/updates/{update_id}",
    params(
        ("update_id", Path, description = "Changelog entry ID")
    ),
    responses(
        (status = 200, description = "Changelog entry updated"),
        (status = 404, description = "Not found")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn update_app_update(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let update_id = path.into_inner();

    let update = build_update_sql("app_updates", &body, APP_UPDATE_COLUMNS, "id", update_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Changelog entry not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Changelog entry updated"
    })))
}

/// Delete a changelog entry
#[utoipa::path(
    delete,
    path = "/api/v1/admin/updates/{update_id}",
    params(
        ("update_id", Path, description = "Changelog entry ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Not found")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_app_update(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let update_id = path.into_inner();

    let result = sqlx::query("DELETE FROM app_updates WHERE id = ?")
        .bind(update_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, update_id, "Failed to delete changelog entry");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Changelog entry not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Dashboard analytics
///
/// Headcounts by employee status, attendance status counts over an
/// optional date range, and the pending-leave backlog.
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Aggregated dashboard counts")
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn analytics(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AnalyticsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employees_by_status = sqlx::query_as::<_, (String, i64)>(
        "SELECT emp_status, COUNT(*) FROM employees GROUP BY emp_status",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed headcount query");
        ErrorInternalServerError("Database error")
    })?;

    let department_headcounts = sqlx::query_as::<_, (String, i64)>(
        "SELECT department, COUNT(*) FROM employees GROUP BY department",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed department headcount query");
        ErrorInternalServerError("Database error")
    })?;

    let mut attendance_sql =
        String::from("SELECT attendance_status, COUNT(*) FROM attendance");
    let mut range_bindings: Vec<String> = Vec::new();
    match (query.from, query.to) {
        (Some(from), Some(to)) => {
            attendance_sql.push_str(" WHERE date BETWEEN ? AND ?");
            range_bindings.push(from.to_string());
            range_bindings.push(to.to_string());
        }
        (Some(from), None) => {
            attendance_sql.push_str(" WHERE date >= ?");
            range_bindings.push(from.to_string());
        }
        (None, Some(to)) => {
            attendance_sql.push_str(" WHERE date <= ?");
            range_bindings.push(to.to_string());
        }
        (None, None) => {}
    }
    attendance_sql.push_str(" GROUP BY attendance_status");

    let mut attendance_query = sqlx::query_as::<_, (String, i64)>(&attendance_sql);
    for b in &range_bindings {
        attendance_query = attendance_query.bind(b);
    }

    let attendance_by_status = attendance_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed attendance analytics query");
        ErrorInternalServerError("Database error")
    })?;

    let pending_leaves = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE status = 'pending'",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed pending-leave count");
        ErrorInternalServerError("Database error")
    })?;

    let to_map = |rows: Vec<(String, i64)>| {
        rows.into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect::<serde_json::Map<_, _>>()
    };

    Ok(HttpResponse::Ok().json(json!({
        "employees_by_status": to_map(employees_by_status),
        "department_headcounts": to_map(department_headcounts),
        "attendance_by_status": to_map(attendance_by_status),
        "pending_leaves": pending_leaves
    })))
}
