use crate::{
    api::admin::log_activity,
    auth::auth::AuthUser,
    model::department::{Department, DepartmentWithCount},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

/// Renameable columns; counts are derived, never written.
const DEPARTMENT_COLUMNS: &[&str] = &["name"];

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created"),
        (status = 409, description = "Department already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Department",
    security(("bearer_auth" = []))
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Department name must not be empty"
        })));
    }

    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => {
            log_activity(
                pool.get_ref(),
                &auth.username,
                "create",
                &format!("department:{}", name),
            )
            .await;

            Ok(HttpResponse::Created().json(json!({
                "message": "Department created successfully"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Department already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to create department");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// List departments with read-time employee counts
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments with employee counts", body = [DepartmentWithCount])
    ),
    tag = "Department",
    security(("bearer_auth" = []))
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let departments = sqlx::query_as::<_, DepartmentWithCount>(
        r#"
        SELECT d.id, d.name, COUNT(e.id) AS employee_count
        FROM departments d
        LEFT JOIN employees e ON e.department = d.name
        GROUP BY d.id, d.name
        ORDER BY d.name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to list departments");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Rename Department
///
/// Attendance rows keep their snapshot of the old name; only the
/// department row and future snapshots change.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department updated"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department",
    security(("bearer_auth" = []))
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let department_id = path.into_inner();

    let update = build_update_sql(
        "departments",
        &body,
        DEPARTMENT_COLUMNS,
        "id",
        department_id,
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Department not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated successfully"
    })))
}

/// Delete Department
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id", Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 400, description = "Department still has employees"),
        (status = 404, description = "Department not found")
    ),
    tag = "Department",
    security(("bearer_auth" = []))
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let department_id = path.into_inner();

    let department =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
            .bind(department_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, department_id, "Failed to fetch department");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let department = match department {
        Some(d) => d,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Department not found"
            })));
        }
    };

    let headcount =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE department = ?")
            .bind(&department.name)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, department_id, "Failed to count department employees");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if headcount > 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Department still has employees assigned"
        })));
    }

    sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, department_id, "Failed to delete department");
            ErrorInternalServerError("Internal Server Error")
        })?;

    log_activity(
        pool.get_ref(),
        &auth.username,
        "delete",
        &format!("department:{}", department.name),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
