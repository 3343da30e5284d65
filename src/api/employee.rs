use crate::{
    api::admin::log_activity,
    auth::auth::AuthUser,
    model::employee::{EmpStatus, Employee},
    payroll::SalaryConfig,
    utils::{emp_code_filter, employee_cache},
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

/// First code handed out when the employees table is empty.
const FIRST_EMP_CODE: u64 = 1001;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Ayesha Rahman")]
    pub full_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Developer")]
    pub job_title: String,
    #[schema(example = "Active")]
    pub emp_status: Option<EmpStatus>,
    #[schema(example = "08:00:00", value_type = Option<String>, format = "time")]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = Option<String>, format = "time")]
    pub end_time: Option<NaiveTime>,
    #[schema(example = 45000.0)]
    pub monthly_salary: Option<f64>,
    #[schema(example = 0.0)]
    pub daily_salary: Option<f64>,
    #[schema(example = 0.0)]
    pub weekly_salary: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub emp_status: Option<EmpStatus>,
    #[schema(value_type = Option<String>, format = "time")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub end_time: Option<NaiveTime>,
    pub monthly_salary: Option<f64>,
    pub daily_salary: Option<f64>,
    pub weekly_salary: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub status: Option<String>,
    /// Matches name or employee code
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 57)]
    pub total: i64,
}

/// Shift windows that cross midnight are out of scope; reject them here so
/// a negative standard duration can never enter the system.
fn validate_shift_window(
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> Result<(), HttpResponse> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(HttpResponse::BadRequest().json(json!({
                "message": "Overnight shift windows are not supported: end_time must be after start_time"
            })));
        }
    }
    Ok(())
}

async fn next_emp_code(pool: &MySqlPool) -> Result<String, sqlx::Error> {
    let max: Option<u64> =
        sqlx::query_scalar("SELECT MAX(CAST(emp_code AS UNSIGNED)) FROM employees")
            .fetch_one(pool)
            .await?;

    Ok(format!("{:04}", max.map(|m| m + 1).unwrap_or(FIRST_EMP_CODE)))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created successfully",
            "emp_code": "1001"
        })),
        (status = 400, description = "Invalid shift window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if let Err(resp) = validate_shift_window(payload.start_time, payload.end_time) {
        return Ok(resp);
    }

    let emp_code = next_emp_code(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to allocate employee code");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let salary = SalaryConfig {
        monthly: payload.monthly_salary.unwrap_or(0.0),
        daily: payload.daily_salary.unwrap_or(0.0),
        weekly: payload.weekly_salary.unwrap_or(0.0),
    };
    let emp_status = payload.emp_status.unwrap_or(EmpStatus::Active).to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (emp_code, full_name, department, job_title, emp_status,
         start_time, end_time, monthly_salary, daily_salary, weekly_salary, total_salary)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&emp_code)
    .bind(&payload.full_name)
    .bind(&payload.department)
    .bind(&payload.job_title)
    .bind(&emp_status)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(salary.monthly)
    .bind(salary.daily)
    .bind(salary.weekly)
    .bind(salary.total())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            emp_code_filter::insert(&emp_code);
            employee_cache::put(
                &emp_code,
                employee_cache::EmployeeSnapshot {
                    full_name: payload.full_name.clone(),
                    department: payload.department.clone(),
                    job_title: payload.job_title.clone(),
                    daily_salary: salary.daily,
                    start_time: payload.start_time,
                    end_time: payload.end_time,
                },
            )
            .await;

            log_activity(
                pool.get_ref(),
                &auth.username,
                "create",
                &format!("employee:{}", emp_code),
            )
            .await;

            Ok(HttpResponse::Created().json(json!({
                "message": "Employee created successfully",
                "emp_code": emp_code
            })))
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            })))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone());
    }

    if let Some(status) = &query.status {
        conditions.push("emp_status = ?");
        bindings.push(status.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(full_name LIKE ? OR emp_code LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM employees {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY emp_code LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by code
#[utoipa::path(
    get,
    path = "/api/v1/employees/{emp_code}",
    params(
        ("emp_code", Path, description = "Employee code")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let emp_code = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE emp_code = ?")
        .bind(&emp_code)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, %emp_code, "Failed to fetch employee");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update Employee
///
/// Fetch-merge-update so `total_salary` is always recomputed server-side
/// from the merged salary components.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{emp_code}",
    params(
        ("emp_code", Path, description = "Employee code")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "message": "Employee updated successfully"
        })),
        (status = 400, description = "Invalid shift window"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    body: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let emp_code = path.into_inner();

    let current = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE emp_code = ?")
        .bind(&emp_code)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, %emp_code, "Failed to fetch employee");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let full_name = body.full_name.clone().unwrap_or(current.full_name);
    let department = body.department.clone().unwrap_or(current.department);
    let job_title = body.job_title.clone().unwrap_or(current.job_title);
    let emp_status = body
        .emp_status
        .map(|s| s.to_string())
        .unwrap_or(current.emp_status);
    let start_time = body.start_time.or(current.start_time);
    let end_time = body.end_time.or(current.end_time);

    if let Err(resp) = validate_shift_window(start_time, end_time) {
        return Ok(resp);
    }

    let salary = SalaryConfig {
        monthly: body.monthly_salary.unwrap_or(current.monthly_salary),
        daily: body.daily_salary.unwrap_or(current.daily_salary),
        weekly: body.weekly_salary.unwrap_or(current.weekly_salary),
    };

    sqlx::query(
        r#"
        UPDATE employees
        SET full_name = ?, department = ?, job_title = ?, emp_status = ?,
            start_time = ?, end_time = ?,
            monthly_salary = ?, daily_salary = ?, weekly_salary = ?, total_salary = ?
        WHERE emp_code = ?
        "#,
    )
    .bind(&full_name)
    .bind(&department)
    .bind(&job_title)
    .bind(&emp_status)
    .bind(start_time)
    .bind(end_time)
    .bind(salary.monthly)
    .bind(salary.daily)
    .bind(salary.weekly)
    .bind(salary.total())
    .bind(&emp_code)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %emp_code, "Failed to update employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // snapshot source changed; next lookup repopulates
    employee_cache::invalidate(&emp_code).await;

    log_activity(
        pool.get_ref(),
        &auth.username,
        "update",
        &format!("employee:{}", emp_code),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee
///
/// Hard delete. The normal flow deactivates via `emp_status` instead.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{emp_code}",
    params(
        ("emp_code", Path, description = "Employee code")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let emp_code = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE emp_code = ?")
        .bind(&emp_code)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Employee not found"
                })));
            }

            emp_code_filter::remove(&emp_code);
            employee_cache::invalidate(&emp_code).await;

            log_activity(
                pool.get_ref(),
                &auth.username,
                "delete",
                &format!("employee:{}", emp_code),
            )
            .await;

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, %emp_code, "Failed to delete employee");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}
