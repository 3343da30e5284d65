use crate::api::admin::{CreateAppUpdate, CreateBackup, CreateSystemLog};
use crate::api::attendance::{
    AttendanceListResponse, CreateAttendance, MarkAbsences, MarkAbsencesResponse, UpdateAttendance,
};
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::leave_request::{CreateLeave, LeaveListResponse};
use crate::api::payroll::{
    PayrollSummaryResponse, TimingCounts, TimingEntry, TimingReportResponse,
};
use crate::model::activity_log::ActivityLog;
use crate::model::app_update::AppUpdate;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::backup::BackupRecord;
use crate::model::department::{Department, DepartmentWithCount};
use crate::model::employee::{EmpStatus, Employee};
use crate::model::leave_request::LeaveRequest;
use crate::model::system_log::SystemLog;
use crate::payroll::aggregate::{CategoryCounts, CategoryDetails, PayrollSummary, SalaryConfig};
use crate::payroll::classify::ClassifyPolicy;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::{openapi, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffHub API",
        version = "1.0.0",
        description = r#"
## Employee Attendance & Payroll Administration

This API powers an attendance and payroll administration dashboard.

### Key Features
- **Employee Management**
  - Sequential employee codes, shift windows, salary components with a derived total
- **Department Management**
  - CRUD with read-time employee counts
- **Attendance Management**
  - Manual entry, bulk absence marking, per-day working-hours strings
- **Payroll & Timing**
  - Range aggregation (category counts, per-hour rate) and early/on-time/late reports
    under the `strict30` and `narrow15` policies
- **Administration**
  - System logs, activity trail, backup history, changelog, analytics

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::attendance::create_attendance,
        crate::api::attendance::mark_absences,
        crate::api::attendance::list_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::payroll::payroll_summary,
        crate::api::payroll::timing_report,

        crate::api::admin::create_system_log,
        crate::api::admin::list_system_logs,
        crate::api::admin::list_activity_logs,
        crate::api::admin::create_backup_record,
        crate::api::admin::list_backups,
        crate::api::admin::create_app_update,
        crate::api::admin::list_app_updates,
        crate::api::admin::update_app_update,
        crate::api::admin::delete_app_update,
        crate::api::admin::analytics
    ),
    components(
        schemas(
            Employee,
            EmpStatus,
            CreateEmployee,
            UpdateEmployee,
            EmployeeListResponse,
            Department,
            DepartmentWithCount,
            CreateDepartment,
            Attendance,
            AttendanceStatus,
            CreateAttendance,
            UpdateAttendance,
            MarkAbsences,
            MarkAbsencesResponse,
            AttendanceListResponse,
            LeaveRequest,
            CreateLeave,
            LeaveListResponse,
            SalaryConfig,
            CategoryCounts,
            CategoryDetails,
            PayrollSummary,
            PayrollSummaryResponse,
            ClassifyPolicy,
            TimingEntry,
            TimingCounts,
            TimingReportResponse,
            SystemLog,
            ActivityLog,
            BackupRecord,
            AppUpdate,
            CreateSystemLog,
            CreateBackup,
            CreateAppUpdate
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll aggregation and timing reports"),
        (name = "Admin", description = "System administration panel APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
