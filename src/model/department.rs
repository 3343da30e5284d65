use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    pub id: u64,
    pub name: String,
}

/// List-view row: the employee count is aggregated at read time, never
/// stored on the department itself.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentWithCount {
    pub id: u64,
    pub name: String,
    #[schema(example = 12)]
    pub employee_count: i64,
}
