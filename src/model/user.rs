use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role_id: u8,
    /// Present only if this account is linked to an employee record.
    pub employee_code: Option<String>,
    pub is_active: bool,
}
