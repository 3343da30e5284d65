use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who did what to which resource. Appended by handlers, read-only in the
/// admin panel.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: u64,
    #[schema(example = "admin")]
    pub actor: String,
    #[schema(example = "login")]
    pub action: String,
    #[schema(example = "user:admin")]
    pub resource: String,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
