use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Append-mostly operational log row surfaced in the admin panel.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SystemLog {
    pub id: u64,
    #[schema(example = "error")]
    pub level: String,
    #[schema(example = "backup")]
    pub source: String,
    pub message: String,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
