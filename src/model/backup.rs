use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// History of backup runs. Only the record is kept here; execution belongs
/// to external tooling.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BackupRecord {
    pub id: u64,
    #[schema(example = "staffhub-2025-06-02.sql.gz")]
    pub filename: String,
    pub size_bytes: i64,
    #[schema(example = "completed")]
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
