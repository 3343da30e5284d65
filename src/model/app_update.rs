use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Changelog entry shown on the admin panel.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AppUpdate {
    pub id: u64,
    #[schema(example = "1.4.0")]
    pub version: String,
    pub title: String,
    pub notes: String,
    #[schema(value_type = String, format = "date")]
    pub released_on: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
