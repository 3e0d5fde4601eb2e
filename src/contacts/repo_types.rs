use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

use super::dto::iso_date;

/// Contact row; always belongs to exactly one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(serialize_with = "iso_date::serialize")]
    pub birthday: Date,
    pub additional_info: Option<String>,
}
