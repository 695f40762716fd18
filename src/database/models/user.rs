use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Account row. The password hash never leaves the server; responses are
/// shaped through the view types in `crate::api::format`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub age: i16,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
    pub date_joined: DateTime<Utc>,
}
