use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    /// Internal row identifier, used in nested URLs
    pub id: Uuid,
    pub issue_id: Uuid,
    /// Immutable; only the author may update or delete the comment
    pub author: Uuid,
    pub description: String,
    /// Externally-facing identifier, random and unique, distinct from `id`
    pub uuid: Uuid,
    pub created_time: DateTime<Utc>,
}
