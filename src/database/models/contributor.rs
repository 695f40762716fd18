use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Join row linking a user to a project. A (user, project) pair is unique;
/// the `author` flag marks elevated standing and is set for project creators.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contributor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub author: bool,
}
