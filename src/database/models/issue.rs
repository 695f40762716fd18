use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_priority")]
pub enum IssuePriority {
    #[default]
    #[sqlx(rename = "Low")]
    Low,
    #[sqlx(rename = "Medium")]
    Medium,
    #[sqlx(rename = "High")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_tag")]
pub enum IssueTag {
    #[default]
    #[sqlx(rename = "Bug")]
    Bug,
    #[sqlx(rename = "Feature")]
    Feature,
    #[sqlx(rename = "Task")]
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_status")]
pub enum IssueStatus {
    #[default]
    #[serde(rename = "to-do")]
    #[sqlx(rename = "to-do")]
    ToDo,
    #[serde(rename = "in-progress")]
    #[sqlx(rename = "in-progress")]
    InProgress,
    #[serde(rename = "finished")]
    #[sqlx(rename = "finished")]
    Finished,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Issue {
    pub id: Uuid,
    /// Owning project, taken from the URL path at creation
    pub project_id: Uuid,
    /// Immutable; only the author may update or delete the issue
    pub author: Uuid,
    pub name: String,
    pub description: String,
    pub priority: IssuePriority,
    pub tag: IssueTag,
    pub status: IssueStatus,
    /// Assignee; must be a contributor of `project_id` at assignment time
    pub attribution: Uuid,
    pub created_time: DateTime<Utc>,
}
