use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::PAGE_SIZE;
use crate::database::models::{Issue, IssuePriority, IssueStatus, IssueTag};
use crate::database::DbError;

/// New issue content. The owning project and the author come from the URL
/// path and the authenticated principal, never from the body.
#[derive(Debug)]
pub struct NewIssue {
    pub name: String,
    pub description: String,
    pub priority: IssuePriority,
    pub tag: IssueTag,
    pub status: IssueStatus,
    pub attribution: Uuid,
}

#[derive(Debug, Default)]
pub struct IssueChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<IssuePriority>,
    pub tag: Option<IssueTag>,
    pub status: Option<IssueStatus>,
    pub attribution: Option<Uuid>,
}

pub struct IssueService {
    pool: PgPool,
}

impl IssueService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, project_id: Uuid, offset: i64) -> Result<(i64, Vec<Issue>), DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;

        let issues = sqlx::query_as::<_, Issue>(
            "SELECT * FROM issues WHERE project_id = $1 ORDER BY created_time, id \
             LIMIT $2 OFFSET $3",
        )
        .bind(project_id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((count, issues))
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        author: Uuid,
        new: NewIssue,
    ) -> Result<Issue, DbError> {
        let issue = sqlx::query_as::<_, Issue>(
            "INSERT INTO issues \
                (id, project_id, author, name, description, priority, tag, status, attribution, created_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(author)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.priority)
        .bind(new.tag)
        .bind(new.status)
        .bind(new.attribution)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(issue)
    }

    /// Fetch an issue scoped to its path project; a mismatched pair is
    /// indistinguishable from a missing issue
    pub async fn get(&self, project_id: Uuid, issue_id: Uuid) -> Result<Issue, DbError> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1 AND project_id = $2")
            .bind(issue_id)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound("Issue not found.".to_string()))
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
        changes: IssueChanges,
    ) -> Result<Issue, DbError> {
        let current = self.get(project_id, issue_id).await?;

        let issue = sqlx::query_as::<_, Issue>(
            "UPDATE issues SET \
                name = $2, description = $3, priority = $4, tag = $5, status = $6, attribution = $7 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(issue_id)
        .bind(changes.name.unwrap_or(current.name))
        .bind(changes.description.unwrap_or(current.description))
        .bind(changes.priority.unwrap_or(current.priority))
        .bind(changes.tag.unwrap_or(current.tag))
        .bind(changes.status.unwrap_or(current.status))
        .bind(changes.attribution.unwrap_or(current.attribution))
        .fetch_one(&self.pool)
        .await?;

        Ok(issue)
    }

    /// Delete an issue; its comments go with it through the cascade constraint
    pub async fn delete(&self, project_id: Uuid, issue_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1 AND project_id = $2")
            .bind(issue_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Issue not found.".to_string()));
        }
        Ok(())
    }
}
