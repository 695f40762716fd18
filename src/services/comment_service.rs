use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::PAGE_SIZE;
use crate::database::models::Comment;
use crate::database::DbError;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comments under the path issue, constrained to the path project through
    /// the issue join; a mismatched path yields an empty collection
    pub async fn list(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
        offset: i64,
    ) -> Result<(i64, Vec<Comment>), DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments c \
             JOIN issues i ON i.id = c.issue_id \
             WHERE c.issue_id = $1 AND i.project_id = $2",
        )
        .bind(issue_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        let comments = sqlx::query_as::<_, Comment>(
            "SELECT c.* FROM comments c \
             JOIN issues i ON i.id = c.issue_id \
             WHERE c.issue_id = $1 AND i.project_id = $2 \
             ORDER BY c.created_time, c.id \
             LIMIT $3 OFFSET $4",
        )
        .bind(issue_id)
        .bind(project_id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((count, comments))
    }

    /// Create a comment with a fresh external identifier. The caller has
    /// already verified the issue belongs to the path project.
    pub async fn create(
        &self,
        issue_id: Uuid,
        author: Uuid,
        description: String,
    ) -> Result<Comment, DbError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, issue_id, author, description, uuid, created_time) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(issue_id)
        .bind(author)
        .bind(&description)
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn get(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, DbError> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.* FROM comments c \
             JOIN issues i ON i.id = c.issue_id \
             WHERE c.id = $1 AND c.issue_id = $2 AND i.project_id = $3",
        )
        .bind(comment_id)
        .bind(issue_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound("Comment not found.".to_string()))
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
        comment_id: Uuid,
        description: String,
    ) -> Result<Comment, DbError> {
        // Scoped fetch first so a mismatched parent chain is a 404, not a write
        let current = self.get(project_id, issue_id, comment_id).await?;

        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET description = $2 WHERE id = $1 RETURNING *",
        )
        .bind(current.id)
        .bind(&description)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn delete(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DbError> {
        let current = self.get(project_id, issue_id, comment_id).await?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(current.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
