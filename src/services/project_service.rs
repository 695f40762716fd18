use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::api::format::PAGE_SIZE;
use crate::database::models::{Contributor, Project, ProjectType};
use crate::database::DbError;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for ProjectError {
    fn from(err: sqlx::Error) -> Self {
        ProjectError::Db(DbError::Sqlx(err))
    }
}

/// Fields a project author may change; the author itself is immutable
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub project_type: Option<ProjectType>,
}

pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a project and register its author as a contributor with the
    /// author flag, in one transaction
    pub async fn create(
        &self,
        author: Uuid,
        name: String,
        description: String,
        project_type: ProjectType,
    ) -> Result<Project, ProjectError> {
        let mut tx = self.pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, author, name, description, type, created_time) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(author)
        .bind(&name)
        .bind(&description)
        .bind(project_type)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO contributors (id, user_id, project_id, author) VALUES ($1, $2, $3, TRUE)",
        )
        .bind(Uuid::new_v4())
        .bind(author)
        .bind(project.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Projects visible to the principal: those with a contributor row for
    /// them. An empty page, not an error, for a principal with no memberships.
    pub async fn list_for(&self, principal: Uuid, offset: i64) -> Result<(i64, Vec<Project>), ProjectError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects p \
             JOIN contributors c ON c.project_id = p.id \
             WHERE c.user_id = $1",
        )
        .bind(principal)
        .fetch_one(&self.pool)
        .await?;

        let projects = sqlx::query_as::<_, Project>(
            "SELECT p.* FROM projects p \
             JOIN contributors c ON c.project_id = p.id \
             WHERE c.user_id = $1 \
             ORDER BY p.created_time, p.id \
             LIMIT $2 OFFSET $3",
        )
        .bind(principal)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((count, projects))
    }

    pub async fn get(&self, project_id: Uuid) -> Result<Project, ProjectError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ProjectError::Db(DbError::NotFound("Project not found.".to_string())))
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Project, ProjectError> {
        let current = self.get(project_id).await?;

        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $2, description = $3, type = $4 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(project_id)
        .bind(changes.name.unwrap_or(current.name))
        .bind(changes.description.unwrap_or(current.description))
        .bind(changes.project_type.unwrap_or(current.project_type))
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    /// Delete a project; contributors, issues and comments go with it through
    /// the declared cascade constraints
    pub async fn delete(&self, project_id: Uuid) -> Result<(), ProjectError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProjectError::Db(DbError::NotFound("Project not found.".to_string())));
        }
        Ok(())
    }

    pub async fn contributors(
        &self,
        project_id: Uuid,
        offset: i64,
    ) -> Result<(i64, Vec<Contributor>), ProjectError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contributors WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;

        let contributors = sqlx::query_as::<_, Contributor>(
            "SELECT * FROM contributors WHERE project_id = $1 ORDER BY author DESC, id \
             LIMIT $2 OFFSET $3",
        )
        .bind(project_id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((count, contributors))
    }

    /// Insert a membership row. The caller checks for duplicates first; the
    /// UNIQUE constraint closes the race and maps to the same error.
    pub async fn add_contributor(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        author: bool,
    ) -> Result<Contributor, ProjectError> {
        let result = sqlx::query_as::<_, Contributor>(
            "INSERT INTO contributors (id, user_id, project_id, author) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(project_id)
        .bind(author)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(contributor) => Ok(contributor),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                ProjectError::Validation(
                    "This user is already a contributor of this project.".to_string(),
                ),
            ),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn remove_contributor(
        &self,
        project_id: Uuid,
        contributor_id: Uuid,
    ) -> Result<(), ProjectError> {
        let result = sqlx::query("DELETE FROM contributors WHERE id = $1 AND project_id = $2")
            .bind(contributor_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProjectError::Db(DbError::NotFound("Contributor not found.".to_string())));
        }
        Ok(())
    }
}
