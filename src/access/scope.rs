use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::DbError;

/// Errors raised while resolving a nested resource path
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("{0}")]
    Denied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for ScopeError {
    fn from(err: sqlx::Error) -> Self {
        ScopeError::Db(DbError::Sqlx(err))
    }
}

/// Resolves and validates the project → issue → comment parent chain for a
/// request, and gates nested access on project membership.
///
/// Existence is not hidden: a missing parent is NotFound, an existing parent
/// the principal is not a member of is Denied. Ancestor ids always come from
/// the URL path; request bodies are never trusted for parent linkage.
pub struct ScopeResolver<'a> {
    pool: &'a PgPool,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether a contributor row links `user_id` to `project_id`
    pub async fn is_contributor(&self, user_id: Uuid, project_id: Uuid) -> Result<bool, ScopeError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM contributors WHERE user_id = $1 AND project_id = $2)",
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Gate for project-detail and nested collection routes: the project must
    /// exist and the principal must be one of its contributors. `resource`
    /// names what is being reached for the denial message ("details",
    /// "issues", "comments", ...).
    pub async fn require_project_member(
        &self,
        principal: Uuid,
        project_id: Uuid,
        resource: &str,
    ) -> Result<(), ScopeError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
                .bind(project_id)
                .fetch_one(self.pool)
                .await?;
        if !exists {
            return Err(ScopeError::NotFound("Project not found.".to_string()));
        }

        if !self.is_contributor(principal, project_id).await? {
            return Err(ScopeError::Denied(format!(
                "You must be a contributor of this project to access its {}.",
                resource
            )));
        }

        Ok(())
    }

    /// Verify the path issue exists and belongs to the path project. Used on
    /// comment creation to defend against mismatched path segments.
    pub async fn require_issue_in_project(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
    ) -> Result<(), ScopeError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM issues WHERE id = $1)")
                .bind(issue_id)
                .fetch_one(self.pool)
                .await?;
        if !exists {
            return Err(ScopeError::NotFound("Issue not found.".to_string()));
        }

        let in_project: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM issues WHERE id = $1 AND project_id = $2)",
        )
        .bind(issue_id)
        .bind(project_id)
        .fetch_one(self.pool)
        .await?;
        if !in_project {
            return Err(ScopeError::Validation(
                "This issue does not belong to the specified project.".to_string(),
            ));
        }

        Ok(())
    }

    /// Assignment rule: the attributed user must already be a contributor of
    /// the target project. Applies on issue create and update.
    pub async fn require_attribution_contributor(
        &self,
        attribution: Uuid,
        project_id: Uuid,
    ) -> Result<(), ScopeError> {
        if !self.is_contributor(attribution, project_id).await? {
            return Err(ScopeError::Validation(
                "The assigned user must be a contributor of this project.".to_string(),
            ));
        }
        Ok(())
    }

    /// Idempotency guard for contributor creation: a (user, project) pair may
    /// exist at most once. The UNIQUE constraint closes the race this check
    /// leaves open.
    pub async fn require_not_contributor(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<(), ScopeError> {
        if self.is_contributor(user_id, project_id).await? {
            return Err(ScopeError::Validation(
                "This user is already a contributor of this project.".to_string(),
            ));
        }
        Ok(())
    }
}
