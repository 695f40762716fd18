use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::DbError;

/// Counts of content the user authored, recomputed on every lifecycle call.
/// The pending-confirmation state is never persisted; it is a pure function
/// of these counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthoredContent {
    pub projects: i64,
    pub issues: i64,
    pub comments: i64,
}

impl AuthoredContent {
    pub fn is_empty(&self) -> bool {
        self.projects == 0 && self.issues == 0 && self.comments == 0
    }
}

/// The two choices a user can answer the confirmation prompt with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionChoice {
    DeleteAccountAndContents,
    Cancel,
}

pub const DELETION_OPTIONS: [&str; 2] = ["delete_account_and_contents", "cancel"];

/// Result of a deletion-flow call
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Terminal: the account and all dependent rows are gone
    Deleted,
    /// The account authored content; nothing was deleted. The caller must
    /// come back through confirm_deletion with one of `options`.
    ConfirmationRequired {
        authored: AuthoredContent,
        options: [&'static str; 2],
    },
    /// Cancel chosen: back to active, no data changed
    Cancelled,
}

/// Decide the next transition from the authored-content check alone
pub fn decide(authored: AuthoredContent) -> DeletionOutcome {
    if authored.is_empty() {
        DeletionOutcome::Deleted
    } else {
        DeletionOutcome::ConfirmationRequired { authored, options: DELETION_OPTIONS }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        AccountError::Db(DbError::Sqlx(err))
    }
}

/// Self-service account deletion: `Active → PendingConfirmation → Deleted`,
/// with cancel returning to Active
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn authored_content(&self, user_id: Uuid) -> Result<AuthoredContent, AccountError> {
        let (projects, issues, comments): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM projects WHERE author = $1), \
                (SELECT COUNT(*) FROM issues WHERE author = $1), \
                (SELECT COUNT(*) FROM comments WHERE author = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AuthoredContent { projects, issues, comments })
    }

    /// First call of the flow. An account with no authored content is removed
    /// immediately; otherwise nothing is deleted and the prompt is returned.
    pub async fn request_deletion(&self, principal: Uuid) -> Result<DeletionOutcome, AccountError> {
        let authored = self.authored_content(principal).await?;
        let outcome = decide(authored);

        if outcome == DeletionOutcome::Deleted {
            self.delete_user(principal).await?;
        }

        Ok(outcome)
    }

    /// Second call of the flow, carrying the explicit choice. Deleting
    /// cascades to every row the user authored or is linked from; cancelling
    /// changes nothing.
    pub async fn confirm_deletion(
        &self,
        principal: Uuid,
        choice: DeletionChoice,
    ) -> Result<DeletionOutcome, AccountError> {
        match choice {
            DeletionChoice::Cancel => Ok(DeletionOutcome::Cancelled),
            DeletionChoice::DeleteAccountAndContents => {
                self.delete_user(principal).await?;
                Ok(DeletionOutcome::Deleted)
            }
        }
    }

    /// Remove the account row. Dependent rows (authored projects and their
    /// contributors/issues/comments, authored issues and comments, assigned
    /// issues, membership rows) go with it through the declared ON DELETE
    /// CASCADE constraints, atomically within the single statement.
    async fn delete_user(&self, user_id: Uuid) -> Result<(), AccountError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound("User not found.".to_string()));
        }

        tracing::info!("Deleted user account {}", user_id);
        Ok(())
    }
}
