use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::api::format::{ProjectRef, PAGE_SIZE};
use crate::database::models::User;
use crate::database::DbError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<(String, String)>,
    },

    #[error("Password hashing error: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Db(DbError::Sqlx(err))
    }
}

/// Validated registration input; field-level validation happens at the API
/// layer before this is built
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub age: i16,
    pub email: String,
    pub password: String,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
}

/// Partial update of a user's own account
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub age: Option<i16>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub can_be_contacted: Option<bool>,
    pub can_data_be_shared: Option<bool>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewUser) -> Result<User, UserError> {
        let password_hash = hash_password(&new.password)?;

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users \
                (id, username, age, email, password_hash, can_be_contacted, can_data_be_shared, date_joined) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(new.age)
        .bind(&new.email)
        .bind(&password_hash)
        .bind(new.can_be_contacted)
        .bind(new.can_data_be_shared)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(UserError::Validation {
                    message: "A user with this email already exists.".to_string(),
                    field: Some(("email".to_string(), "Email already registered".to_string())),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, UserError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| UserError::Db(DbError::NotFound("User not found.".to_string())))
    }

    /// Paginated listing, ordered for stable page boundaries
    pub async fn list(&self, offset: i64) -> Result<(i64, Vec<User>), UserError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY date_joined, id LIMIT $1 OFFSET $2",
        )
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((count, users))
    }

    pub async fn update(&self, user_id: Uuid, changes: UserChanges) -> Result<User, UserError> {
        let current = self.get(user_id).await?;

        let password_hash = match &changes.password {
            Some(password) => hash_password(password)?,
            None => current.password_hash.clone(),
        };

        let result = sqlx::query_as::<_, User>(
            "UPDATE users SET \
                username = $2, age = $3, email = $4, password_hash = $5, \
                can_be_contacted = $6, can_data_be_shared = $7 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(user_id)
        .bind(changes.username.unwrap_or(current.username))
        .bind(changes.age.unwrap_or(current.age))
        .bind(changes.email.unwrap_or(current.email))
        .bind(&password_hash)
        .bind(changes.can_be_contacted.unwrap_or(current.can_be_contacted))
        .bind(changes.can_data_be_shared.unwrap_or(current.can_data_be_shared))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(UserError::Validation {
                    message: "A user with this email already exists.".to_string(),
                    field: Some(("email".to_string(), "Email already registered".to_string())),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn exists(&self, user_id: Uuid) -> Result<bool, UserError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Names of projects the user contributes to, for the redacted list view
    pub async fn contributed_project_names(&self, user_id: Uuid) -> Result<Vec<String>, UserError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT p.name FROM projects p \
             JOIN contributors c ON c.project_id = p.id \
             WHERE c.user_id = $1 \
             ORDER BY p.created_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Id+name references of contributed projects, for contact_info
    pub async fn contributed_projects(&self, user_id: Uuid) -> Result<Vec<ProjectRef>, UserError> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT p.id, p.name FROM projects p \
             JOIN contributors c ON c.project_id = p.id \
             WHERE c.user_id = $1 \
             ORDER BY p.created_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id, name)| ProjectRef { id, name }).collect())
    }
}

fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Hash(e.to_string()))
}

/// Constant-time verification against the stored PHC hash
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
