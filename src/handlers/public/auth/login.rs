// POST /users/login - exchange email+password for an access/refresh pair

use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{self, UserService};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Short user summary returned alongside the tokens
#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub username: String,
    pub email: String,
    pub age: i16,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh: String,
    pub user_details: UserDetails,
}

pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(ApiError::validation_error("Email and password are required.", None));
        }
    };

    let pool = database::pool().await?;
    let service = UserService::new(pool);

    // Unknown email and wrong password are indistinguishable to the caller
    let user = service
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password."))?;

    if !user_service::verify_password(&user.password_hash, &password) {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let pair = auth::generate_token_pair(&user)?;

    Ok(ApiResponse::success(LoginResponse {
        token: pair.token,
        refresh: pair.refresh,
        user_details: UserDetails {
            username: user.username,
            email: user.email,
            age: user.age,
            date_joined: user.date_joined,
        },
    }))
}
