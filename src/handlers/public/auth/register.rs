// POST /users/register - create a new account

use axum::Json;
use serde::Deserialize;
use std::collections::HashMap;

use crate::api::format::UserDetail;
use crate::database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{NewUser, UserService};

const MIN_AGE: i64 = 18;
const MAX_AGE: i64 = 120;

/// Registration payload. Fields are optional at the wire level so missing
/// ones surface as per-field validation errors rather than a decode failure.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub can_be_contacted: Option<bool>,
    pub can_data_be_shared: Option<bool>,
}

pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<UserDetail> {
    // All field validation happens before any store access
    let new_user = validate(payload)?;

    let pool = database::pool().await?;
    let user = UserService::new(pool).create(new_user).await?;

    Ok(ApiResponse::created(UserDetail::from(user)))
}

fn validate(payload: RegisterRequest) -> Result<NewUser, ApiError> {
    let mut field_errors: HashMap<String, String> = HashMap::new();

    let username = match payload.username {
        Some(ref u) if !u.trim().is_empty() => u.trim().to_string(),
        _ => {
            field_errors.insert("username".into(), "This field is required".into());
            String::new()
        }
    };

    let age = match payload.age {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => age as i16,
        Some(_) => {
            field_errors
                .insert("age".into(), format!("Age must be between {} and {}", MIN_AGE, MAX_AGE));
            0
        }
        None => {
            field_errors.insert("age".into(), "This field is required".into());
            0
        }
    };

    let email = match payload.email {
        Some(ref e) if e.contains('@') && !e.trim().is_empty() => e.trim().to_string(),
        Some(_) => {
            field_errors.insert("email".into(), "Enter a valid email address".into());
            String::new()
        }
        None => {
            field_errors.insert("email".into(), "This field is required".into());
            String::new()
        }
    };

    let password = match payload.password {
        Some(ref p) if !p.is_empty() => p.clone(),
        _ => {
            field_errors.insert("password".into(), "This field is required".into());
            String::new()
        }
    };

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid registration data", Some(field_errors)));
    }

    Ok(NewUser {
        username,
        age,
        email,
        password,
        can_be_contacted: payload.can_be_contacted.unwrap_or(true),
        can_data_be_shared: payload.can_data_be_shared.unwrap_or(false),
    })
}
