// /users - account routes
//
// Listing and viewing other users goes through the privacy-redacted summary
// view; only the account owner sees the full detail view or may update it.
// Direct deletion is refused; accounts leave through the delete_account flow.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::account::{AccountService, DeletionChoice, DeletionOutcome};
use crate::api::format::{ContactInfo, Page, PageQuery, UserDetail, UserSummary};
use crate::database;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::{UserChanges, UserService};

const MIN_AGE: i64 = 18;
const MAX_AGE: i64 = 120;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub can_be_contacted: Option<bool>,
    pub can_data_be_shared: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeleteRequest {
    pub choice: DeletionChoice,
}

/// Either of the two User views, depending on who is asking
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserView {
    Detail(UserDetail),
    Summary(UserSummary),
}

/// GET /users - redacted list view, stable ordering for pagination
pub async fn list(
    Extension(_principal): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<UserSummary>> {
    let pool = database::pool().await?;
    let service = UserService::new(pool);

    let (count, users) = service.list(page.offset()).await?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        let names = if user.can_data_be_shared {
            service.contributed_project_names(user.id).await?
        } else {
            Vec::new()
        };
        results.push(UserSummary::new(&user, names));
    }

    Ok(ApiResponse::success(Page::new(count, page.page(), results)))
}

/// GET /users/:user - full view for the owner, redacted for everyone else
pub async fn retrieve(
    Extension(principal): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<UserView> {
    let pool = database::pool().await?;
    let service = UserService::new(pool);
    let user = service.get(user_id).await?;

    let view = if principal.user_id == user_id {
        UserView::Detail(UserDetail::from(user))
    } else {
        let names = if user.can_data_be_shared {
            service.contributed_project_names(user.id).await?
        } else {
            Vec::new()
        };
        UserView::Summary(UserSummary::new(&user, names))
    };

    Ok(ApiResponse::success(view))
}

/// PUT/PATCH /users/:user - owner only
pub async fn update(
    Extension(principal): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<UserDetail> {
    if principal.user_id != user_id {
        return Err(ApiError::forbidden("You may only update your own account."));
    }

    let changes = validate_changes(payload)?;

    let pool = database::pool().await?;
    let user = UserService::new(pool).update(user_id, changes).await?;

    Ok(ApiResponse::success(UserDetail::from(user)))
}

/// DELETE /users/:user is never allowed; deletion goes through the two-phase
/// delete_account flow
pub async fn destroy_rejected(
    Extension(_principal): Extension<AuthUser>,
    Path(_user_id): Path<Uuid>,
) -> ApiResult<()> {
    Err(ApiError::method_not_allowed(
        "Accounts cannot be deleted here; use the delete_account flow.",
    ))
}

/// GET /users/:user/contact_info - sections gated by the privacy flags
pub async fn contact_info(
    Extension(_principal): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<ContactInfo> {
    let pool = database::pool().await?;
    let service = UserService::new(pool);
    let user = service.get(user_id).await?;

    let contributed = if user.can_data_be_shared {
        service.contributed_projects(user.id).await?
    } else {
        Vec::new()
    };

    Ok(ApiResponse::success(ContactInfo::new(&user, contributed)))
}

/// DELETE /users/:user/delete_account - first call of the deletion flow.
/// An account with no authored content is removed on the spot; otherwise the
/// confirmation prompt comes back and nothing is deleted yet.
pub async fn delete_account(
    Extension(principal): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<DeletionOutcome> {
    if principal.user_id != user_id {
        return Err(ApiError::forbidden("You may only delete your own account."));
    }

    let pool = database::pool().await?;
    let outcome = AccountService::new(pool).request_deletion(principal.user_id).await?;

    Ok(ApiResponse::success(outcome))
}

/// POST /users/:user/confirm_delete_account - second call, carrying the
/// explicit choice
pub async fn confirm_delete_account(
    Extension(principal): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ConfirmDeleteRequest>,
) -> ApiResult<DeletionOutcome> {
    if principal.user_id != user_id {
        return Err(ApiError::forbidden("You may only delete your own account."));
    }

    let pool = database::pool().await?;
    let outcome =
        AccountService::new(pool).confirm_deletion(principal.user_id, payload.choice).await?;

    Ok(ApiResponse::success(outcome))
}

fn validate_changes(payload: UpdateUserRequest) -> Result<UserChanges, ApiError> {
    let mut field_errors: HashMap<String, String> = HashMap::new();

    let age = match payload.age {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Some(age as i16),
        Some(_) => {
            field_errors
                .insert("age".into(), format!("Age must be between {} and {}", MIN_AGE, MAX_AGE));
            None
        }
        None => None,
    };

    if let Some(ref email) = payload.email {
        if !email.contains('@') {
            field_errors.insert("email".into(), "Enter a valid email address".into());
        }
    }

    if let Some(ref password) = payload.password {
        if password.is_empty() {
            field_errors.insert("password".into(), "Password cannot be empty".into());
        }
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid account data", Some(field_errors)));
    }

    Ok(UserChanges {
        username: payload.username,
        age,
        email: payload.email,
        password: payload.password,
        can_be_contacted: payload.can_be_contacted,
        can_data_be_shared: payload.can_data_be_shared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_age_out_of_range_is_rejected() {
        let payload = UpdateUserRequest {
            username: None,
            age: Some(130),
            email: None,
            password: None,
            can_be_contacted: None,
            can_data_be_shared: None,
        };
        let err = validate_changes(payload).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn partial_update_passes_through_untouched_fields() {
        let payload = UpdateUserRequest {
            username: Some("new-name".into()),
            age: None,
            email: None,
            password: None,
            can_be_contacted: Some(false),
            can_data_be_shared: None,
        };
        let changes = validate_changes(payload).unwrap();
        assert_eq!(changes.username.as_deref(), Some("new-name"));
        assert!(changes.age.is_none());
        assert_eq!(changes.can_be_contacted, Some(false));
    }
}
