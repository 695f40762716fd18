// /projects/:project/contributors - membership management
//
// Listing and creating contributors is open to any authenticated principal;
// membership only gates the nested issue/comment routes, not these.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::access::scope::ScopeResolver;
use crate::api::format::{Page, PageQuery};
use crate::database::{self, models::Contributor};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::project_service::ProjectService;
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
pub struct CreateContributorRequest {
    pub user: Uuid,
    #[serde(default)]
    pub author: bool,
}

/// GET /projects/:project/contributors
pub async fn list(
    Extension(_principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Contributor>> {
    let pool = database::pool().await?;
    let (count, results) = ProjectService::new(pool).contributors(project_id, page.offset()).await?;

    Ok(ApiResponse::success(Page::new(count, page.page(), results)))
}

/// POST /projects/:project/contributors - add the user named in the body.
/// Duplicate membership is a validation error, checked before the insert and
/// backstopped by the store's unique constraint.
pub async fn create(
    Extension(_principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateContributorRequest>,
) -> ApiResult<Contributor> {
    let pool = database::pool().await?;

    let service = ProjectService::new(pool.clone());
    // Parent must exist before anything else
    service.get(project_id).await?;

    if !UserService::new(pool.clone()).exists(payload.user).await? {
        let mut field_errors = HashMap::new();
        field_errors.insert("user".to_string(), "Unknown user".to_string());
        return Err(ApiError::validation_error("Invalid contributor data", Some(field_errors)));
    }

    ScopeResolver::new(&pool).require_not_contributor(payload.user, project_id).await?;

    let contributor = service.add_contributor(project_id, payload.user, payload.author).await?;
    Ok(ApiResponse::created(contributor))
}

/// DELETE /projects/:project/contributors/:contributor
pub async fn destroy(
    Extension(_principal): Extension<AuthUser>,
    Path((project_id, contributor_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let pool = database::pool().await?;
    ProjectService::new(pool).remove_contributor(project_id, contributor_id).await?;

    Ok(ApiResponse::<()>::no_content())
}
