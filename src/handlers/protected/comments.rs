// /projects/:project/issues/:issue/comments - nested comment routes
//
// Contributor standing on the path project gates every route. On create the
// issue/project pair from the path is re-verified before anything is written.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::{self, scope::ScopeResolver, Action};
use crate::api::format::{Page, PageQuery};
use crate::database::{self, models::Comment};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::comment_service::CommentService;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub description: String,
}

/// GET /projects/:project/issues/:issue/comments
pub async fn list(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Comment>> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "comments")
        .await?;

    let (count, results) =
        CommentService::new(pool).list(project_id, issue_id, page.offset()).await?;
    Ok(ApiResponse::success(Page::new(count, page.page(), results)))
}

/// POST /projects/:project/issues/:issue/comments - a fresh external id is
/// generated for every comment
pub async fn create(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Comment> {
    let pool = database::pool().await?;
    let scope = ScopeResolver::new(&pool);
    scope.require_project_member(principal.user_id, project_id, "comments").await?;
    scope.require_issue_in_project(project_id, issue_id).await?;

    let comment =
        CommentService::new(pool).create(issue_id, principal.user_id, payload.description).await?;

    Ok(ApiResponse::created(comment))
}

/// GET /projects/:project/issues/:issue/comments/:comment
pub async fn retrieve(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Comment> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "comments")
        .await?;

    let comment = CommentService::new(pool).get(project_id, issue_id, comment_id).await?;
    Ok(ApiResponse::success(comment))
}

/// PUT/PATCH /projects/:project/issues/:issue/comments/:comment - author only
pub async fn update(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> ApiResult<Comment> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "comments")
        .await?;

    let service = CommentService::new(pool);
    let comment = service.get(project_id, issue_id, comment_id).await?;
    access::evaluate(Action::Update, principal.user_id, comment.author, true).into_result()?;

    let updated =
        service.update(project_id, issue_id, comment_id, payload.description).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /projects/:project/issues/:issue/comments/:comment - author only
pub async fn destroy(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<()> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "comments")
        .await?;

    let service = CommentService::new(pool);
    let comment = service.get(project_id, issue_id, comment_id).await?;
    access::evaluate(Action::Delete, principal.user_id, comment.author, true).into_result()?;

    service.delete(project_id, issue_id, comment_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
