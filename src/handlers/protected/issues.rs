// /projects/:project/issues - nested issue routes
//
// Every route requires contributor standing on the path project. The owning
// project and the author are taken from the path and the principal; the body
// never carries parent linkage.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::{self, scope::ScopeResolver, Action};
use crate::api::format::{Page, PageQuery};
use crate::database::{
    self,
    models::{Issue, IssuePriority, IssueStatus, IssueTag},
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::issue_service::{IssueChanges, IssueService, NewIssue};

#[derive(Debug, Deserialize)]
pub struct CreateIssueRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub priority: IssuePriority,
    #[serde(default)]
    pub tag: IssueTag,
    #[serde(default)]
    pub status: IssueStatus,
    pub attribution: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIssueRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<IssuePriority>,
    pub tag: Option<IssueTag>,
    pub status: Option<IssueStatus>,
    pub attribution: Option<Uuid>,
}

/// GET /projects/:project/issues
pub async fn list(
    Extension(principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Issue>> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "issues")
        .await?;

    let (count, results) = IssueService::new(pool).list(project_id, page.offset()).await?;
    Ok(ApiResponse::success(Page::new(count, page.page(), results)))
}

/// POST /projects/:project/issues - the assignee must already be a contributor
pub async fn create(
    Extension(principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateIssueRequest>,
) -> ApiResult<Issue> {
    let pool = database::pool().await?;
    let scope = ScopeResolver::new(&pool);
    scope.require_project_member(principal.user_id, project_id, "issues").await?;
    scope.require_attribution_contributor(payload.attribution, project_id).await?;

    let issue = IssueService::new(pool)
        .create(
            project_id,
            principal.user_id,
            NewIssue {
                name: payload.name,
                description: payload.description,
                priority: payload.priority,
                tag: payload.tag,
                status: payload.status,
                attribution: payload.attribution,
            },
        )
        .await?;

    Ok(ApiResponse::created(issue))
}

/// GET /projects/:project/issues/:issue
pub async fn retrieve(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Issue> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "issues")
        .await?;

    let issue = IssueService::new(pool).get(project_id, issue_id).await?;
    Ok(ApiResponse::success(issue))
}

/// PUT/PATCH /projects/:project/issues/:issue - author only; a reassignment
/// is validated against project membership like a fresh assignment
pub async fn update(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateIssueRequest>,
) -> ApiResult<Issue> {
    let pool = database::pool().await?;
    let scope = ScopeResolver::new(&pool);
    scope.require_project_member(principal.user_id, project_id, "issues").await?;

    let service = IssueService::new(pool.clone());
    let issue = service.get(project_id, issue_id).await?;
    access::evaluate(Action::Update, principal.user_id, issue.author, true).into_result()?;

    if let Some(attribution) = payload.attribution {
        scope.require_attribution_contributor(attribution, project_id).await?;
    }

    let updated = service
        .update(
            project_id,
            issue_id,
            IssueChanges {
                name: payload.name,
                description: payload.description,
                priority: payload.priority,
                tag: payload.tag,
                status: payload.status,
                attribution: payload.attribution,
            },
        )
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /projects/:project/issues/:issue - author only
pub async fn destroy(
    Extension(principal): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "issues")
        .await?;

    let service = IssueService::new(pool);
    let issue = service.get(project_id, issue_id).await?;
    access::evaluate(Action::Delete, principal.user_id, issue.author, true).into_result()?;

    service.delete(project_id, issue_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
