// /projects - collection and detail routes
//
// Listing is filtered to the principal's memberships and never errors; the
// detail route denies outsiders outright. Writes belong to the author alone.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::{self, scope::ScopeResolver, Action};
use crate::api::format::{Page, PageQuery};
use crate::database::{self, models::{Project, ProjectType}};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::project_service::{ProjectChanges, ProjectService};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub project_type: ProjectType,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
}

/// GET /projects - projects the principal contributes to
pub async fn list(
    Extension(principal): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Project>> {
    let pool = database::pool().await?;
    let (count, results) =
        ProjectService::new(pool).list_for(principal.user_id, page.offset()).await?;

    Ok(ApiResponse::success(Page::new(count, page.page(), results)))
}

/// POST /projects - create a project; the principal becomes author and its
/// first contributor
pub async fn create(
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    let pool = database::pool().await?;
    let project = ProjectService::new(pool)
        .create(principal.user_id, payload.name, payload.description, payload.project_type)
        .await?;

    Ok(ApiResponse::created(project))
}

/// GET /projects/:project
pub async fn retrieve(
    Extension(principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Project> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "details")
        .await?;

    let project = ProjectService::new(pool).get(project_id).await?;
    Ok(ApiResponse::success(project))
}

/// PUT/PATCH /projects/:project - author only
pub async fn update(
    Extension(principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Project> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "details")
        .await?;

    let service = ProjectService::new(pool);
    let project = service.get(project_id).await?;
    access::evaluate(Action::Update, principal.user_id, project.author, true).into_result()?;

    let updated = service
        .update(
            project_id,
            ProjectChanges {
                name: payload.name,
                description: payload.description,
                project_type: payload.project_type,
            },
        )
        .await?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /projects/:project - author only; contributors, issues and comments
/// are removed with it
pub async fn destroy(
    Extension(principal): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = database::pool().await?;
    ScopeResolver::new(&pool)
        .require_project_member(principal.user_id, project_id, "details")
        .await?;

    let service = ProjectService::new(pool);
    let project = service.get(project_id).await?;
    access::evaluate(Action::Delete, principal.user_id, project.author, true).into_result()?;

    service.delete(project_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
