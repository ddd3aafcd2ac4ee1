//! Workspace endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::invitations;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::member::TenantMember;
use crate::domain::tenant::{TeamSize, Tenant, TenantType};
use crate::infrastructure::tenant::CreateTenantRequest;

/// Create the workspaces router
pub fn create_workspaces_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_workspace).get(list_workspaces))
        .route("/{slug}", get(get_workspace))
        .route("/{slug}/deactivate", post(deactivate_workspace))
        .route("/{slug}/members", get(list_members))
        .route(
            "/{slug}/invitations",
            post(invitations::invite).get(invitations::list_invitations),
        )
}

/// Request to create a workspace
#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceApiRequest {
    pub name: String,
    pub tenant_type: String,
    #[serde(default)]
    pub team_size: Option<String>,
}

/// Workspace response
#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub id: String,
    pub name: String,
    pub tenant_type: String,
    pub slug: String,
    pub team_size: String,
    pub is_active: bool,
    pub created_at: String,
    /// The caller's role in the workspace, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_role: Option<String>,
}

impl WorkspaceResponse {
    pub fn from_tenant(tenant: &Tenant, my_role: Option<&str>) -> Self {
        Self {
            id: tenant.id().to_string(),
            name: tenant.name().to_string(),
            tenant_type: tenant.tenant_type().to_string(),
            slug: tenant.slug().to_string(),
            team_size: tenant.team_size().to_string(),
            is_active: tenant.is_active(),
            created_at: tenant.created_at().to_rfc3339(),
            my_role: my_role.map(String::from),
        }
    }
}

/// Create workspace response
#[derive(Debug, Serialize)]
pub struct CreateWorkspaceResponse {
    pub message: String,
    pub workspace: WorkspaceResponse,
}

/// List workspaces response
#[derive(Debug, Serialize)]
pub struct ListWorkspacesResponse {
    pub workspaces: Vec<WorkspaceResponse>,
    pub total: usize,
}

/// Membership response
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub joined_at: String,
}

/// List members response
#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberResponse>,
    pub total: usize,
}

/// POST /workspaces
pub async fn create_workspace(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateWorkspaceApiRequest>,
) -> Result<(StatusCode, Json<CreateWorkspaceResponse>), ApiError> {
    debug!(name = %request.name, "Creating workspace");

    let tenant_type = TenantType::parse(&request.tenant_type)
        .ok_or_else(|| ApiError::bad_request("Unknown workspace type"))?;
    let team_size = match request.team_size.as_deref() {
        Some(raw) => {
            TeamSize::parse(raw).ok_or_else(|| ApiError::bad_request("Unknown team size"))?
        }
        None => TeamSize::default(),
    };

    let tenant = state
        .tenant_service
        .create(
            &user,
            CreateTenantRequest {
                name: request.name,
                tenant_type,
                team_size,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateWorkspaceResponse {
            message: "Workspace created successfully".to_string(),
            workspace: WorkspaceResponse::from_tenant(&tenant, Some("owner")),
        }),
    ))
}

/// GET /workspaces - workspaces the caller is an active member of
pub async fn list_workspaces(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ListWorkspacesResponse>, ApiError> {
    let tenants = state
        .tenant_service
        .list_for_member(user.id())
        .await
        .map_err(ApiError::from)?;

    let workspaces: Vec<WorkspaceResponse> = tenants
        .iter()
        .map(|t| WorkspaceResponse::from_tenant(&t.tenant, Some(t.role.as_str())))
        .collect();
    let total = workspaces.len();

    Ok(Json(ListWorkspacesResponse { workspaces, total }))
}

/// GET /workspaces/{slug}
pub async fn get_workspace(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    let tenant = state
        .tenant_service
        .get_by_slug(&slug)
        .await
        .map_err(ApiError::from)?;

    // the caller's role, when they are a member
    let my_role = state
        .tenant_service
        .list_for_member(user.id())
        .await
        .map_err(ApiError::from)?
        .into_iter()
        .find(|t| t.tenant.id() == tenant.id())
        .map(|t| t.role.as_str().to_string());

    Ok(Json(WorkspaceResponse::from_tenant(
        &tenant,
        my_role.as_deref(),
    )))
}

/// POST /workspaces/{slug}/deactivate - owner-only soft delete
pub async fn deactivate_workspace(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    debug!(slug = %slug, "Deactivating workspace");

    let tenant = state
        .tenant_service
        .deactivate(&slug, &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(WorkspaceResponse::from_tenant(&tenant, Some("owner"))))
}

/// GET /workspaces/{slug}/members
pub async fn list_members(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let members = state
        .tenant_service
        .list_members(&slug, &user)
        .await
        .map_err(ApiError::from)?;

    let mut responses = Vec::with_capacity(members.len());

    for member in &members {
        responses.push(member_response(&state, member).await?);
    }

    let total = responses.len();

    Ok(Json(ListMembersResponse {
        members: responses,
        total,
    }))
}

async fn member_response(
    state: &AppState,
    member: &TenantMember,
) -> Result<MemberResponse, ApiError> {
    let user = state
        .user_service
        .get(member.user_id())
        .await
        .map_err(ApiError::from)?;

    Ok(MemberResponse {
        id: member.id().to_string(),
        user_id: member.user_id().to_string(),
        username: user.as_ref().map(|u| u.username().to_string()),
        email: user.as_ref().map(|u| u.email().as_str().to_string()),
        role: member.role().to_string(),
        is_active: member.is_active(),
        joined_at: member.joined_at().to_rfc3339(),
    })
}
