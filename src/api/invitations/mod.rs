//! Invitation endpoints
//!
//! The token is the only identifier clients ever present; internal ids
//! never appear in accept/validate flows.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::invitation::{InvitationStatus, TenantInvitation};
use crate::domain::member::MemberRole;
use crate::domain::DomainError;
use crate::infrastructure::invitation::{CreateInvitationRequest, InvitationCreation};

/// Create the token-based invitation router (validate/accept/reject)
pub fn create_invitations_router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate))
        .route("/accept", post(accept))
        .route("/reject", post(reject))
}

/// Request to invite an email to a workspace
#[derive(Debug, Deserialize)]
pub struct InviteApiRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Request carrying an invitation token
#[derive(Debug, Deserialize)]
pub struct TokenApiRequest {
    pub token: String,
}

/// Status filter for listing invitations
#[derive(Debug, Deserialize)]
pub struct InvitationListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Invitation response
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status: String,
    /// Only exposed to the inviting context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub created_at: String,
    pub expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
}

impl InvitationResponse {
    fn from_invitation(invitation: &TenantInvitation, include_token: bool) -> Self {
        Self {
            id: invitation.id().to_string(),
            email: invitation.email().as_str().to_string(),
            role: invitation.role().to_string(),
            status: invitation.status().to_string(),
            token: include_token.then(|| invitation.token().to_string()),
            created_at: invitation.created_at().to_rfc3339(),
            expires_at: invitation.expires_at().to_rfc3339(),
            accepted_at: invitation.accepted_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Invite creation response
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub detail: String,
    pub invitation: InvitationResponse,
}

/// List invitations response
#[derive(Debug, Serialize)]
pub struct ListInvitationsResponse {
    pub invitations: Vec<InvitationResponse>,
    pub total: usize,
}

/// Validation response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Accept response
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub detail: String,
    pub workspace_id: String,
    pub role: String,
    pub joined_at: String,
}

/// Reject response
#[derive(Debug, Serialize)]
pub struct RejectResponse {
    pub detail: String,
}

/// POST /workspaces/{slug}/invitations
pub async fn invite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
    Json(request): Json<InviteApiRequest>,
) -> Result<Response, ApiError> {
    debug!(slug = %slug, "Creating invitation");

    let role = match request.role.as_deref() {
        Some(raw) => MemberRole::parse(raw).ok_or_else(|| ApiError::bad_request("Unknown role"))?,
        None => MemberRole::Professional,
    };

    let creation = state
        .invitation_service
        .create(
            &slug,
            &user,
            CreateInvitationRequest {
                email: request.email,
                role,
            },
        )
        .await
        .map_err(ApiError::from)?;

    let response = match creation {
        InvitationCreation::Created(invitation) => (
            StatusCode::CREATED,
            Json(InviteResponse {
                detail: "Invitation sent successfully.".to_string(),
                invitation: InvitationResponse::from_invitation(&invitation, true),
            }),
        ),
        InvitationCreation::AlreadyPending(invitation) => (
            StatusCode::OK,
            Json(InviteResponse {
                detail: "Pending invitation already exists.".to_string(),
                invitation: InvitationResponse::from_invitation(&invitation, true),
            }),
        ),
    };

    Ok(response.into_response())
}

/// GET /workspaces/{slug}/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
    Query(query): Query<InvitationListQuery>,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            InvitationStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request("Unknown invitation status"))?,
        ),
        None => None,
    };

    let invitations = state
        .invitation_service
        .list_for_tenant(&slug, &user, status)
        .await
        .map_err(ApiError::from)?;

    let responses: Vec<InvitationResponse> = invitations
        .iter()
        .map(|i| InvitationResponse::from_invitation(i, false))
        .collect();
    let total = responses.len();

    Ok(Json(ListInvitationsResponse {
        invitations: responses,
        total,
    }))
}

/// POST /invitations/validate - public preview of a pending invitation
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<TokenApiRequest>,
) -> Result<Response, ApiError> {
    match state.invitation_service.validate(&request.token).await {
        Ok(preview) => Ok(Json(ValidateResponse {
            valid: true,
            workspace: Some(preview.tenant_name),
            email: Some(preview.email.as_str().to_string()),
            role: Some(preview.role.to_string()),
            detail: None,
        })
        .into_response()),
        // wrong token and expired are deliberately indistinguishable
        Err(DomainError::NotFound { .. }) => Ok((
            StatusCode::BAD_REQUEST,
            Json(ValidateResponse {
                valid: false,
                workspace: None,
                email: None,
                role: None,
                detail: Some("Invalid or expired invitation.".to_string()),
            }),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// POST /invitations/accept
pub async fn accept(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<TokenApiRequest>,
) -> Result<Json<AcceptResponse>, ApiError> {
    let outcome = state
        .invitation_service
        .accept(&request.token, &user)
        .await
        .map_err(ApiError::from)?;

    let detail = if outcome.membership_created {
        "Invitation accepted successfully."
    } else {
        "You are already a member."
    };

    Ok(Json(AcceptResponse {
        detail: detail.to_string(),
        workspace_id: outcome.membership.tenant_id().to_string(),
        role: outcome.membership.role().to_string(),
        joined_at: outcome.membership.joined_at().to_rfc3339(),
    }))
}

/// POST /invitations/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<TokenApiRequest>,
) -> Result<Json<RejectResponse>, ApiError> {
    state
        .invitation_service
        .reject(&request.token, &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(RejectResponse {
        detail: "Invitation rejected.".to_string(),
    }))
}
