//! Authentication endpoints: register, login, refresh, me

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::api::workspaces::WorkspaceResponse;
use crate::domain::tenant::{TeamSize, TenantType};
use crate::domain::user::{User, UserId};
use crate::infrastructure::tenant::CreateTenantRequest;
use crate::infrastructure::user::RegisterUserRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(get_current_user))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    /// Optionally create a workspace owned by the new user
    #[serde(default)]
    pub workspace: Option<RegisterWorkspaceRequest>,
}

/// Inline workspace creation at registration
#[derive(Debug, Deserialize)]
pub struct RegisterWorkspaceRequest {
    pub name: String,
    pub tenant_type: String,
    #[serde(default)]
    pub team_size: Option<String>,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceResponse>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
    pub expires_at: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
    pub refresh: String,
    pub expires_at: String,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().as_str().to_string(),
            full_name: user.full_name().to_string(),
            is_active: user.is_active(),
            created_at: user.created_at().to_rfc3339(),
            last_login_at: user.last_login_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Register a new account, optionally with a workspace
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterUserRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            full_name: request.full_name,
        })
        .await
        .map_err(ApiError::from)?;

    let workspace = match request.workspace {
        Some(ws) => {
            let tenant_type = TenantType::parse(&ws.tenant_type)
                .ok_or_else(|| ApiError::bad_request("Unknown workspace type"))?;
            let team_size = match ws.team_size.as_deref() {
                Some(raw) => TeamSize::parse(raw)
                    .ok_or_else(|| ApiError::bad_request("Unknown team size"))?,
                None => TeamSize::default(),
            };

            let tenant = state
                .tenant_service
                .create(
                    &user,
                    CreateTenantRequest {
                        name: ws.name,
                        tenant_type,
                        team_size,
                    },
                )
                .await
                .map_err(ApiError::from)?;

            Some(WorkspaceResponse::from_tenant(&tenant, Some("owner")))
        }
        None => None,
    };

    let pair = state.jwt_service.issue_pair(&user).map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            access: pair.access,
            refresh: pair.refresh,
            user: UserResponse::from_user(&user),
            workspace,
        }),
    ))
}

/// Login with username and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let pair = state.jwt_service.issue_pair(&user).map_err(ApiError::from)?;
    let expires_at =
        Utc::now() + Duration::hours(state.jwt_service.access_expiration_hours() as i64);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access: pair.access,
        refresh: pair.refresh,
        user: UserResponse::from_user(&user),
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// Exchange a refresh token for a fresh pair
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let claims = state
        .jwt_service
        .validate_refresh(&request.refresh)
        .map_err(|e| ApiError::unauthorized(format!("Invalid refresh token: {}", e)))?;

    let user_id = UserId::parse(claims.user_id())
        .map_err(|_| ApiError::unauthorized("Invalid token subject"))?;

    let user = state
        .user_service
        .get(&user_id)
        .await
        .map_err(ApiError::from)?
        .filter(|u| u.is_active())
        .ok_or_else(|| ApiError::unauthorized("User not found or suspended"))?;

    let pair = state.jwt_service.issue_pair(&user).map_err(ApiError::from)?;
    let expires_at =
        Utc::now() + Duration::hours(state.jwt_service.access_expiration_hours() as i64);

    Ok(Json(RefreshResponse {
        access: pair.access,
        refresh: pair.refresh,
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// Get the current authenticated user
///
/// GET /auth/me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from_user(&user)))
}
