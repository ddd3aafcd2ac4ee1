//! Tenant membership entity and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tenant::TenantId;
use crate::domain::user::UserId;

/// Membership row identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user within a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Workspace owner - fixed at creation, full control
    Owner,
    /// Can manage members and send invitations
    Admin,
    /// Practicing member of the workspace
    #[default]
    Professional,
}

impl MemberRole {
    /// Whether this role can manage members and send invitations
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Professional => "professional",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "professional" => Some(Self::Professional),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership of a user in a workspace.
///
/// At most one active row may exist per (tenant, user) pair; removal is
/// modeled as deactivation, never deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantMember {
    id: MemberId,
    tenant_id: TenantId,
    user_id: UserId,
    role: MemberRole,
    is_active: bool,
    joined_at: DateTime<Utc>,
    invited_by: Option<UserId>,
}

impl TenantMember {
    /// Create a new active membership
    pub fn new(
        tenant_id: TenantId,
        user_id: UserId,
        role: MemberRole,
        invited_by: Option<UserId>,
    ) -> Self {
        Self {
            id: MemberId::new(),
            tenant_id,
            user_id,
            role,
            is_active: true,
            joined_at: Utc::now(),
            invited_by,
        }
    }

    /// Rehydrate a membership from storage
    pub fn from_storage(
        id: MemberId,
        tenant_id: TenantId,
        user_id: UserId,
        role: MemberRole,
        is_active: bool,
        joined_at: DateTime<Utc>,
        invited_by: Option<UserId>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            user_id,
            role,
            is_active,
            joined_at,
            invited_by,
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> MemberRole {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn invited_by(&self) -> Option<&UserId> {
        self.invited_by.as_ref()
    }

    /// Remove the member from the workspace (soft)
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
