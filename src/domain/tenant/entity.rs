//! Tenant (workspace) entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_slug, validate_tenant_name, TenantValidationError};
use crate::domain::user::UserId;

/// Tenant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a string representation
    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(value)?))
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of professional practice the workspace hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantType {
    Doctor,
    Mentor,
    Freelancer,
    Teacher,
    Company,
}

impl TenantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Mentor => "mentor",
            Self::Freelancer => "freelancer",
            Self::Teacher => "teacher",
            Self::Company => "company",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "doctor" => Some(Self::Doctor),
            "mentor" => Some(Self::Mentor),
            "freelancer" => Some(Self::Freelancer),
            "teacher" => Some(Self::Teacher),
            "company" => Some(Self::Company),
            _ => None,
        }
    }
}

impl std::fmt::Display for TenantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rough size of the team the workspace expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSize {
    /// Single practitioner
    #[default]
    Solo,
    /// 2-10 people
    Small,
    /// 11-50 people
    Medium,
    /// 51+ people
    Large,
}

impl TeamSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "solo" => Some(Self::Solo),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            _ => None,
        }
    }
}

impl std::fmt::Display for TeamSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tenant (workspace) entity.
///
/// The slug is fixed at creation and never changes afterwards; workspaces
/// are deactivated rather than deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    id: TenantId,
    name: String,
    tenant_type: TenantType,
    slug: String,
    owner: UserId,
    team_size: TeamSize,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new active workspace with an already-derived slug
    pub fn new(
        name: impl Into<String>,
        tenant_type: TenantType,
        slug: impl Into<String>,
        owner: UserId,
        team_size: TeamSize,
    ) -> Result<Self, TenantValidationError> {
        let name = name.into();
        let slug = slug.into();

        validate_tenant_name(&name)?;
        validate_slug(&slug)?;

        Ok(Self {
            id: TenantId::new(),
            name,
            tenant_type,
            slug,
            owner,
            team_size,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    /// Rehydrate a tenant from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: TenantId,
        name: String,
        tenant_type: TenantType,
        slug: String,
        owner: UserId,
        team_size: TeamSize,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            tenant_type,
            slug,
            owner,
            team_size,
            is_active,
            created_at,
        }
    }

    pub fn id(&self) -> &TenantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tenant_type(&self) -> TenantType {
        self.tenant_type
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn team_size(&self) -> TeamSize {
        self.team_size
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Soft-delete the workspace
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Reactivate a deactivated workspace
    pub fn activate(&mut self) {
        self.is_active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant() -> Tenant {
        Tenant::new(
            "Acme Clinic",
            TenantType::Doctor,
            "acme-clinic",
            UserId::new(),
            TeamSize::Small,
        )
        .unwrap()
    }

    #[test]
    fn test_new_tenant_is_active() {
        let tenant = test_tenant();

        assert!(tenant.is_active());
        assert_eq!(tenant.name(), "Acme Clinic");
        assert_eq!(tenant.slug(), "acme-clinic");
        assert_eq!(tenant.tenant_type(), TenantType::Doctor);
        assert_eq!(tenant.team_size(), TeamSize::Small);
    }

    #[test]
    fn test_rejects_empty_name() {
        let result = Tenant::new(
            "",
            TenantType::Company,
            "slug",
            UserId::new(),
            TeamSize::Solo,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_slug() {
        let result = Tenant::new(
            "Acme",
            TenantType::Company,
            "Not A Slug",
            UserId::new(),
            TeamSize::Solo,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_deactivate_and_activate() {
        let mut tenant = test_tenant();

        tenant.deactivate();
        assert!(!tenant.is_active());

        tenant.activate();
        assert!(tenant.is_active());
    }

    #[test]
    fn test_tenant_type_round_trip() {
        for tt in [
            TenantType::Doctor,
            TenantType::Mentor,
            TenantType::Freelancer,
            TenantType::Teacher,
            TenantType::Company,
        ] {
            assert_eq!(TenantType::parse(tt.as_str()), Some(tt));
        }
        assert_eq!(TenantType::parse("plumber"), None);
    }

    #[test]
    fn test_team_size_round_trip() {
        for ts in [
            TeamSize::Solo,
            TeamSize::Small,
            TeamSize::Medium,
            TeamSize::Large,
        ] {
            assert_eq!(TeamSize::parse(ts.as_str()), Some(ts));
        }
        assert_eq!(TeamSize::parse("huge"), None);
    }
}
