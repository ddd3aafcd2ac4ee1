//! Tenant repository trait

use async_trait::async_trait;

use super::entity::{Tenant, TenantId};
use crate::domain::member::TenantMember;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for workspaces
#[async_trait]
pub trait TenantRepository: Send + Sync + std::fmt::Debug {
    /// Get a workspace by ID
    async fn get(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError>;

    /// Get a workspace by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError>;

    /// Create a workspace together with its OWNER membership row in one
    /// atomic unit. Fails with `Conflict` when the slug is already taken,
    /// which callers use to retry with the next collision suffix.
    async fn create_with_owner(
        &self,
        tenant: Tenant,
        owner_member: TenantMember,
    ) -> Result<Tenant, DomainError>;

    /// Update an existing workspace
    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError>;

    /// Workspaces where the user holds an active membership
    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Tenant>, DomainError>;
}
