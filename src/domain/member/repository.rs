//! Membership ledger trait

use async_trait::async_trait;

use super::entity::TenantMember;
use crate::domain::tenant::TenantId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for workspace memberships.
///
/// The active-pair uniqueness invariant is enforced here at the storage
/// level (a partial unique index in Postgres, the store mutex in memory),
/// independent of any caller-side idempotency checks.
#[async_trait]
pub trait MemberRepository: Send + Sync + std::fmt::Debug {
    /// Get the active membership for a (tenant, user) pair
    async fn get_active(
        &self,
        tenant: &TenantId,
        user: &UserId,
    ) -> Result<Option<TenantMember>, DomainError>;

    /// Whether the user holds an active membership in the tenant
    async fn has_active_member(
        &self,
        tenant: &TenantId,
        user: &UserId,
    ) -> Result<bool, DomainError>;

    /// Add a membership row. Fails with `Conflict` when an active row for
    /// the (tenant, user) pair already exists.
    async fn create(&self, member: TenantMember) -> Result<TenantMember, DomainError>;

    /// All membership rows of a tenant, active first, oldest first
    async fn list_for_tenant(&self, tenant: &TenantId) -> Result<Vec<TenantMember>, DomainError>;

    /// Deactivate the active membership for a (tenant, user) pair.
    /// Returns false when no active row existed.
    async fn deactivate(&self, tenant: &TenantId, user: &UserId) -> Result<bool, DomainError>;
}
