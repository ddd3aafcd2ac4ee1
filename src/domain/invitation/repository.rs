//! Invitation repository trait
//!
//! `accept` and `reject` are single atomic operations: the implementations
//! take an exclusive lock on the invitation row before any check, so
//! concurrent calls on the same token serialize and the loser observes a
//! terminal status. The membership insert performed by `accept` happens in
//! the same transaction - "membership created" and "invitation accepted"
//! are never observably split.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{InvitationStatus, InviteToken, TenantInvitation};
use crate::domain::member::TenantMember;
use crate::domain::tenant::TenantId;
use crate::domain::user::User;
use crate::domain::{DomainError, Email};

/// Result of a successful atomic accept
#[derive(Debug, Clone)]
pub struct InvitationAccept {
    /// The invitation, now in `Accepted` status
    pub invitation: TenantInvitation,
    /// The caller's active membership in the workspace
    pub membership: TenantMember,
    /// False when the caller was already an active member and the accept
    /// only consumed the invitation
    pub membership_created: bool,
}

/// Repository for invitations
#[async_trait]
pub trait InvitationRepository: Send + Sync + std::fmt::Debug {
    /// Persist a new pending invitation. Fails with `Conflict` when a
    /// pending invitation for the same (tenant, email) pair already exists
    /// (the pending-scoped uniqueness constraint).
    async fn create(&self, invitation: TenantInvitation) -> Result<TenantInvitation, DomainError>;

    /// Look up a pending invitation by its token (read-only, used by the
    /// public validate flow)
    async fn find_pending_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<Option<TenantInvitation>, DomainError>;

    /// Look up the pending invitation for a (tenant, email) pair
    async fn find_pending(
        &self,
        tenant: &TenantId,
        email: &Email,
    ) -> Result<Option<TenantInvitation>, DomainError>;

    /// All invitations of a tenant, newest first, optionally filtered by
    /// status
    async fn list_for_tenant(
        &self,
        tenant: &TenantId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<TenantInvitation>, DomainError>;

    /// Atomically accept the invitation identified by `token` on behalf of
    /// `user`:
    ///
    /// 1. lock the invitation row; `NotFound` when no row matches
    /// 2. past-deadline pending rows transition to `Expired` (persisted even
    ///    though the call fails with `Expired`)
    /// 3. non-pending rows fail with `AlreadyProcessed`
    /// 4. an email mismatch fails with `Forbidden` and leaves the row
    ///    untouched, so the legitimate holder can still accept
    /// 5. the membership is created unless an active one already exists
    /// 6. the invitation transitions to `Accepted`
    async fn accept(
        &self,
        token: &InviteToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<InvitationAccept, DomainError>;

    /// Atomically reject the invitation identified by `token`. Same lock
    /// and guards as `accept`, but only flips the status - no membership
    /// logic.
    async fn reject(
        &self,
        token: &InviteToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<TenantInvitation, DomainError>;

    /// Bulk-transition pending invitations past their deadline to
    /// `Expired`. Returns the number of rows touched. Opportunistic only -
    /// lazy expiry in `accept`/`reject` keeps the protocol correct without
    /// it.
    async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
