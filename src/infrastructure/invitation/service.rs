//! Invitation engine service
//!
//! Orchestrates the invitation lifecycle over the repository traits:
//! creation with its idempotent already-pending outcome, the public
//! validate preview, and the accept/reject protocols whose atomic parts
//! live in the repository implementations.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::domain::invitation::{
    InvitationAccept, InvitationRepository, InvitationStatus, InviteToken, TenantInvitation,
};
use crate::domain::member::{MemberRepository, MemberRole};
use crate::domain::tenant::{TenantRepository, Tenant};
use crate::domain::user::{User, UserRepository};
use crate::domain::{DomainError, Email};

/// Configuration for invitations
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// Number of days until an invitation expires
    pub expiry_days: i64,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self { expiry_days: 7 }
    }
}

/// Request for creating an invitation
#[derive(Debug, Clone)]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: MemberRole,
}

/// Outcome of `create`: a fresh invitation, or the existing pending one
/// returned idempotently
#[derive(Debug, Clone)]
pub enum InvitationCreation {
    Created(TenantInvitation),
    AlreadyPending(TenantInvitation),
}

impl InvitationCreation {
    pub fn invitation(&self) -> &TenantInvitation {
        match self {
            Self::Created(i) | Self::AlreadyPending(i) => i,
        }
    }
}

/// Read-only preview of a pending invitation, for the public validate flow
#[derive(Debug, Clone)]
pub struct InvitationPreview {
    pub tenant_name: String,
    pub email: Email,
    pub role: MemberRole,
}

/// The invitation engine
#[derive(Debug)]
pub struct InvitationService<I, M, T, U>
where
    I: InvitationRepository,
    M: MemberRepository,
    T: TenantRepository,
    U: UserRepository,
{
    invitations: Arc<I>,
    members: Arc<M>,
    tenants: Arc<T>,
    users: Arc<U>,
    config: InvitationConfig,
}

impl<I, M, T, U> InvitationService<I, M, T, U>
where
    I: InvitationRepository,
    M: MemberRepository,
    T: TenantRepository,
    U: UserRepository,
{
    pub fn new(invitations: Arc<I>, members: Arc<M>, tenants: Arc<T>, users: Arc<U>) -> Self {
        Self::with_config(
            invitations,
            members,
            tenants,
            users,
            InvitationConfig::default(),
        )
    }

    pub fn with_config(
        invitations: Arc<I>,
        members: Arc<M>,
        tenants: Arc<T>,
        users: Arc<U>,
        config: InvitationConfig,
    ) -> Self {
        Self {
            invitations,
            members,
            tenants,
            users,
            config,
        }
    }

    /// Invite an email address to the workspace identified by `slug`.
    ///
    /// The inviter must be an active member whose role can manage members;
    /// `invited_by` is always derived from the authenticated inviter, never
    /// from the request. When a pending invitation for the pair already
    /// exists - including when a concurrent request wins the insert race -
    /// it is returned idempotently instead of creating a duplicate.
    pub async fn create(
        &self,
        slug: &str,
        inviter: &User,
        request: CreateInvitationRequest,
    ) -> Result<InvitationCreation, DomainError> {
        let tenant = self.active_tenant(slug).await?;

        let inviter_member = self
            .members
            .get_active(tenant.id(), inviter.id())
            .await?
            .ok_or_else(|| {
                DomainError::forbidden("Only workspace members can send invitations")
            })?;

        if !inviter_member.role().can_manage_members() {
            return Err(DomainError::forbidden(
                "Your role cannot send invitations",
            ));
        }

        if request.role == MemberRole::Owner {
            return Err(DomainError::validation(
                "Cannot invite a user as the workspace owner",
            ));
        }

        let email =
            Email::parse(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;

        // no invitation for someone who already holds an active membership
        if let Some(existing_user) = self.users.get_by_email(&email).await? {
            if self
                .members
                .has_active_member(tenant.id(), existing_user.id())
                .await?
            {
                return Err(DomainError::already_member("User is already a member"));
            }
        }

        if let Some(pending) = self.invitations.find_pending(tenant.id(), &email).await? {
            return Ok(InvitationCreation::AlreadyPending(pending));
        }

        let invitation = TenantInvitation::new(
            *tenant.id(),
            email.clone(),
            request.role,
            *inviter.id(),
            Duration::days(self.config.expiry_days),
        );

        match self.invitations.create(invitation).await {
            Ok(created) => {
                info!(
                    tenant = %tenant.slug(),
                    email = %created.email(),
                    "Invitation created"
                );
                Ok(InvitationCreation::Created(created))
            }
            // lost the pending-uniqueness race: return the winner's row
            Err(DomainError::Conflict { .. }) => self
                .invitations
                .find_pending(tenant.id(), &email)
                .await?
                .map(InvitationCreation::AlreadyPending)
                .ok_or_else(|| {
                    DomainError::conflict("A pending invitation already exists for this email")
                }),
            Err(e) => Err(e),
        }
    }

    /// Public, unauthenticated preview of a pending invitation.
    ///
    /// Wrong tokens and expired invitations are deliberately
    /// indistinguishable; nothing is mutated here.
    pub async fn validate(&self, token: &str) -> Result<InvitationPreview, DomainError> {
        let invalid = || DomainError::not_found("Invalid or expired invitation");

        let token = InviteToken::parse(token).map_err(|_| invalid())?;

        let invitation = self
            .invitations
            .find_pending_by_token(&token)
            .await?
            .ok_or_else(invalid)?;

        if invitation.is_expired_at(Utc::now()) {
            return Err(invalid());
        }

        let tenant = self
            .tenants
            .get(invitation.tenant_id())
            .await?
            .ok_or_else(invalid)?;

        Ok(InvitationPreview {
            tenant_name: tenant.name().to_string(),
            email: invitation.email().clone(),
            role: invitation.role(),
        })
    }

    /// Accept the invitation identified by `token` on behalf of the
    /// authenticated `user`. The whole protocol runs atomically in the
    /// repository; see `InvitationRepository::accept`.
    pub async fn accept(
        &self,
        token: &str,
        user: &User,
    ) -> Result<InvitationAccept, DomainError> {
        let token = InviteToken::parse(token)
            .map_err(|_| DomainError::not_found("Invitation not found"))?;

        let outcome = self.invitations.accept(&token, user, Utc::now()).await?;

        info!(
            tenant = %outcome.membership.tenant_id(),
            user = %user.id(),
            membership_created = outcome.membership_created,
            "Invitation accepted"
        );

        Ok(outcome)
    }

    /// Reject the invitation identified by `token`. Flips the status only;
    /// same lock and guards as accept.
    pub async fn reject(
        &self,
        token: &str,
        user: &User,
    ) -> Result<TenantInvitation, DomainError> {
        let token = InviteToken::parse(token)
            .map_err(|_| DomainError::not_found("Invitation not found"))?;

        let invitation = self.invitations.reject(&token, user, Utc::now()).await?;

        info!(
            tenant = %invitation.tenant_id(),
            user = %user.id(),
            "Invitation rejected"
        );

        Ok(invitation)
    }

    /// Invitations of a workspace, for members who can manage members
    pub async fn list_for_tenant(
        &self,
        slug: &str,
        caller: &User,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<TenantInvitation>, DomainError> {
        let tenant = self
            .tenants
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Workspace '{}' not found", slug)))?;

        let caller_member = self
            .members
            .get_active(tenant.id(), caller.id())
            .await?
            .ok_or_else(|| {
                DomainError::forbidden("Only workspace members can list invitations")
            })?;

        if !caller_member.role().can_manage_members() {
            return Err(DomainError::forbidden(
                "Your role cannot list invitations",
            ));
        }

        self.invitations.list_for_tenant(tenant.id(), status).await
    }

    /// Opportunistic bulk expiry of overdue pending invitations. Lazy
    /// expiry on accept/reject keeps the protocol correct without this.
    pub async fn sweep_expired(&self) -> Result<u64, DomainError> {
        let count = self.invitations.expire_stale(Utc::now()).await?;

        if count > 0 {
            info!(count, "Expired stale invitations");
        }

        Ok(count)
    }

    async fn active_tenant(&self, slug: &str) -> Result<Tenant, DomainError> {
        let tenant = self
            .tenants
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Workspace '{}' not found", slug)))?;

        if !tenant.is_active() {
            return Err(DomainError::validation("Workspace is deactivated"));
        }

        Ok(tenant)
    }
}
