//! In-memory invitation repository
//!
//! The store-wide mutex makes every operation - including the multi-row
//! accept - atomic, mirroring the transaction + row lock the Postgres
//! backend uses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::invitation::{
    InvitationAccept, InvitationRepository, InvitationStatus, InviteToken, TenantInvitation,
};
use crate::domain::member::TenantMember;
use crate::domain::tenant::TenantId;
use crate::domain::user::User;
use crate::domain::{DomainError, Email};
use crate::infrastructure::storage::MemoryStore;

/// In-memory implementation of `InvitationRepository`
#[derive(Debug, Clone)]
pub struct MemoryInvitationRepository {
    store: MemoryStore,
}

impl MemoryInvitationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InvitationRepository for MemoryInvitationRepository {
    async fn create(&self, invitation: TenantInvitation) -> Result<TenantInvitation, DomainError> {
        let mut db = self.store.lock()?;

        // pending-scoped uniqueness per (tenant, email)
        if db.invitations.values().any(|i| {
            i.tenant_id() == invitation.tenant_id()
                && i.email() == invitation.email()
                && i.is_pending()
        }) {
            return Err(DomainError::conflict(
                "A pending invitation already exists for this email",
            ));
        }

        db.invitations.insert(*invitation.id(), invitation.clone());
        Ok(invitation)
    }

    async fn find_pending_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<Option<TenantInvitation>, DomainError> {
        let db = self.store.lock()?;
        Ok(db
            .invitations
            .values()
            .find(|i| i.token() == token && i.is_pending())
            .cloned())
    }

    async fn find_pending(
        &self,
        tenant: &TenantId,
        email: &Email,
    ) -> Result<Option<TenantInvitation>, DomainError> {
        let db = self.store.lock()?;
        Ok(db
            .invitations
            .values()
            .find(|i| i.tenant_id() == tenant && i.email() == email && i.is_pending())
            .cloned())
    }

    async fn list_for_tenant(
        &self,
        tenant: &TenantId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<TenantInvitation>, DomainError> {
        let db = self.store.lock()?;

        let mut invitations: Vec<TenantInvitation> = db
            .invitations
            .values()
            .filter(|i| i.tenant_id() == tenant)
            .filter(|i| status.is_none_or(|s| i.status() == s))
            .cloned()
            .collect();

        invitations.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(invitations)
    }

    async fn accept(
        &self,
        token: &InviteToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<InvitationAccept, DomainError> {
        let mut db = self.store.lock()?;

        let mut invitation = db
            .invitations
            .values()
            .find(|i| i.token() == token)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

        // lazy expiry: the transition persists even though the call fails
        if invitation.is_pending() && invitation.is_expired_at(now) {
            invitation.expire()?;
            db.invitations.insert(*invitation.id(), invitation);
            return Err(DomainError::expired("Invitation has expired"));
        }

        if !invitation.is_pending() {
            return Err(DomainError::already_processed(
                "Invitation already processed",
            ));
        }

        // identity binding: a wrong account must not consume the invite
        if !invitation.matches_email(user.email()) {
            return Err(DomainError::forbidden(
                "Invitation was sent to a different email address",
            ));
        }

        let existing = db
            .members
            .values()
            .find(|m| {
                m.tenant_id() == invitation.tenant_id()
                    && m.user_id() == user.id()
                    && m.is_active()
            })
            .cloned();

        let (membership, membership_created) = match existing {
            Some(member) => (member, false),
            None => {
                let member = TenantMember::new(
                    *invitation.tenant_id(),
                    *user.id(),
                    invitation.role(),
                    Some(*invitation.invited_by()),
                );
                db.members.insert(*member.id(), member.clone());
                (member, true)
            }
        };

        invitation.accept(now)?;
        db.invitations.insert(*invitation.id(), invitation.clone());

        Ok(InvitationAccept {
            invitation,
            membership,
            membership_created,
        })
    }

    async fn reject(
        &self,
        token: &InviteToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<TenantInvitation, DomainError> {
        let mut db = self.store.lock()?;

        let mut invitation = db
            .invitations
            .values()
            .find(|i| i.token() == token)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

        if invitation.is_pending() && invitation.is_expired_at(now) {
            invitation.expire()?;
            db.invitations.insert(*invitation.id(), invitation);
            return Err(DomainError::expired("Invitation has expired"));
        }

        if !invitation.is_pending() {
            return Err(DomainError::already_processed(
                "Invitation already processed",
            ));
        }

        if !invitation.matches_email(user.email()) {
            return Err(DomainError::forbidden(
                "Invitation was sent to a different email address",
            ));
        }

        invitation.reject(now)?;
        db.invitations.insert(*invitation.id(), invitation.clone());

        Ok(invitation)
    }

    async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut db = self.store.lock()?;
        let mut count = 0;

        for invitation in db.invitations.values_mut() {
            if invitation.is_pending() && invitation.is_expired_at(now) {
                invitation.expire()?;
                count += 1;
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::member::MemberRole;
    use crate::domain::user::UserId;

    fn repo() -> MemoryInvitationRepository {
        MemoryInvitationRepository::new(MemoryStore::new())
    }

    fn make_invitation(tenant: TenantId, email: &str) -> TenantInvitation {
        TenantInvitation::new(
            tenant,
            Email::parse(email).unwrap(),
            MemberRole::Professional,
            UserId::new(),
            Duration::days(7),
        )
    }

    fn make_user(email: &str) -> User {
        User::new("bob", Email::parse(email).unwrap(), "Bob", "hash")
    }

    #[tokio::test]
    async fn test_pending_uniqueness_per_tenant_email() {
        let repo = repo();
        let tenant = TenantId::new();

        repo.create(make_invitation(tenant, "bob@x.com"))
            .await
            .unwrap();

        let result = repo.create(make_invitation(tenant, "bob@x.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));

        // same email on a different tenant is fine
        repo.create(make_invitation(TenantId::new(), "bob@x.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_terminal_invitation_frees_the_pair() {
        let repo = repo();
        let tenant = TenantId::new();
        let user = make_user("bob@x.com");

        let invitation = repo
            .create(make_invitation(tenant, "bob@x.com"))
            .await
            .unwrap();
        repo.accept(invitation.token(), &user, Utc::now())
            .await
            .unwrap();

        // history row keeps its terminal status, a new pending row is allowed
        repo.create(make_invitation(tenant, "bob@x.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_accept_unknown_token() {
        let repo = repo();
        let user = make_user("bob@x.com");

        let result = repo
            .accept(&InviteToken::generate(), &user, Utc::now())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_accept_creates_membership_and_consumes_invitation() {
        let repo = repo();
        let tenant = TenantId::new();
        let user = make_user("bob@x.com");

        let invitation = repo
            .create(make_invitation(tenant, "bob@x.com"))
            .await
            .unwrap();

        let outcome = repo
            .accept(invitation.token(), &user, Utc::now())
            .await
            .unwrap();

        assert!(outcome.membership_created);
        assert_eq!(outcome.membership.role(), MemberRole::Professional);
        assert_eq!(
            outcome.membership.invited_by(),
            Some(invitation.invited_by())
        );
        assert_eq!(outcome.invitation.status(), InvitationStatus::Accepted);
        assert!(outcome.invitation.accepted_at().is_some());
    }

    #[tokio::test]
    async fn test_expired_pending_transitions_lazily() {
        let repo = repo();
        let tenant = TenantId::new();
        let user = make_user("bob@x.com");

        let invitation = repo
            .create(TenantInvitation::new(
                tenant,
                Email::parse("bob@x.com").unwrap(),
                MemberRole::Professional,
                UserId::new(),
                Duration::days(-1),
            ))
            .await
            .unwrap();

        let result = repo.accept(invitation.token(), &user, Utc::now()).await;
        assert!(matches!(result, Err(DomainError::Expired { .. })));

        // the transition persisted even though the accept failed
        let listed = repo
            .list_for_tenant(&tenant, Some(InvitationStatus::Expired))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_forbidden_leaves_invitation_untouched() {
        let repo = repo();
        let tenant = TenantId::new();
        let carol = make_user("carol@x.com");

        let invitation = repo
            .create(make_invitation(tenant, "bob@x.com"))
            .await
            .unwrap();

        let result = repo.accept(invitation.token(), &carol, Utc::now()).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));

        // still pending; the legitimate holder can accept later
        let refetched = repo
            .find_pending_by_token(invitation.token())
            .await
            .unwrap();
        assert!(refetched.is_some());

        let bob = make_user("bob@x.com");
        repo.accept(invitation.token(), &bob, Utc::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reject_flips_status_only() {
        let repo = repo();
        let tenant = TenantId::new();
        let user = make_user("bob@x.com");

        let invitation = repo
            .create(make_invitation(tenant, "bob@x.com"))
            .await
            .unwrap();

        let rejected = repo
            .reject(invitation.token(), &user, Utc::now())
            .await
            .unwrap();

        assert_eq!(rejected.status(), InvitationStatus::Rejected);
        assert!(rejected.accepted_at().is_none());

        // no membership was created
        let result = repo.accept(invitation.token(), &user, Utc::now()).await;
        assert!(matches!(result, Err(DomainError::AlreadyProcessed { .. })));
    }

    #[tokio::test]
    async fn test_expire_stale_only_touches_overdue_pending() {
        let repo = repo();
        let tenant = TenantId::new();

        repo.create(make_invitation(tenant, "fresh@x.com"))
            .await
            .unwrap();
        repo.create(TenantInvitation::new(
            tenant,
            Email::parse("old@x.com").unwrap(),
            MemberRole::Professional,
            UserId::new(),
            Duration::days(-1),
        ))
        .await
        .unwrap();

        let count = repo.expire_stale(Utc::now()).await.unwrap();
        assert_eq!(count, 1);

        let pending = repo
            .list_for_tenant(&tenant, Some(InvitationStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].email().as_str(), "fresh@x.com");

        // second sweep finds nothing
        assert_eq!(repo.expire_stale(Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo();
        let tenant = TenantId::new();

        repo.create(make_invitation(tenant, "a@x.com")).await.unwrap();
        repo.create(make_invitation(tenant, "b@x.com")).await.unwrap();

        let listed = repo.list_for_tenant(&tenant, None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at() >= listed[1].created_at());
    }
}
