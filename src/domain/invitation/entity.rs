//! Invitation entity and lifecycle state machine
//!
//! An invitation offers a specific email an opportunity to join a workspace
//! with a specific role. Its status moves one-way out of `Pending` into
//! exactly one of `Accepted`, `Rejected` or `Expired`; no transition ever
//! leaves a terminal state. The token is the only identifier the outside
//! world sees - the internal id never leaves the storage layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::member::MemberRole;
use crate::domain::tenant::TenantId;
use crate::domain::user::UserId;
use crate::domain::{DomainError, Email};

/// Invitation row identifier (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationId(Uuid);

impl InvitationId {
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

impl Default for InvitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unguessable bearer token for the accept/validate flows.
///
/// Generated once at creation and immutable afterwards; it must round-trip
/// through storage exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteToken(Uuid);

impl InviteToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token presented by a client
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

impl std::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invitation lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl InvitationStatus {
    /// Terminal states reject all further mutation
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation for an email address to join a workspace with a role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantInvitation {
    id: InvitationId,
    tenant_id: TenantId,
    email: Email,
    role: MemberRole,
    status: InvitationStatus,
    token: InviteToken,
    invited_by: UserId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

impl TenantInvitation {
    /// Create a pending invitation with a fresh token.
    ///
    /// `expires_at` is computed here and never changes afterwards.
    pub fn new(
        tenant_id: TenantId,
        email: Email,
        role: MemberRole,
        invited_by: UserId,
        ttl: Duration,
    ) -> Self {
        let created_at = Utc::now();

        Self {
            id: InvitationId::new(),
            tenant_id,
            email,
            role,
            status: InvitationStatus::Pending,
            token: InviteToken::generate(),
            invited_by,
            created_at,
            expires_at: created_at + ttl,
            accepted_at: None,
        }
    }

    /// Rehydrate an invitation from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: InvitationId,
        tenant_id: TenantId,
        email: Email,
        role: MemberRole,
        status: InvitationStatus,
        token: InviteToken,
        invited_by: UserId,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            email,
            role,
            status,
            token,
            invited_by,
            created_at,
            expires_at,
            accepted_at,
        }
    }

    pub fn id(&self) -> &InvitationId {
        &self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> MemberRole {
        self.role
    }

    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    pub fn token(&self) -> &InviteToken {
        &self.token
    }

    pub fn invited_by(&self) -> &UserId {
        &self.invited_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Whether the expiry deadline has passed at `now`.
    ///
    /// Expiry is checked lazily on first touch; a past-deadline invitation
    /// may still carry `Pending` status until accept/reject/sweep observes
    /// it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Identity binding: does the invited email match the given address?
    pub fn matches_email(&self, email: &Email) -> bool {
        self.email == *email
    }

    /// Transition `Pending` -> `Accepted`, stamping `accepted_at`
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard_pending()?;

        if self.is_expired_at(now) {
            return Err(DomainError::expired("Invitation has expired"));
        }

        self.status = InvitationStatus::Accepted;
        self.accepted_at = Some(now);
        Ok(())
    }

    /// Transition `Pending` -> `Rejected`
    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard_pending()?;

        if self.is_expired_at(now) {
            return Err(DomainError::expired("Invitation has expired"));
        }

        self.status = InvitationStatus::Rejected;
        Ok(())
    }

    /// Transition `Pending` -> `Expired` (the lazy expiry path)
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.guard_pending()?;

        self.status = InvitationStatus::Expired;
        Ok(())
    }

    fn guard_pending(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::already_processed(
                "Invitation already processed",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_invitation() -> TenantInvitation {
        TenantInvitation::new(
            TenantId::new(),
            Email::parse("bob@x.com").unwrap(),
            MemberRole::Professional,
            UserId::new(),
            Duration::days(7),
        )
    }

    #[test]
    fn test_new_invitation_is_pending() {
        let invitation = pending_invitation();

        assert!(invitation.is_pending());
        assert!(invitation.accepted_at().is_none());
        assert_eq!(
            invitation.expires_at(),
            invitation.created_at() + Duration::days(7)
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(pending_invitation().token(), pending_invitation().token());
    }

    #[test]
    fn test_accept_sets_accepted_at() {
        let mut invitation = pending_invitation();
        let now = Utc::now();

        invitation.accept(now).unwrap();

        assert_eq!(invitation.status(), InvitationStatus::Accepted);
        assert_eq!(invitation.accepted_at(), Some(now));
    }

    #[test]
    fn test_accept_twice_is_already_processed() {
        let mut invitation = pending_invitation();
        let now = Utc::now();

        invitation.accept(now).unwrap();
        let result = invitation.accept(now);

        assert!(matches!(result, Err(DomainError::AlreadyProcessed { .. })));
        assert_eq!(invitation.status(), InvitationStatus::Accepted);
    }

    #[test]
    fn test_accept_after_expiry_fails() {
        let mut invitation = pending_invitation();
        let later = Utc::now() + Duration::days(8);

        let result = invitation.accept(later);

        assert!(matches!(result, Err(DomainError::Expired { .. })));
        // the entity does not self-transition; the storage layer calls expire()
        assert!(invitation.is_pending());
        assert!(invitation.accepted_at().is_none());
    }

    #[test]
    fn test_reject_leaves_accepted_at_unset() {
        let mut invitation = pending_invitation();

        invitation.reject(Utc::now()).unwrap();

        assert_eq!(invitation.status(), InvitationStatus::Rejected);
        assert!(invitation.accepted_at().is_none());
    }

    #[test]
    fn test_terminal_states_reject_all_transitions() {
        let now = Utc::now();

        for terminal in [
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Expired,
        ] {
            let mut invitation = pending_invitation();
            match terminal {
                InvitationStatus::Accepted => invitation.accept(now).unwrap(),
                InvitationStatus::Rejected => invitation.reject(now).unwrap(),
                InvitationStatus::Expired => invitation.expire().unwrap(),
                InvitationStatus::Pending => unreachable!(),
            }

            assert!(matches!(
                invitation.clone().accept(now),
                Err(DomainError::AlreadyProcessed { .. })
            ));
            assert!(matches!(
                invitation.clone().reject(now),
                Err(DomainError::AlreadyProcessed { .. })
            ));
            assert!(matches!(
                invitation.clone().expire(),
                Err(DomainError::AlreadyProcessed { .. })
            ));
        }
    }

    #[test]
    fn test_expire() {
        let mut invitation = pending_invitation();

        invitation.expire().unwrap();

        assert_eq!(invitation.status(), InvitationStatus::Expired);
        assert!(invitation.accepted_at().is_none());
    }

    #[test]
    fn test_matches_email() {
        let invitation = pending_invitation();

        assert!(invitation.matches_email(&Email::parse("Bob@X.com ").unwrap()));
        assert!(!invitation.matches_email(&Email::parse("carol@x.com").unwrap()));
    }

    #[test]
    fn test_expiry_boundary() {
        let invitation = pending_invitation();

        assert!(!invitation.is_expired_at(invitation.expires_at()));
        assert!(invitation.is_expired_at(invitation.expires_at() + Duration::seconds(1)));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Expired,
        ] {
            assert_eq!(InvitationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InvitationStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_token_parse_round_trip() {
        let token = InviteToken::generate();
        let parsed = InviteToken::parse(&token.to_string()).unwrap();
        assert_eq!(token, parsed);
    }
}
