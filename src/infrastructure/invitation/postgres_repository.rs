//! PostgreSQL invitation repository implementation
//!
//! `accept` and `reject` take `SELECT ... FOR UPDATE` on the invitation row
//! before any check, so concurrent calls on the same token serialize; the
//! loser re-reads a terminal status and fails cleanly. The membership insert
//! happens inside the same transaction as the status transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::invitation::{
    InvitationAccept, InvitationId, InvitationRepository, InvitationStatus, InviteToken,
    TenantInvitation,
};
use crate::domain::member::TenantMember;
use crate::domain::tenant::TenantId;
use crate::domain::user::{User, UserId};
use crate::domain::{DomainError, Email};
use crate::infrastructure::member::row_to_member;

const INVITATION_COLUMNS: &str = "id, tenant_id, email, role, status, token, invited_by, \
                                  created_at, expires_at, accepted_at";

const MEMBER_COLUMNS: &str = "id, tenant_id, user_id, role, is_active, joined_at, invited_by";

/// PostgreSQL implementation of `InvitationRepository`
#[derive(Debug, Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the invitation row for the duration of the transaction
    async fn lock_by_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &InviteToken,
    ) -> Result<Option<TenantInvitation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {INVITATION_COLUMNS} FROM tenant_invitations WHERE token = $1 FOR UPDATE"
        ))
        .bind(token.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to lock invitation: {}", e)))?;

        row.map(|r| row_to_invitation(&r)).transpose()
    }

    async fn persist_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        invitation: &TenantInvitation,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE tenant_invitations SET status = $2, accepted_at = $3 WHERE id = $1")
            .bind(invitation.id().as_uuid())
            .bind(invitation.status().as_str())
            .bind(invitation.accepted_at())
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update invitation: {}", e)))?;

        Ok(())
    }

    /// Persist a lazy PENDING -> EXPIRED transition and commit it, then fail
    async fn expire_and_commit(
        &self,
        mut tx: Transaction<'_, Postgres>,
        mut invitation: TenantInvitation,
    ) -> DomainError {
        if let Err(e) = invitation.expire() {
            return e;
        }

        if let Err(e) = self.persist_status(&mut tx, &invitation).await {
            return e;
        }

        if let Err(e) = tx.commit().await {
            return DomainError::storage(format!("Failed to commit expiry: {}", e));
        }

        DomainError::expired("Invitation has expired")
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn create(&self, invitation: TenantInvitation) -> Result<TenantInvitation, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tenant_invitations (id, tenant_id, email, role, status, token,
                                            invited_by, created_at, expires_at, accepted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(invitation.id().as_uuid())
        .bind(invitation.tenant_id().as_uuid())
        .bind(invitation.email().as_str())
        .bind(invitation.role().as_str())
        .bind(invitation.status().as_str())
        .bind(invitation.token().as_uuid())
        .bind(invitation.invited_by().as_uuid())
        .bind(invitation.created_at())
        .bind(invitation.expires_at())
        .bind(invitation.accepted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict("A pending invitation already exists for this email")
            } else {
                DomainError::storage(format!("Failed to create invitation: {}", e))
            }
        })?;

        Ok(invitation)
    }

    async fn find_pending_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<Option<TenantInvitation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {INVITATION_COLUMNS} FROM tenant_invitations
             WHERE token = $1 AND status = 'pending'"
        ))
        .bind(token.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find invitation: {}", e)))?;

        row.map(|r| row_to_invitation(&r)).transpose()
    }

    async fn find_pending(
        &self,
        tenant: &TenantId,
        email: &Email,
    ) -> Result<Option<TenantInvitation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {INVITATION_COLUMNS} FROM tenant_invitations
             WHERE tenant_id = $1 AND email = $2 AND status = 'pending'"
        ))
        .bind(tenant.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find invitation: {}", e)))?;

        row.map(|r| row_to_invitation(&r)).transpose()
    }

    async fn list_for_tenant(
        &self,
        tenant: &TenantId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<TenantInvitation>, DomainError> {
        let rows = match status {
            Some(s) => {
                sqlx::query(&format!(
                    "SELECT {INVITATION_COLUMNS} FROM tenant_invitations
                     WHERE tenant_id = $1 AND status = $2
                     ORDER BY created_at DESC"
                ))
                .bind(tenant.as_uuid())
                .bind(s.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {INVITATION_COLUMNS} FROM tenant_invitations
                     WHERE tenant_id = $1
                     ORDER BY created_at DESC"
                ))
                .bind(tenant.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to list invitations: {}", e)))?;

        rows.iter().map(row_to_invitation).collect()
    }

    async fn accept(
        &self,
        token: &InviteToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<InvitationAccept, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let mut invitation = self
            .lock_by_token(&mut tx, token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

        // lazy expiry: persist the transition even though the accept fails
        if invitation.is_pending() && invitation.is_expired_at(now) {
            return Err(self.expire_and_commit(tx, invitation).await);
        }

        // dropping the transaction rolls it back, leaving the row untouched
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

        let existing = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM tenant_members
             WHERE tenant_id = $1 AND user_id = $2 AND is_active"
        ))
        .bind(invitation.tenant_id().as_uuid())
        .bind(user.id().as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check membership: {}", e)))?;

        let (membership, membership_created) = match existing {
            Some(row) => (row_to_member(&row)?, false),
            None => {
                let member = TenantMember::new(
                    *invitation.tenant_id(),
                    *user.id(),
                    invitation.role(),
                    Some(*invitation.invited_by()),
                );

                sqlx::query(
                    r#"
                    INSERT INTO tenant_members (id, tenant_id, user_id, role, is_active,
                                                joined_at, invited_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(member.id().as_uuid())
                .bind(member.tenant_id().as_uuid())
                .bind(member.user_id().as_uuid())
                .bind(member.role().as_str())
                .bind(member.is_active())
                .bind(member.joined_at())
                .bind(member.invited_by().map(|u| u.as_uuid()))
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    let msg = e.to_string();

                    // the ledger's pair-uniqueness index is the final backstop
                    if msg.contains("duplicate key") || msg.contains("unique constraint") {
                        DomainError::conflict(
                            "User already holds an active membership in this workspace",
                        )
                    } else {
                        DomainError::storage(format!("Failed to create membership: {}", e))
                    }
                })?;

                (member, true)
            }
        };

        invitation.accept(now)?;
        self.persist_status(&mut tx, &invitation).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit accept: {}", e)))?;

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
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let mut invitation = self
            .lock_by_token(&mut tx, token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

        if invitation.is_pending() && invitation.is_expired_at(now) {
            return Err(self.expire_and_commit(tx, invitation).await);
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
        self.persist_status(&mut tx, &invitation).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit reject: {}", e)))?;

        Ok(invitation)
    }

    async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE tenant_invitations SET status = 'expired'
             WHERE status = 'pending' AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to expire invitations: {}", e)))?;

        Ok(result.rows_affected())
    }
}

pub(crate) fn row_to_invitation(
    row: &sqlx::postgres::PgRow,
) -> Result<TenantInvitation, DomainError> {
    let id: Uuid = row.get("id");
    let tenant_id: Uuid = row.get("tenant_id");
    let email: String = row.get("email");
    let role: String = row.get("role");
    let status: String = row.get("status");
    let token: Uuid = row.get("token");
    let invited_by: Uuid = row.get("invited_by");
    let created_at: DateTime<Utc> = row.get("created_at");
    let expires_at: DateTime<Utc> = row.get("expires_at");
    let accepted_at: Option<DateTime<Utc>> = row.get("accepted_at");

    let email = Email::parse(&email)
        .map_err(|e| DomainError::storage(format!("Invalid email in database: {}", e)))?;
    let role = crate::domain::member::MemberRole::parse(&role)
        .ok_or_else(|| DomainError::storage(format!("Invalid role in database: '{}'", role)))?;
    let status = InvitationStatus::parse(&status).ok_or_else(|| {
        DomainError::storage(format!("Invalid invitation status in database: '{}'", status))
    })?;

    Ok(TenantInvitation::from_storage(
        InvitationId::from_uuid(id),
        TenantId::from_uuid(tenant_id),
        email,
        role,
        status,
        InviteToken::from_uuid(token),
        UserId::from_uuid(invited_by),
        created_at,
        expires_at,
        accepted_at,
    ))
}
