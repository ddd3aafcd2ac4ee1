//! PostgreSQL membership ledger implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::member::{MemberId, MemberRepository, MemberRole, TenantMember};
use crate::domain::tenant::TenantId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

const MEMBER_COLUMNS: &str = "id, tenant_id, user_id, role, is_active, joined_at, invited_by";

/// PostgreSQL implementation of `MemberRepository`
#[derive(Debug, Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn get_active(
        &self,
        tenant: &TenantId,
        user: &UserId,
    ) -> Result<Option<TenantMember>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM tenant_members
             WHERE tenant_id = $1 AND user_id = $2 AND is_active"
        ))
        .bind(tenant.as_uuid())
        .bind(user.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get membership: {}", e)))?;

        row.map(|r| row_to_member(&r)).transpose()
    }

    async fn has_active_member(
        &self,
        tenant: &TenantId,
        user: &UserId,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tenant_members
             WHERE tenant_id = $1 AND user_id = $2 AND is_active)",
        )
        .bind(tenant.as_uuid())
        .bind(user.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check membership: {}", e)))?;

        Ok(exists)
    }

    async fn create(&self, member: TenantMember) -> Result<TenantMember, DomainError> {
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
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(
                    "User already holds an active membership in this workspace",
                )
            } else {
                DomainError::storage(format!("Failed to create membership: {}", e))
            }
        })?;

        Ok(member)
    }

    async fn list_for_tenant(&self, tenant: &TenantId) -> Result<Vec<TenantMember>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM tenant_members
             WHERE tenant_id = $1
             ORDER BY is_active DESC, joined_at"
        ))
        .bind(tenant.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list members: {}", e)))?;

        rows.iter().map(row_to_member).collect()
    }

    async fn deactivate(&self, tenant: &TenantId, user: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE tenant_members SET is_active = FALSE
             WHERE tenant_id = $1 AND user_id = $2 AND is_active",
        )
        .bind(tenant.as_uuid())
        .bind(user.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to deactivate membership: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn row_to_member(row: &sqlx::postgres::PgRow) -> Result<TenantMember, DomainError> {
    let id: Uuid = row.get("id");
    let tenant_id: Uuid = row.get("tenant_id");
    let user_id: Uuid = row.get("user_id");
    let role: String = row.get("role");
    let is_active: bool = row.get("is_active");
    let joined_at: DateTime<Utc> = row.get("joined_at");
    let invited_by: Option<Uuid> = row.get("invited_by");

    let role = MemberRole::parse(&role)
        .ok_or_else(|| DomainError::storage(format!("Invalid role in database: '{}'", role)))?;

    Ok(TenantMember::from_storage(
        MemberId::from_uuid(id),
        TenantId::from_uuid(tenant_id),
        UserId::from_uuid(user_id),
        role,
        is_active,
        joined_at,
        invited_by.map(UserId::from_uuid),
    ))
}
