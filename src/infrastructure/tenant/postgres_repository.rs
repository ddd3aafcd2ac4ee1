//! PostgreSQL tenant repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::member::TenantMember;
use crate::domain::tenant::{TeamSize, Tenant, TenantId, TenantRepository, TenantType};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const TENANT_COLUMNS: &str =
    "id, name, tenant_type, slug, owner_id, team_size, is_active, created_at";

/// PostgreSQL implementation of `TenantRepository`
#[derive(Debug, Clone)]
pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn get(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get workspace: {}", e)))?;

        row.map(|r| row_to_tenant(&r)).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get workspace by slug: {}", e)))?;

        row.map(|r| row_to_tenant(&r)).transpose()
    }

    async fn create_with_owner(
        &self,
        tenant: Tenant,
        owner_member: TenantMember,
    ) -> Result<Tenant, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, tenant_type, slug, owner_id, team_size,
                                 is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(tenant.id().as_uuid())
        .bind(tenant.name())
        .bind(tenant.tenant_type().as_str())
        .bind(tenant.slug())
        .bind(tenant.owner().as_uuid())
        .bind(tenant.team_size().as_str())
        .bind(tenant.is_active())
        .bind(tenant.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Slug '{}' already taken", tenant.slug()))
            } else {
                DomainError::storage(format!("Failed to create workspace: {}", e))
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO tenant_members (id, tenant_id, user_id, role, is_active,
                                        joined_at, invited_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(owner_member.id().as_uuid())
        .bind(owner_member.tenant_id().as_uuid())
        .bind(owner_member.user_id().as_uuid())
        .bind(owner_member.role().as_str())
        .bind(owner_member.is_active())
        .bind(owner_member.joined_at())
        .bind(owner_member.invited_by().map(|u| u.as_uuid()))
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create owner membership: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))?;

        Ok(tenant)
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET name = $2, tenant_type = $3, team_size = $4, is_active = $5
            WHERE id = $1
            "#,
        )
        .bind(tenant.id().as_uuid())
        .bind(tenant.name())
        .bind(tenant.tenant_type().as_str())
        .bind(tenant.team_size().as_str())
        .bind(tenant.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update workspace: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Workspace '{}' not found",
                tenant.slug()
            )));
        }

        Ok(tenant.clone())
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Tenant>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.tenant_type, t.slug, t.owner_id, t.team_size,
                   t.is_active, t.created_at
            FROM tenants t
            JOIN tenant_members m ON m.tenant_id = t.id
            WHERE m.user_id = $1 AND m.is_active
            ORDER BY t.created_at
            "#,
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list workspaces: {}", e)))?;

        rows.iter().map(row_to_tenant).collect()
    }
}

pub(crate) fn row_to_tenant(row: &sqlx::postgres::PgRow) -> Result<Tenant, DomainError> {
    let id: Uuid = row.get("id");
    let name: String = row.get("name");
    let tenant_type: String = row.get("tenant_type");
    let slug: String = row.get("slug");
    let owner_id: Uuid = row.get("owner_id");
    let team_size: String = row.get("team_size");
    let is_active: bool = row.get("is_active");
    let created_at: DateTime<Utc> = row.get("created_at");

    let tenant_type = TenantType::parse(&tenant_type).ok_or_else(|| {
        DomainError::storage(format!("Invalid tenant type in database: '{}'", tenant_type))
    })?;
    let team_size = TeamSize::parse(&team_size).ok_or_else(|| {
        DomainError::storage(format!("Invalid team size in database: '{}'", team_size))
    })?;

    Ok(Tenant::from_storage(
        TenantId::from_uuid(id),
        name,
        tenant_type,
        slug,
        UserId::from_uuid(owner_id),
        team_size,
        is_active,
        created_at,
    ))
}
