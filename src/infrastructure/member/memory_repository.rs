//! In-memory membership ledger

use async_trait::async_trait;

use crate::domain::member::{MemberRepository, TenantMember};
use crate::domain::tenant::TenantId;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::MemoryStore;

/// In-memory implementation of `MemberRepository`
#[derive(Debug, Clone)]
pub struct MemoryMemberRepository {
    store: MemoryStore,
}

impl MemoryMemberRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MemberRepository for MemoryMemberRepository {
    async fn get_active(
        &self,
        tenant: &TenantId,
        user: &UserId,
    ) -> Result<Option<TenantMember>, DomainError> {
        let db = self.store.lock()?;
        Ok(db
            .members
            .values()
            .find(|m| m.tenant_id() == tenant && m.user_id() == user && m.is_active())
            .cloned())
    }

    async fn has_active_member(
        &self,
        tenant: &TenantId,
        user: &UserId,
    ) -> Result<bool, DomainError> {
        Ok(self.get_active(tenant, user).await?.is_some())
    }

    async fn create(&self, member: TenantMember) -> Result<TenantMember, DomainError> {
        let mut db = self.store.lock()?;

        if member.is_active()
            && db.members.values().any(|m| {
                m.tenant_id() == member.tenant_id()
                    && m.user_id() == member.user_id()
                    && m.is_active()
            })
        {
            return Err(DomainError::conflict(
                "User already holds an active membership in this workspace",
            ));
        }

        db.members.insert(*member.id(), member.clone());
        Ok(member)
    }

    async fn list_for_tenant(&self, tenant: &TenantId) -> Result<Vec<TenantMember>, DomainError> {
        let db = self.store.lock()?;

        let mut members: Vec<TenantMember> = db
            .members
            .values()
            .filter(|m| m.tenant_id() == tenant)
            .cloned()
            .collect();

        members.sort_by_key(|m| (!m.is_active(), m.joined_at()));
        Ok(members)
    }

    async fn deactivate(&self, tenant: &TenantId, user: &UserId) -> Result<bool, DomainError> {
        let mut db = self.store.lock()?;

        let member = db
            .members
            .values_mut()
            .find(|m| m.tenant_id() == tenant && m.user_id() == user && m.is_active());

        match member {
            Some(m) => {
                m.deactivate();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
