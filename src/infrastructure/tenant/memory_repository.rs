//! In-memory tenant repository

use async_trait::async_trait;

use crate::domain::member::TenantMember;
use crate::domain::tenant::{Tenant, TenantId, TenantRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::MemoryStore;

/// In-memory implementation of `TenantRepository`
#[derive(Debug, Clone)]
pub struct MemoryTenantRepository {
    store: MemoryStore,
}

impl MemoryTenantRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantRepository for MemoryTenantRepository {
    async fn get(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let db = self.store.lock()?;
        Ok(db.tenants.get(id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        let db = self.store.lock()?;
        Ok(db.tenants.values().find(|t| t.slug() == slug).cloned())
    }

    async fn create_with_owner(
        &self,
        tenant: Tenant,
        owner_member: TenantMember,
    ) -> Result<Tenant, DomainError> {
        // one lock covers the slug check and both inserts
        let mut db = self.store.lock()?;

        if db.tenants.values().any(|t| t.slug() == tenant.slug()) {
            return Err(DomainError::conflict(format!(
                "Slug '{}' already taken",
                tenant.slug()
            )));
        }

        db.tenants.insert(*tenant.id(), tenant.clone());
        db.members.insert(*owner_member.id(), owner_member);

        Ok(tenant)
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut db = self.store.lock()?;

        if !db.tenants.contains_key(tenant.id()) {
            return Err(DomainError::not_found(format!(
                "Workspace '{}' not found",
                tenant.slug()
            )));
        }

        db.tenants.insert(*tenant.id(), tenant.clone());
        Ok(tenant.clone())
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Tenant>, DomainError> {
        let db = self.store.lock()?;

        let mut tenants: Vec<Tenant> = db
            .members
            .values()
            .filter(|m| m.user_id() == user && m.is_active())
            .filter_map(|m| db.tenants.get(m.tenant_id()).cloned())
            .collect();

        tenants.sort_by_key(|t| t.created_at());
        Ok(tenants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::MemberRole;
    use crate::domain::tenant::{TeamSize, TenantType};

    fn repo() -> MemoryTenantRepository {
        MemoryTenantRepository::new(MemoryStore::new())
    }

    fn make_tenant(slug: &str, owner: UserId) -> (Tenant, TenantMember) {
        let tenant = Tenant::new(
            "Acme Clinic",
            TenantType::Doctor,
            slug,
            owner,
            TeamSize::Small,
        )
        .unwrap();
        let member = TenantMember::new(*tenant.id(), owner, MemberRole::Owner, None);
        (tenant, member)
    }

    #[tokio::test]
    async fn test_create_with_owner() {
        let repo = repo();
        let owner = UserId::new();
        let (tenant, member) = make_tenant("acme", owner);

        repo.create_with_owner(tenant, member).await.unwrap();

        let fetched = repo.get_by_slug("acme").await.unwrap().unwrap();
        assert_eq!(fetched.name(), "Acme Clinic");

        let tenants = repo.list_for_member(&owner).await.unwrap();
        assert_eq!(tenants.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let repo = repo();
        let (t1, m1) = make_tenant("acme", UserId::new());
        let (t2, m2) = make_tenant("acme", UserId::new());

        repo.create_with_owner(t1, m1).await.unwrap();
        let result = repo.create_with_owner(t2, m2).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_conflict_inserts_nothing() {
        let repo = repo();
        let loser_owner = UserId::new();
        let (t1, m1) = make_tenant("acme", UserId::new());
        let (t2, m2) = make_tenant("acme", loser_owner);

        repo.create_with_owner(t1, m1).await.unwrap();
        let _ = repo.create_with_owner(t2, m2).await;

        assert!(repo
            .list_for_member(&loser_owner)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_for_member_skips_inactive_memberships() {
        let repo = repo();
        let owner = UserId::new();
        let (tenant, mut member) = make_tenant("acme", owner);
        member.deactivate();

        repo.create_with_owner(tenant, member).await.unwrap();

        assert!(repo.list_for_member(&owner).await.unwrap().is_empty());
    }
}
