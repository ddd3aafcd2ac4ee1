//! Tenant registry service

use std::sync::Arc;

use tracing::info;

use crate::domain::member::{MemberRepository, MemberRole, TenantMember};
use crate::domain::tenant::{
    slugify, validate_tenant_name, TeamSize, Tenant, TenantRepository, TenantType,
};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Upper bound on slug collision retries before giving up
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Request for creating a new workspace
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    pub name: String,
    pub tenant_type: TenantType,
    pub team_size: TeamSize,
}

/// A workspace together with the caller's role in it
#[derive(Debug, Clone)]
pub struct TenantWithRole {
    pub tenant: Tenant,
    pub role: MemberRole,
}

/// Tenant registry: workspace creation, lookup and soft deletion
#[derive(Debug)]
pub struct TenantService<T: TenantRepository, M: MemberRepository> {
    tenants: Arc<T>,
    members: Arc<M>,
}

impl<T: TenantRepository, M: MemberRepository> TenantService<T, M> {
    pub fn new(tenants: Arc<T>, members: Arc<M>) -> Self {
        Self { tenants, members }
    }

    /// Create a workspace owned by `owner`.
    ///
    /// The slug is derived from the name; on collision an incrementing
    /// numeric suffix is appended and the insert retried, so two concurrent
    /// creations with the same name end up with distinct slugs. The OWNER
    /// membership row is written in the same transaction as the workspace.
    pub async fn create(
        &self,
        owner: &User,
        request: CreateTenantRequest,
    ) -> Result<Tenant, DomainError> {
        info!(name = %request.name, owner = %owner.id(), "Creating workspace");

        validate_tenant_name(&request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let base = slugify(&request.name);

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = if attempt == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, attempt + 1)
            };

            let tenant = Tenant::new(
                &request.name,
                request.tenant_type,
                slug,
                *owner.id(),
                request.team_size,
            )
            .map_err(|e| DomainError::validation(e.to_string()))?;

            let owner_member =
                TenantMember::new(*tenant.id(), *owner.id(), MemberRole::Owner, None);

            match self.tenants.create_with_owner(tenant, owner_member).await {
                Ok(created) => {
                    info!(slug = %created.slug(), "Workspace created");
                    return Ok(created);
                }
                Err(DomainError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::internal(format!(
            "Could not derive a unique slug for '{}'",
            base
        )))
    }

    /// Get a workspace by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tenant, DomainError> {
        self.tenants
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Workspace '{}' not found", slug)))
    }

    /// Workspaces where the user holds an active membership, with the
    /// user's role in each
    pub async fn list_for_member(&self, user: &UserId) -> Result<Vec<TenantWithRole>, DomainError> {
        let tenants = self.tenants.list_for_member(user).await?;

        let mut result = Vec::with_capacity(tenants.len());

        for tenant in tenants {
            // skip rows whose membership was deactivated between the reads
            if let Some(member) = self.members.get_active(tenant.id(), user).await? {
                result.push(TenantWithRole {
                    tenant,
                    role: member.role(),
                });
            }
        }

        Ok(result)
    }

    /// Soft-delete a workspace. Owner only; workspaces are never hard
    /// deleted.
    pub async fn deactivate(&self, slug: &str, caller: &User) -> Result<Tenant, DomainError> {
        info!(slug = %slug, caller = %caller.id(), "Deactivating workspace");

        let mut tenant = self.get_by_slug(slug).await?;

        if tenant.owner() != caller.id() {
            return Err(DomainError::forbidden(
                "Only the workspace owner can deactivate it",
            ));
        }

        tenant.deactivate();
        self.tenants.update(&tenant).await
    }

    /// Membership rows of a workspace; any active member may look
    pub async fn list_members(
        &self,
        slug: &str,
        caller: &User,
    ) -> Result<Vec<TenantMember>, DomainError> {
        let tenant = self.get_by_slug(slug).await?;

        if !self
            .members
            .has_active_member(tenant.id(), caller.id())
            .await?
        {
            return Err(DomainError::forbidden(
                "Only workspace members can list members",
            ));
        }

        self.members.list_for_tenant(tenant.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Email;
    use crate::infrastructure::member::MemoryMemberRepository;
    use crate::infrastructure::storage::MemoryStore;
    use crate::infrastructure::tenant::MemoryTenantRepository;

    fn create_service() -> TenantService<MemoryTenantRepository, MemoryMemberRepository> {
        let store = MemoryStore::new();
        TenantService::new(
            Arc::new(MemoryTenantRepository::new(store.clone())),
            Arc::new(MemoryMemberRepository::new(store)),
        )
    }

    fn make_user(username: &str, email: &str) -> User {
        User::new(username, Email::parse(email).unwrap(), "Test User", "hash")
    }

    fn make_request(name: &str) -> CreateTenantRequest {
        CreateTenantRequest {
            name: name.to_string(),
            tenant_type: TenantType::Doctor,
            team_size: TeamSize::Small,
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_owner_membership() {
        let service = create_service();
        let alice = make_user("alice", "alice@x.com");

        let tenant = service
            .create(&alice, make_request("Acme Clinic"))
            .await
            .unwrap();

        assert_eq!(tenant.slug(), "acme-clinic");
        assert_eq!(tenant.owner(), alice.id());
        assert!(tenant.is_active());

        let listed = service.list_for_member(alice.id()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].role, MemberRole::Owner);
    }

    #[tokio::test]
    async fn test_slug_collision_appends_suffix() {
        let service = create_service();
        let alice = make_user("alice", "alice@x.com");
        let bob = make_user("bob", "bob@x.com");
        let carol = make_user("carol", "carol@x.com");

        let t1 = service
            .create(&alice, make_request("Acme Clinic"))
            .await
            .unwrap();
        let t2 = service
            .create(&bob, make_request("Acme Clinic"))
            .await
            .unwrap();
        let t3 = service
            .create(&carol, make_request("Acme Clinic"))
            .await
            .unwrap();

        assert_eq!(t1.slug(), "acme-clinic");
        assert_eq!(t2.slug(), "acme-clinic-2");
        assert_eq!(t3.slug(), "acme-clinic-3");
    }

    #[tokio::test]
    async fn test_concurrent_same_name_creations_get_distinct_slugs() {
        let service = Arc::new(create_service());
        let alice = make_user("alice", "alice@x.com");
        let bob = make_user("bob", "bob@x.com");

        let (a, b) = tokio::join!(
            service.create(&alice, make_request("Acme Clinic")),
            service.create(&bob, make_request("Acme Clinic")),
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.slug(), b.slug());
    }

    #[tokio::test]
    async fn test_get_by_slug_not_found() {
        let service = create_service();

        let result = service.get_by_slug("missing").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deactivate_owner_only() {
        let service = create_service();
        let alice = make_user("alice", "alice@x.com");
        let mallory = make_user("mallory", "mallory@x.com");

        let tenant = service.create(&alice, make_request("Acme")).await.unwrap();

        let result = service.deactivate(tenant.slug(), &mallory).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));

        let tenant = service.deactivate(tenant.slug(), &alice).await.unwrap();
        assert!(!tenant.is_active());
    }

    #[tokio::test]
    async fn test_list_members_requires_membership() {
        let service = create_service();
        let alice = make_user("alice", "alice@x.com");
        let mallory = make_user("mallory", "mallory@x.com");

        let tenant = service.create(&alice, make_request("Acme")).await.unwrap();

        let members = service.list_members(tenant.slug(), &alice).await.unwrap();
        assert_eq!(members.len(), 1);

        let result = service.list_members(tenant.slug(), &mallory).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_name() {
        let service = create_service();
        let alice = make_user("alice", "alice@x.com");

        let result = service.create(&alice, make_request("   ")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
