//! Application state for shared services
//!
//! Handlers depend on service traits behind `Arc<dyn ...>`; the concrete
//! generic services implement them below, so either storage backend plugs
//! in without the API layer knowing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::invitation::{
    InvitationAccept, InvitationRepository, InvitationStatus, TenantInvitation,
};
use crate::domain::member::{MemberRepository, TenantMember};
use crate::domain::tenant::{Tenant, TenantRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::TokenIssuer;
use crate::infrastructure::invitation::{
    CreateInvitationRequest, InvitationCreation, InvitationPreview, InvitationService,
};
use crate::infrastructure::tenant::{CreateTenantRequest, TenantService, TenantWithRole};
use crate::infrastructure::user::{PasswordHasher, RegisterUserRequest, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub tenant_service: Arc<dyn TenantServiceTrait>,
    pub invitation_service: Arc<dyn InvitationServiceTrait>,
    pub jwt_service: Arc<dyn TokenIssuer>,
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        tenant_service: Arc<dyn TenantServiceTrait>,
        invitation_service: Arc<dyn InvitationServiceTrait>,
        jwt_service: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            user_service,
            tenant_service,
            invitation_service,
            jwt_service,
        }
    }
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError>;
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

/// Trait for tenant registry operations
#[async_trait]
pub trait TenantServiceTrait: Send + Sync {
    async fn create(&self, owner: &User, request: CreateTenantRequest)
        -> Result<Tenant, DomainError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Tenant, DomainError>;
    async fn list_for_member(&self, user: &UserId) -> Result<Vec<TenantWithRole>, DomainError>;
    async fn deactivate(&self, slug: &str, caller: &User) -> Result<Tenant, DomainError>;
    async fn list_members(
        &self,
        slug: &str,
        caller: &User,
    ) -> Result<Vec<TenantMember>, DomainError>;
}

/// Trait for invitation engine operations
#[async_trait]
pub trait InvitationServiceTrait: Send + Sync {
    async fn create(
        &self,
        slug: &str,
        inviter: &User,
        request: CreateInvitationRequest,
    ) -> Result<InvitationCreation, DomainError>;
    async fn validate(&self, token: &str) -> Result<InvitationPreview, DomainError>;
    async fn accept(&self, token: &str, user: &User) -> Result<InvitationAccept, DomainError>;
    async fn reject(&self, token: &str, user: &User) -> Result<TenantInvitation, DomainError>;
    async fn list_for_tenant(
        &self,
        slug: &str,
        caller: &User,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<TenantInvitation>, DomainError>;
    async fn sweep_expired(&self) -> Result<u64, DomainError>;
}

// Implement the traits for the actual services

#[async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        UserService::register(self, request).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }
}

#[async_trait]
impl<T, M> TenantServiceTrait for TenantService<T, M>
where
    T: TenantRepository,
    M: MemberRepository,
{
    async fn create(
        &self,
        owner: &User,
        request: CreateTenantRequest,
    ) -> Result<Tenant, DomainError> {
        TenantService::create(self, owner, request).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Tenant, DomainError> {
        TenantService::get_by_slug(self, slug).await
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<TenantWithRole>, DomainError> {
        TenantService::list_for_member(self, user).await
    }

    async fn deactivate(&self, slug: &str, caller: &User) -> Result<Tenant, DomainError> {
        TenantService::deactivate(self, slug, caller).await
    }

    async fn list_members(
        &self,
        slug: &str,
        caller: &User,
    ) -> Result<Vec<TenantMember>, DomainError> {
        TenantService::list_members(self, slug, caller).await
    }
}

#[async_trait]
impl<I, M, T, U> InvitationServiceTrait for InvitationService<I, M, T, U>
where
    I: InvitationRepository,
    M: MemberRepository,
    T: TenantRepository,
    U: UserRepository,
{
    async fn create(
        &self,
        slug: &str,
        inviter: &User,
        request: CreateInvitationRequest,
    ) -> Result<InvitationCreation, DomainError> {
        InvitationService::create(self, slug, inviter, request).await
    }

    async fn validate(&self, token: &str) -> Result<InvitationPreview, DomainError> {
        InvitationService::validate(self, token).await
    }

    async fn accept(&self, token: &str, user: &User) -> Result<InvitationAccept, DomainError> {
        InvitationService::accept(self, token, user).await
    }

    async fn reject(&self, token: &str, user: &User) -> Result<TenantInvitation, DomainError> {
        InvitationService::reject(self, token, user).await
    }

    async fn list_for_tenant(
        &self,
        slug: &str,
        caller: &User,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<TenantInvitation>, DomainError> {
        InvitationService::list_for_tenant(self, slug, caller, status).await
    }

    async fn sweep_expired(&self) -> Result<u64, DomainError> {
        InvitationService::sweep_expired(self).await
    }
}
