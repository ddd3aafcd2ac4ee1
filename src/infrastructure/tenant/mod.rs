//! Tenant infrastructure: repositories and the registry service

mod memory_repository;
mod postgres_repository;
mod service;

pub use memory_repository::MemoryTenantRepository;
pub use postgres_repository::PostgresTenantRepository;
pub use service::{CreateTenantRequest, TenantService, TenantWithRole};
