//! Invitation engine infrastructure

mod memory_repository;
mod postgres_repository;
mod service;

pub use memory_repository::MemoryInvitationRepository;
pub use postgres_repository::PostgresInvitationRepository;
pub use service::{
    CreateInvitationRequest, InvitationConfig, InvitationCreation, InvitationPreview,
    InvitationService,
};
