//! Membership ledger infrastructure

mod memory_repository;
mod postgres_repository;

pub use memory_repository::MemoryMemberRepository;
pub use postgres_repository::PostgresMemberRepository;

pub(crate) use postgres_repository::row_to_member;
