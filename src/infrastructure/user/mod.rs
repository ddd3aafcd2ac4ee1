//! User infrastructure: repositories, password hashing and the user service

mod memory_repository;
mod password;
mod postgres_repository;
mod service;

pub use memory_repository::MemoryUserRepository;
pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use service::{RegisterUserRequest, UserService};
