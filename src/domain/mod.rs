//! Domain layer: entities, invariants and repository traits
//!
//! The storage-agnostic heart of the system. Infrastructure implements the
//! repository traits; the API layer never touches these types directly
//! except through services.

mod email;
mod error;

pub mod invitation;
pub mod member;
pub mod tenant;
pub mod user;

pub use email::{Email, EmailError};
pub use error::DomainError;
