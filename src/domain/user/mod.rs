//! User domain: accounts consumed by the session gateway and the
//! invitation identity-binding check

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_full_name, validate_password, validate_username, UserValidationError,
};
