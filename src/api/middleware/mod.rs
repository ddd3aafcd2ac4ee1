//! Request middleware and extractors

mod user_auth;

pub use user_auth::{extract_bearer_token, RequireUser};
