//! HTTP API surface

pub mod auth;
pub mod health;
pub mod invitations;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;
pub mod workspaces;

pub use router::create_router_with_state;
