use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::invitations;
use super::state::AppState;
use super::workspaces;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Authentication
        .nest("/auth", auth::create_auth_router())
        // Workspaces (includes workspace-scoped invitation routes)
        .nest("/workspaces", workspaces::create_workspaces_router())
        // Token-based invitation flows
        .nest("/invitations", invitations::create_invitations_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
