//! Workhub API
//!
//! A multi-tenant workspace backend: user registration and authentication,
//! workspace creation and membership, and token-based invitations that
//! admit users into a workspace with a role.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use api::state::{AppState, InvitationServiceTrait, TenantServiceTrait, UserServiceTrait};
use infrastructure::auth::{JwtConfig, JwtService, TokenIssuer};
use infrastructure::invitation::{
    InvitationConfig, InvitationService, MemoryInvitationRepository, PostgresInvitationRepository,
};
use infrastructure::member::{MemoryMemberRepository, PostgresMemberRepository};
use infrastructure::storage::{run_migrations, MemoryStore, StorageBackend};
use infrastructure::tenant::{MemoryTenantRepository, PostgresTenantRepository, TenantService};
use infrastructure::user::{
    Argon2Hasher, MemoryUserRepository, PostgresUserRepository, UserService,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend = StorageBackend::from_str(&config.database.backend).ok_or_else(|| {
        anyhow::anyhow!("Unknown storage backend '{}'", config.database.backend)
    })?;

    info!("Storage backend: {:?}", backend);

    let invitation_config = InvitationConfig {
        expiry_days: config.invitations.expiry_days,
    };
    let hasher = Arc::new(Argon2Hasher::new());

    let (user_service, tenant_service, invitation_service): (
        Arc<dyn UserServiceTrait>,
        Arc<dyn TenantServiceTrait>,
        Arc<dyn InvitationServiceTrait>,
    ) = match backend {
        StorageBackend::Memory => {
            let store = MemoryStore::new();
            let users = Arc::new(MemoryUserRepository::new(store.clone()));
            let tenants = Arc::new(MemoryTenantRepository::new(store.clone()));
            let members = Arc::new(MemoryMemberRepository::new(store.clone()));
            let invitations = Arc::new(MemoryInvitationRepository::new(store));

            (
                Arc::new(UserService::new(users.clone(), hasher)),
                Arc::new(TenantService::new(tenants.clone(), members.clone())),
                Arc::new(InvitationService::with_config(
                    invitations,
                    members,
                    tenants,
                    users,
                    invitation_config,
                )),
            )
        }
        StorageBackend::Postgres => {
            let url = database_url(config)?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            run_migrations(&pool).await?;

            let users = Arc::new(PostgresUserRepository::new(pool.clone()));
            let tenants = Arc::new(PostgresTenantRepository::new(pool.clone()));
            let members = Arc::new(PostgresMemberRepository::new(pool.clone()));
            let invitations = Arc::new(PostgresInvitationRepository::new(pool));

            (
                Arc::new(UserService::new(users.clone(), hasher)),
                Arc::new(TenantService::new(tenants.clone(), members.clone())),
                Arc::new(InvitationService::with_config(
                    invitations,
                    members,
                    tenants,
                    users,
                    invitation_config,
                )),
            )
        }
    };

    let jwt_service = create_jwt_service(config);

    Ok(AppState::new(
        user_service,
        tenant_service,
        invitation_service,
        jwt_service,
    ))
}

/// Resolve the database URL: DATABASE_URL wins over the config file
pub fn database_url(config: &AppConfig) -> anyhow::Result<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| config.database.url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("DATABASE_URL or database.url is required for the postgres backend")
        })
}

/// Generate a random JWT secret
fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Create the JWT service from config, env var, or a random secret
fn create_jwt_service(config: &AppConfig) -> Arc<dyn TokenIssuer> {
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            tracing::warn!(
                "No JWT_SECRET configured. Generating a random secret; \
                sessions will NOT survive restarts."
            );
            generate_random_secret()
        });

    Arc::new(JwtService::new(JwtConfig::new(
        secret,
        config.auth.access_expiration_hours,
        config.auth.refresh_expiration_hours,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_memory_backend() {
        let state = create_app_state().await.unwrap();
        assert_eq!(state.user_service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let mut config = AppConfig::default();
        config.database.backend = "sqlite".to_string();

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[test]
    fn test_random_secret_length() {
        let secret = generate_random_secret();
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, generate_random_secret());
    }
}
