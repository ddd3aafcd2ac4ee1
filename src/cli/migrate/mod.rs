//! Migrate command - applies pending database migrations

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{migrations, PostgresMigrator};

/// Run all pending migrations against the configured database
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let database_url = crate::database_url(&config)?;

    info!("Connecting to PostgreSQL...");
    let pool = sqlx::PgPool::connect(&database_url).await?;

    migrations::run_migrations(&pool).await?;

    let version = PostgresMigrator::new(pool).current_version().await?;
    info!("Migrations complete, schema version: {:?}", version);

    Ok(())
}
