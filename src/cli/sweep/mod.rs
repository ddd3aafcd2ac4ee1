//! Sweep command - expires overdue pending invitations
//!
//! Lazy expiry on accept/reject keeps the protocol correct without this;
//! the sweep only freshens list views and reporting.

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Expire overdue pending invitations once and exit
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let state = crate::create_app_state_with_config(&config).await?;
    let count = state.invitation_service.sweep_expired().await?;

    info!("Swept {} expired invitation(s)", count);

    Ok(())
}
