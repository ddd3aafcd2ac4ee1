//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseConfig, InvitationsConfig, LogFormat, LoggingConfig,
    ServerConfig,
};
