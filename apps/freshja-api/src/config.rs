use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use std::time::Duration;

pub use core_config::Environment;

/// How often expired password reset codes are dropped
pub const RESET_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound for cleanup after the shutdown signal
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application configuration composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?.with_app_name("freshja-api");
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            environment,
        })
    }

    /// The seed routes exist only outside production
    pub fn seed_enabled(&self) -> bool {
        self.environment.is_development()
    }
}
