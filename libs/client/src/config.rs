use core_config::{ConfigError, FromEnv, env_or_default};
use std::path::PathBuf;
use std::time::Duration;

pub const API_URL_ENV: &str = "EXPO_PUBLIC_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DATA_DIR_ENV: &str = "FRESHJA_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = ".freshja";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix, without a trailing slash
    pub base_url: String,
    pub timeout: Duration,
    /// Where [`FileStore`](crate::FileStore) keeps the device data
    pub data_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            timeout: REQUEST_TIMEOUT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl FromEnv for ClientConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default(API_URL_ENV, DEFAULT_API_URL);
        if raw.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: API_URL_ENV.to_string(),
                details: "must not be empty".to_string(),
            });
        }
        let data_dir = env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR);
        Ok(Self::new(raw).with_data_dir(data_dir))
    }
}

/// Hosts given without a scheme get `http://`
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        temp_env::with_vars_unset([API_URL_ENV, DATA_DIR_ENV], || {
            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.base_url, DEFAULT_API_URL);
            assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
            assert_eq!(config.timeout, Duration::from_secs(10));
        });
    }

    #[test]
    fn test_url_without_scheme() {
        temp_env::with_var(API_URL_ENV, Some("192.168.1.20:3001/api/"), || {
            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.base_url, "http://192.168.1.20:3001/api");
        });
    }

    #[test]
    fn test_data_dir_from_env() {
        temp_env::with_vars(
            [
                (API_URL_ENV, None),
                (DATA_DIR_ENV, Some("/tmp/freshja-device")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.data_dir, PathBuf::from("/tmp/freshja-device"));
            },
        );
    }

    #[test]
    fn test_empty_url_is_rejected() {
        temp_env::with_var(API_URL_ENV, Some("  "), || {
            assert!(ClientConfig::from_env().is_err());
        });
    }
}
