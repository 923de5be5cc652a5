//! ffwrapped settings.
//!
//! Sources are merged with figment, later ones overriding earlier ones:
//! built-in defaults, then the TOML file named by `FFW_CONFIG_FILE`, then
//! `FFW_*` environment variables. Nested keys use `__` as the separator.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{ConfigError, MAX_WEEK};

use crate::cache::DEFAULT_STORAGE_PREFIX;

/// Settings shared by the client and the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Wrapped backend API, including the `/api` segment.
    ///
    /// Set via FFW_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path to the SQLite session store.
    ///
    /// Set via FFW_STORE_PATH. When unset the durable tier is an in-memory
    /// database that ends with the process.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Prefix for every durable cache key.
    ///
    /// Set via FFW_STORAGE_PREFIX environment variable.
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,

    /// Sent as `User-Agent` on every backend request.
    ///
    /// Set via FFW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout in milliseconds.
    ///
    /// Set via FFW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Share one network call among concurrent fetches of the same key.
    ///
    /// Set via FFW_COALESCE_IN_FLIGHT environment variable.
    #[serde(default = "default_true")]
    pub coalesce_in_flight: bool,

    /// Season used when a caller does not name one.
    #[serde(default = "default_year")]
    pub default_year: u16,

    #[serde(default = "default_start_week")]
    pub default_start_week: u8,

    #[serde(default = "default_end_week")]
    pub default_end_week: u8,
}

fn default_api_base_url() -> String {
    "http://localhost:5001/api".into()
}

fn default_storage_prefix() -> String {
    DEFAULT_STORAGE_PREFIX.into()
}

fn default_user_agent() -> String {
    concat!("ffwrapped/", env!("CARGO_PKG_VERSION")).into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

fn default_year() -> u16 {
    2024
}

fn default_start_week() -> u8 {
    1
}

fn default_end_week() -> u8 {
    14
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            store_path: None,
            storage_prefix: default_storage_prefix(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            coalesce_in_flight: true,
            default_year: default_year(),
            default_start_week: default_start_week(),
            default_end_week: default_end_week(),
        }
    }
}

impl AppConfig {
    /// `timeout_ms` as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Merge defaults, the optional TOML file and the environment, then
    /// [`validate`](Self::validate) the result.
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadFailed` when a source cannot be read or a value has
    /// the wrong type; otherwise whatever validation rejects.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FFW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FFW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5001/api");
        assert!(config.store_path.is_none());
        assert_eq!(config.storage_prefix, "ffw_");
        assert!(config.user_agent.starts_with("ffwrapped/"));
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.coalesce_in_flight);
        assert_eq!(config.default_year, 2024);
        assert_eq!((config.default_start_week, config.default_end_week), (1, 14));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FFW_API_BASE_URL", "https://wrapped.example.com/api");
            jail.set_env("FFW_TIMEOUT_MS", "5000");
            jail.set_env("FFW_COALESCE_IN_FLIGHT", "false");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.api_base_url, "https://wrapped.example.com/api");
            assert_eq!(config.timeout_ms, 5000);
            assert!(!config.coalesce_in_flight);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_then_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "ffw.toml",
                r#"
                    store_path = "session.sqlite"
                    default_year = 2023
                    timeout_ms = 1000
                "#,
            )?;
            jail.set_env("FFW_CONFIG_FILE", "ffw.toml");
            jail.set_env("FFW_TIMEOUT_MS", "2500");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.store_path, Some(PathBuf::from("session.sqlite")));
            assert_eq!(config.default_year, 2023);
            assert_eq!(config.timeout_ms, 2500);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FFW_TIMEOUT_MS", "10");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
