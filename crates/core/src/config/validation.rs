//! Checks run on a merged `AppConfig` before anything uses it.

use crate::config::AppConfig;
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Last regular-season week the backend accepts.
pub const MAX_WEEK: u8 = 18;

impl AppConfig {
    /// Reject values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `api_base_url` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `api_base_url` is not an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or `storage_prefix` is empty
    /// - the default week range is outside 1..=18 or reversed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "api_base_url".into(),
                hint: "Set FFW_API_BASE_URL environment variable".into(),
            });
        }
        match url::Url::parse(&self.api_base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => {
                return Err(ConfigError::Invalid {
                    field: "api_base_url".into(),
                    reason: format!("unsupported scheme: {}", u.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "api_base_url".into(), reason: e.to_string() });
            }
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.storage_prefix.is_empty() {
            return Err(ConfigError::Invalid { field: "storage_prefix".into(), reason: "must not be empty".into() });
        }

        if self.default_start_week == 0 || self.default_end_week > MAX_WEEK {
            return Err(ConfigError::Invalid {
                field: "default_start_week".into(),
                reason: format!("weeks must be within 1..={MAX_WEEK}"),
            });
        }
        if self.default_start_week > self.default_end_week {
            return Err(ConfigError::Invalid {
                field: "default_end_week".into(),
                reason: "must not precede default_start_week".into(),
            });
        }

        if self.store_path.is_none() {
            tracing::debug!("store_path unset; session store is in-memory and ends with the process");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config = AppConfig { api_base_url: "  ".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "api_base_url"));
    }

    #[test]
    fn test_validate_relative_base_url() {
        let config = AppConfig { api_base_url: "/api".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "api_base_url"));
    }

    #[test]
    fn test_validate_non_http_base_url() {
        let config = AppConfig { api_base_url: "file:///tmp/api".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "api_base_url"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
        let config = AppConfig { timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_empty_prefix() {
        let config = AppConfig { storage_prefix: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "storage_prefix"));
    }

    #[test]
    fn test_validate_week_range() {
        let config = AppConfig { default_start_week: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { default_end_week: 19, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { default_start_week: 10, default_end_week: 9, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "default_end_week"));

        let config = AppConfig { default_start_week: 18, default_end_week: 18, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
