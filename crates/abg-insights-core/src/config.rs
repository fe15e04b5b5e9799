//! Runtime configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "abg_insights_core=info,abg_insights_llm=info";

/// Failure reason used when the AI call fails without a message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "An error occurred during analysis";

pub const LOG_FILTER_ENV: &str = "ABG_INSIGHTS_LOG";
pub const FAILURE_MESSAGE_ENV: &str = "ABG_INSIGHTS_FAILURE_MESSAGE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    /// `tracing` env-filter directive
    pub log_filter: String,
    /// Fallback failure reason for errors that carry no message
    pub failure_message: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by any set environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from JSON; missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(message) = lookup(FAILURE_MESSAGE_ENV).filter(|v| !v.trim().is_empty()) {
            config.failure_message = message;
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_message.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "failure_message",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.failure_message, DEFAULT_FAILURE_MESSAGE);
        assert!(config.log_filter.contains("abg_insights_core"));
    }

    #[test]
    fn test_from_json_partial() {
        let config = CoreConfig::from_json(r#"{"log_filter":"debug"}"#).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.failure_message, DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_from_json_rejects_empty_message() {
        let result = CoreConfig::from_json(r#"{"failure_message":"  "}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { field: "failure_message", .. })));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = CoreConfig::from_lookup(|key| match key {
            LOG_FILTER_ENV => Some("trace".into()),
            FAILURE_MESSAGE_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.log_filter, "trace");
        assert_eq!(config.failure_message, DEFAULT_FAILURE_MESSAGE);
    }
}
