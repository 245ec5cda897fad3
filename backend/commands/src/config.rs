use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, anyhow};
use lambdabot_core::BotError;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Credentials and client settings for the built-in command handlers.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// OpenWeatherMap API key (`weather`, `forecast`)
    pub openweathermap_api_key: Option<String>,
    /// ENTSO-E transparency platform token (`sahko2`)
    pub entsoe_api_key: Option<String>,
    /// Wolfram|Alpha app id (`wa`)
    pub wolfram_alpha_api_key: Option<String>,
    /// Redis host:port holding the price time series (`sahko`)
    pub redis_addr: Option<String>,
    pub redis_password: Option<String>,
    /// Per-request timeout for upstream HTTP calls
    pub http_timeout: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            openweathermap_api_key: None,
            entsoe_api_key: None,
            wolfram_alpha_api_key: None,
            redis_addr: None,
            redis_password: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl HandlerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a provided variable map (useful for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, BotError> {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let http_timeout = match get("LAMBDABOT_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    BotError::Config(format!(
                        "LAMBDABOT_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            openweathermap_api_key: get("OPENWEATHERMAP_API_KEY"),
            entsoe_api_key: get("ENTSOE_API_KEY"),
            wolfram_alpha_api_key: get("WOLFRAM_ALPHA_API_KEY"),
            redis_addr: get("REDIS_ADDR"),
            redis_password: get("REDIS_PASSWORD"),
            http_timeout,
        })
    }
}

/// Unwrap a credential that a handler cannot run without.
pub(crate) fn require<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| anyhow!("{var} environment variable not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = HandlerConfig::from_vars(&HashMap::new()).unwrap();
        assert!(config.openweathermap_api_key.is_none());
        assert!(config.redis_addr.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_reads_keys() {
        let config = HandlerConfig::from_vars(&vars(&[
            ("OPENWEATHERMAP_API_KEY", "owm"),
            ("ENTSOE_API_KEY", "entsoe"),
            ("WOLFRAM_ALPHA_API_KEY", "wa"),
            ("REDIS_ADDR", "localhost:6379"),
            ("REDIS_PASSWORD", ""),
            ("LAMBDABOT_HTTP_TIMEOUT_SECS", " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.openweathermap_api_key.as_deref(), Some("owm"));
        assert_eq!(config.entsoe_api_key.as_deref(), Some("entsoe"));
        assert_eq!(config.wolfram_alpha_api_key.as_deref(), Some("wa"));
        assert_eq!(config.redis_addr.as_deref(), Some("localhost:6379"));
        // Empty values count as unset.
        assert!(config.redis_password.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_timeout() {
        let err = HandlerConfig::from_vars(&vars(&[("LAMBDABOT_HTTP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().contains("LAMBDABOT_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_require_names_the_variable() {
        let err = require(&None, "ENTSOE_API_KEY").unwrap_err();
        assert_eq!(err.to_string(), "ENTSOE_API_KEY environment variable not set");
        assert_eq!(require(&Some("k".into()), "ENTSOE_API_KEY").unwrap(), "k");
    }
}
