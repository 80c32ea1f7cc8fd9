use crate::error::{OrderingError, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Settings for talking to the board backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub api_base_url: String,
    /// Upper bound for a single gateway call; expiry counts as a gateway failure
    #[serde(rename = "request_timeout_ms", with = "duration_millis")]
    pub request_timeout: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl OrderingConfig {
    pub const ENV_API_URL: &'static str = "HLAVI_API_URL";
    pub const ENV_REQUEST_TIMEOUT_MS: &'static str = "HLAVI_REQUEST_TIMEOUT_MS";
    pub const ENV_API_TOKEN: &'static str = "HLAVI_API_TOKEN";

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Loads a JSON config file; missing keys fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from defaults overridden by `HLAVI_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(Self::ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(raw) = lookup(Self::ENV_REQUEST_TIMEOUT_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|_| {
                OrderingError::ConfigError(format!(
                    "{} must be a number of milliseconds, got '{}'",
                    Self::ENV_REQUEST_TIMEOUT_MS,
                    raw
                ))
            })?;
            config.request_timeout = Duration::from_millis(millis);
        }
        if let Some(token) = lookup(Self::ENV_API_TOKEN) {
            config.api_token = Some(token);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(OrderingError::ConfigError(
                "api_base_url must not be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(OrderingError::ConfigError(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(10),
            api_token: None,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = OrderingConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.api_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = OrderingConfig::from_lookup(lookup_from(&[
            ("HLAVI_API_URL", "https://boards.example.com"),
            ("HLAVI_REQUEST_TIMEOUT_MS", "2500"),
            ("HLAVI_API_TOKEN", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://boards.example.com");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_rejects_bad_timeout() {
        let result =
            OrderingConfig::from_lookup(lookup_from(&[("HLAVI_REQUEST_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(OrderingError::ConfigError(_))));

        let result = OrderingConfig::from_lookup(lookup_from(&[("HLAVI_REQUEST_TIMEOUT_MS", "0")]));
        assert!(matches!(result, Err(OrderingError::ConfigError(_))));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: OrderingConfig =
            serde_json::from_str(r#"{ "request_timeout_ms": 750 }"#).unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(750));
        assert_eq!(config.api_base_url, "http://localhost:3000");
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ordering.json");
        std::fs::write(
            &path,
            r#"{ "api_base_url": "http://10.0.0.2:3000", "api_token": "abc" }"#,
        )
        .unwrap();

        let config = OrderingConfig::from_file(&path).unwrap();

        assert_eq!(config.api_base_url, "http://10.0.0.2:3000");
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = OrderingConfig::from_file(temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(OrderingError::IoError(_))));
    }

    #[test]
    fn test_from_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ordering.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = OrderingConfig::from_file(&path);
        assert!(matches!(result, Err(OrderingError::SerializationError(_))));
    }
}
