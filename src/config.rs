//! Client configuration.

use crate::error::{RetouchError, Result};

/// The single supported Gemini image model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Environment variable overriding the API endpoint.
pub const BASE_URL_ENV_VAR: &str = "RETOUCH_BASE_URL";

/// Explicit configuration for the generation client.
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API base URL, without trailing slash.
    pub base_url: String,
}

impl ClientConfig {
    /// Creates a config for the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// Intended to be called once at startup; components receive the
    /// resulting config explicitly.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                RetouchError::Config(format!(
                    "no API key found; set {}",
                    API_KEY_ENV_VARS.join(" or ")
                ))
            })?;

        let mut config = Self::new(api_key.trim());
        if let Some(base_url) = lookup(BASE_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("key");
        assert_eq!(config.model, "gemini-2.5-flash-image");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_google_api_key_preferred() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g"), ("API_KEY", "a")]))
                .unwrap();
        assert_eq!(config.api_key, "g");
    }

    #[test]
    fn test_falls_back_to_api_key() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "  "),
            ("API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "fallback");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, RetouchError::Config(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("RETOUCH_BASE_URL", "http://localhost:8080/v1beta/"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", ClientConfig::new("secret-key"));
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
