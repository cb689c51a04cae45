//! API keys for vision providers.
//!
//! A key is wrapped in [`SecretString`] as soon as it is read and is only
//! reachable through [`ApiCredential::expose`]. `Debug` never prints it.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// A provider API key.
pub struct ApiCredential(SecretString);

impl ApiCredential {
    /// Read `settings[key]`, or the `env_var` environment variable when the
    /// setting is missing or blank.
    ///
    /// A blank key in the settings does not hide a real one in the environment.
    pub fn from_config_or_env(
        settings: &JsonValue,
        key: &str,
        env_var: &str,
    ) -> Result<Self, ProviderError> {
        let configured = settings
            .get(key)
            .and_then(JsonValue::as_str)
            .filter(|value| !value.trim().is_empty());
        if let Some(value) = configured {
            return Ok(Self::from(value));
        }

        match std::env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self::from(value)),
            _ => Err(ProviderError::NotConfigured(format!(
                "API key required: set '{key}' in provider settings or {env_var}"
            ))),
        }
    }

    /// The raw key, for the request that needs it.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl From<String> for ApiCredential {
    fn from(value: String) -> Self {
        Self(SecretString::from(value))
    }
}

impl From<&str> for ApiCredential {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_debug_is_redacted() {
        let secret = "AIza-super-secret-key-12345";
        let debug = format!("{:?}", ApiCredential::from(secret));
        assert!(!debug.contains(secret));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_blank_key_is_empty() {
        assert!(ApiCredential::from("  ").is_empty());
        assert!(!ApiCredential::from("key-123").is_empty());
        assert_eq!(ApiCredential::from("key-123").expose(), "key-123");
    }

    #[test]
    fn test_settings_key_wins_over_env() {
        std::env::set_var("INSPECTOR_TEST_KEY_PRIORITY", "env-key");
        let credential = ApiCredential::from_config_or_env(
            &json!({ "api_key": "settings-key" }),
            "api_key",
            "INSPECTOR_TEST_KEY_PRIORITY",
        )
        .unwrap();
        assert_eq!(credential.expose(), "settings-key");
        std::env::remove_var("INSPECTOR_TEST_KEY_PRIORITY");
    }

    #[test]
    fn test_blank_settings_key_reads_env() {
        std::env::set_var("INSPECTOR_TEST_KEY_BLANK", "env-key");
        let credential = ApiCredential::from_config_or_env(
            &json!({ "api_key": "   " }),
            "api_key",
            "INSPECTOR_TEST_KEY_BLANK",
        )
        .unwrap();
        assert_eq!(credential.expose(), "env-key");
        std::env::remove_var("INSPECTOR_TEST_KEY_BLANK");
    }

    #[test]
    fn test_missing_key_names_both_sources() {
        let err = ApiCredential::from_config_or_env(
            &json!({}),
            "api_key",
            "INSPECTOR_NONEXISTENT_VAR_12345",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'api_key'"));
        assert!(message.contains("INSPECTOR_NONEXISTENT_VAR_12345"));
    }
}
