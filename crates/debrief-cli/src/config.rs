//! Environment-backed settings, loaded once at process start.

use crate::error::{CliError, Result};
use debrief_llm::openai::DEFAULT_BASE_URL;

/// Environment variable holding the backend credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding the model identifier.
pub const MODEL_VAR: &str = "DEBRIEF_MODEL";

/// Environment variable overriding the backend base URL.
pub const BASE_URL_VAR: &str = "DEBRIEF_BASE_URL";

/// Credential and backend settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Backend API key
    pub api_key: String,
    /// Backend base URL
    pub base_url: String,
    /// Optional model identifier override
    pub model: Option<String>,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// A missing credential fails here, before any generator is
    /// constructed or any network call is attempted.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CliError::Config(format!("{} not set in the environment", API_KEY_VAR))
            })?;

        Ok(Self {
            api_key,
            base_url: lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_credential_fails() {
        let result = Settings::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_blank_credential_fails() {
        let result = Settings::from_lookup(lookup(&[(API_KEY_VAR, "   ")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let settings = Settings::from_lookup(lookup(&[(API_KEY_VAR, "sk-test")])).unwrap();
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(settings.model.is_none());
    }

    #[test]
    fn test_overrides_respected() {
        let settings = Settings::from_lookup(lookup(&[
            (API_KEY_VAR, "sk-test"),
            (MODEL_VAR, "gpt-4o"),
            (BASE_URL_VAR, "http://localhost:8000"),
        ]))
        .unwrap();
        assert_eq!(settings.model.as_deref(), Some("gpt-4o"));
        assert_eq!(settings.base_url, "http://localhost:8000");
    }
}
