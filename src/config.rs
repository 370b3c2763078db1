use crate::i18n::Language;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub base_url: String,
    pub csrf_header: String,

    // Session
    pub storage_key: String,
    pub default_language: Language,

    // Dictionary retrieval
    pub fetch_attempts: u32,
    pub fetch_retry_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_language = match std::env::var("LANGUAGE_SWITCH_DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(code.trim())
                .context("LANGUAGE_SWITCH_DEFAULT_LANGUAGE must be 'en' or 'ha'")?,
            Err(_) => defaults.default_language,
        };

        let fetch_attempts = match std::env::var("LANGUAGE_SWITCH_FETCH_ATTEMPTS") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts >= 1)
                .context("LANGUAGE_SWITCH_FETCH_ATTEMPTS must be a positive integer")?,
            Err(_) => defaults.fetch_attempts,
        };

        Ok(Self {
            base_url: std::env::var("LANGUAGE_SWITCH_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            csrf_header: std::env::var("LANGUAGE_SWITCH_CSRF_HEADER")
                .unwrap_or(defaults.csrf_header),
            storage_key: std::env::var("LANGUAGE_SWITCH_STORAGE_KEY")
                .unwrap_or(defaults.storage_key),
            default_language,
            fetch_attempts,
            fetch_retry_delay: std::env::var("LANGUAGE_SWITCH_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_retry_delay),
        })
    }

    /// Endpoint serving the flattened dictionary of `language`.
    pub fn translations_url(&self, language: Language) -> String {
        format!("{}/api/translations/{}", self.base_url, language.code())
    }

    /// Endpoint that stores the language preference in the server session.
    ///
    /// Also the navigation target when instant switching is unavailable.
    pub fn preference_url(&self, language: Language) -> String {
        format!("{}/set_language/{}", self.base_url, language.code())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            storage_key: "currentLanguage".to_string(),
            default_language: Language::canonical(),
            fetch_attempts: 2,
            fetch_retry_delay: Duration::from_millis(250),
        }
    }
}
