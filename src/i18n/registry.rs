//! Language registry: Single source of truth for the supported languages.
//!
//! The registry is a lazily initialized singleton (`OnceLock`) holding the
//! metadata and built-in fallback strings of every language.

use crate::i18n::fallback::{ENGLISH_FALLBACK, HAUSA_FALLBACK};
use crate::i18n::FallbackStrings;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "ha")
    pub code: &'static str,

    /// English name of the language (e.g., "Hausa")
    pub name: &'static str,

    /// Native name of the language, shown in the current-language indicator
    pub native_name: &'static str,

    /// Whether this is the canonical language (only one should be true)
    pub is_canonical: bool,

    /// Strings used when the dictionary for this language cannot be fetched
    pub fallback: &'static FallbackStrings,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its exact code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// English (canonical) and Hausa.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            fallback: &ENGLISH_FALLBACK,
        },
        LanguageConfig {
            code: "ha",
            name: "Hausa",
            native_name: "Hausa",
            is_canonical: false,
            fallback: &HAUSA_FALLBACK,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_hausa() {
        let config = LanguageRegistry::get()
            .get_by_code("ha")
            .expect("Hausa should be registered");

        assert_eq!(config.code, "ha");
        assert_eq!(config.name, "Hausa");
        assert!(!config.is_canonical);
        assert_eq!(config.fallback.loading, "Ana loda...");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("es").is_none());
    }

    #[test]
    fn test_canonical_returns_english() {
        let canonical = LanguageRegistry::get().canonical();
        assert_eq!(canonical.code, "en");
    }
}
