//! Language type: validated representation of the two supported UI languages.
//!
//! This module provides the `Language` type. Values can only be obtained from
//! the registry-backed constructors, so every `Language` is one of the
//! supported languages.

use crate::error::SwitchError;
use crate::i18n::{FallbackStrings, LanguageConfig, LanguageRegistry};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ha")
    code: &'static str,
}

impl Language {
    /// English, the canonical language the server renders by default.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Hausa.
    pub const HAUSA: Language = Language { code: "ha" };

    /// Both supported languages, canonical first.
    pub const ALL: [Language; 2] = [Language::ENGLISH, Language::HAUSA];

    /// Create a Language from an exact language code.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered
    /// * `Err(SwitchError::UnsupportedLanguage)` otherwise
    pub fn from_code(code: &str) -> Result<Language, SwitchError> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => Err(SwitchError::UnsupportedLanguage(code.to_string())),
        }
    }

    /// Resolve a locale tag as found in storage or a `lang` attribute.
    ///
    /// Case and region subtags are ignored, so `"HA"`, `"en-US"` and
    /// `"en_GB"` all resolve. Returns `None` for anything unsupported.
    pub fn from_tag(tag: &str) -> Option<Language> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        Language::from_code(&primary).ok()
    }

    /// Get the canonical language.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// The language a toggle switches to.
    ///
    /// Only two languages exist, so this is always the complement.
    pub fn other(&self) -> Language {
        if *self == Language::ENGLISH {
            Language::HAUSA
        } else {
            Language::ENGLISH
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for values built through the constructors above.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English name of the language (e.g., "Hausa").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Name of the language in the language itself, shown in indicators.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Built-in strings used when this language's dictionary cannot be fetched.
    pub fn fallback(&self) -> &'static FallbackStrings {
        self.config().fallback
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Language {
    type Err = SwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
