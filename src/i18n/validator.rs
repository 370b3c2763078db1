//! Dictionary consistency validation.
//!
//! After both dictionaries are preloaded they are compared key by key so that
//! gaps in the server's translation tables show up in the logs instead of as
//! untranslated strings on the page.

use crate::i18n::{Dictionary, Language};

/// Validation report containing errors and warnings about a dictionary pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that leave the switcher relying entirely on built-in strings
    pub errors: Vec<String>,

    /// Gaps that make individual elements fall back to their current text
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Maximum number of keys listed in a single warning.
const MAX_LISTED_KEYS: usize = 10;

pub struct DictionaryValidator;

impl DictionaryValidator {
    /// Compare two fetched dictionaries.
    ///
    /// Checks that:
    /// - every key of one language exists in the other
    /// - no value is empty
    /// - each dictionary carries at least one of the switcher's own keys
    pub fn validate(
        first: (Language, &Dictionary),
        second: (Language, &Dictionary),
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        for ((language, dictionary), (other_language, other)) in
            [(first, second), (second, first)]
        {
            let missing = Self::missing_keys(other, dictionary);
            if !missing.is_empty() {
                report.warnings.push(format!(
                    "{} dictionary is missing {} key(s) present in {}: {}",
                    language.name(),
                    missing.len(),
                    other_language.name(),
                    Self::list(&missing)
                ));
            }

            let mut empty: Vec<&str> = dictionary
                .iter()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|(key, _)| key)
                .collect();
            empty.sort_unstable();
            if !empty.is_empty() {
                report.warnings.push(format!(
                    "{} dictionary has {} empty value(s): {}",
                    language.name(),
                    empty.len(),
                    Self::list(&empty)
                ));
            }

            let knows_builtin_keys = language
                .fallback()
                .entries()
                .iter()
                .any(|(key, _)| dictionary.contains_key(key));
            if !knows_builtin_keys {
                report.errors.push(format!(
                    "{} dictionary defines none of the language switcher keys",
                    language.name()
                ));
            }
        }

        report
    }

    /// Keys of `reference` absent from `dictionary`, sorted.
    fn missing_keys<'a>(reference: &'a Dictionary, dictionary: &Dictionary) -> Vec<&'a str> {
        let mut missing: Vec<&str> = reference
            .keys()
            .filter(|key| !dictionary.contains_key(key))
            .collect();
        missing.sort_unstable();
        missing
    }

    fn list(keys: &[&str]) -> String {
        let mut listed = keys
            .iter()
            .take(MAX_LISTED_KEYS)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if keys.len() > MAX_LISTED_KEYS {
            listed.push_str(&format!(" (+{} more)", keys.len() - MAX_LISTED_KEYS));
        }
        listed
    }
}
