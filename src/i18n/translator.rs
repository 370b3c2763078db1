use crate::i18n::{Dictionary, Language};
use std::sync::Arc;

/// A snapshot of one language's strings used to resolve keys.
///
/// Lookup order for `translate(key, fallback)`:
/// 1. the language's loaded dictionary, when one is loaded
/// 2. the language's built-in fallback strings
/// 3. the caller-supplied `fallback`
/// 4. `key` itself, verbatim
///
/// Every step is infallible, so `translate` always produces a string.
#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    dictionary: Option<Arc<Dictionary>>,
}

impl Translator {
    pub fn new(language: Language, dictionary: Option<Arc<Dictionary>>) -> Self {
        Self {
            language,
            dictionary,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Resolve `key`, or `None` when neither the dictionary nor the built-in
    /// strings know it.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.dictionary
            .as_deref()
            .and_then(|dictionary| dictionary.get(key))
            .or_else(|| self.language.fallback().get(key))
    }

    pub fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        self.lookup(key).or(fallback).unwrap_or(key).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::keys;
    use proptest::prelude::*;

    fn hausa() -> Translator {
        let dictionary: Dictionary = [("greeting", "Sannu"), (keys::LOADING, "Ana jira...")]
            .into_iter()
            .collect();
        Translator::new(Language::HAUSA, Some(Arc::new(dictionary)))
    }

    #[test]
    fn test_dictionary_wins() {
        let translator = hausa();
        assert_eq!(translator.translate("greeting", None), "Sannu");
        // Fetched strings override the built-in ones.
        assert_eq!(translator.translate(keys::LOADING, None), "Ana jira...");
    }

    #[test]
    fn test_builtin_strings_fill_gaps() {
        assert_eq!(hausa().translate(keys::TOGGLE_LABEL, None), "Canja Harshe");
    }

    #[test]
    fn test_without_dictionary_uses_builtin() {
        let translator = Translator::new(Language::ENGLISH, None);
        assert_eq!(translator.translate(keys::TOGGLE_LABEL, None), "Change Language");
    }

    #[test]
    fn test_caller_fallback_before_key() {
        assert_eq!(hausa().translate("farewell", Some("Sai anjima")), "Sai anjima");
    }

    #[test]
    fn test_unknown_key_returned_verbatim() {
        assert_eq!(hausa().translate("dashboard_title", None), "dashboard_title");
        assert_eq!(hausa().lookup("dashboard_title"), None);
    }

    proptest! {
        #[test]
        fn prop_unknown_keys_translate_to_themselves(key in "[a-z]{1,12}_x_[a-z0-9_]{0,12}") {
            let translator = hausa();
            prop_assert_eq!(translator.translate(&key, None), key);
        }

        #[test]
        fn prop_caller_fallback_used_for_unknown_keys(
            key in "unknown_[a-z_]{0,16}",
            fallback in "\\PC{0,24}",
        ) {
            let translator = Translator::new(Language::ENGLISH, None);
            prop_assert_eq!(translator.translate(&key, Some(&fallback)), fallback);
        }
    }
}
