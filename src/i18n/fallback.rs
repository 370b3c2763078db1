use crate::i18n::Dictionary;

/// Dictionary keys the switcher itself renders.
pub mod keys {
    /// Label on the language toggle button
    pub const TOGGLE_LABEL: &str = "general_toggle_language";

    /// Tooltip / aria-label on the language toggle button
    pub const TOGGLE_TOOLTIP: &str = "general_language_toggle_tooltip";

    /// Label shown on the toggle while a switch is loading
    pub const LOADING: &str = "general_loading";

    /// Notification after a successful switch
    pub const LANGUAGE_CHANGED: &str = "general_language_changed";

    pub const ERROR: &str = "general_error";
    pub const SUCCESS: &str = "general_success";

    /// Notification after a switch that could not be applied
    pub const SWITCH_FAILED: &str = "general_language_switch_failed";
}

/// Built-in strings for one language.
///
/// These cover only what the switcher needs to stay usable when the
/// translation endpoint is unreachable.
#[derive(Debug, Clone)]
pub struct FallbackStrings {
    pub toggle_label: &'static str,
    pub toggle_tooltip: &'static str,
    pub loading: &'static str,
    pub language_changed: &'static str,
    pub error: &'static str,
    pub success: &'static str,
    pub switch_failed: &'static str,
}

impl FallbackStrings {
    /// All strings paired with their dictionary keys.
    pub fn entries(&self) -> [(&'static str, &'static str); 7] {
        [
            (keys::TOGGLE_LABEL, self.toggle_label),
            (keys::TOGGLE_TOOLTIP, self.toggle_tooltip),
            (keys::LOADING, self.loading),
            (keys::LANGUAGE_CHANGED, self.language_changed),
            (keys::ERROR, self.error),
            (keys::SUCCESS, self.success),
            (keys::SWITCH_FAILED, self.switch_failed),
        ]
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// Build the fallback dictionary cached in place of a failed fetch.
    pub fn to_dictionary(&self) -> Dictionary {
        self.entries().into_iter().collect()
    }
}

// ==================== English Strings ====================

pub const ENGLISH_FALLBACK: FallbackStrings = FallbackStrings {
    toggle_label: "Change Language",
    toggle_tooltip: "Toggle to switch between available languages",
    loading: "Loading...",
    language_changed: "Language updated successfully",
    error: "Error",
    success: "Success",
    switch_failed: "Could not change the language. Please try again.",
};

// ==================== Hausa Strings ====================

pub const HAUSA_FALLBACK: FallbackStrings = FallbackStrings {
    toggle_label: "Canja Harshe",
    toggle_tooltip: "Danna don canza harshe",
    loading: "Ana loda...",
    language_changed: "An sabunta harshe cikin nasara",
    error: "Kuskure",
    success: "Nasara",
    switch_failed: "Ba a iya canza harshe ba. Da fatan za a sake gwadawa.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_empty_strings() {
        for strings in [&ENGLISH_FALLBACK, &HAUSA_FALLBACK] {
            for (key, value) in strings.entries() {
                assert!(!value.is_empty(), "{} is empty", key);
            }
        }
    }

    #[test]
    fn test_languages_differ() {
        for ((key, en), (_, ha)) in ENGLISH_FALLBACK
            .entries()
            .into_iter()
            .zip(HAUSA_FALLBACK.entries())
        {
            assert_ne!(en, ha, "{} is not translated", key);
        }
    }

    #[test]
    fn test_get_by_key() {
        assert_eq!(HAUSA_FALLBACK.get(keys::TOGGLE_LABEL), Some("Canja Harshe"));
        assert_eq!(ENGLISH_FALLBACK.get(keys::LOADING), Some("Loading..."));
        assert_eq!(ENGLISH_FALLBACK.get("dashboard_title"), None);
    }

    #[test]
    fn test_to_dictionary_contains_every_key() {
        let dictionary = HAUSA_FALLBACK.to_dictionary();
        assert_eq!(dictionary.len(), 7);
        assert_eq!(dictionary.get(keys::ERROR), Some("Kuskure"));
    }
}
