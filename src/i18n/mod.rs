//! Internationalization (i18n) module.
//!
//! Everything language-related that does not touch the page lives here.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the two supported languages
//! - `language`: Type-safe `Language` validated against the registry
//! - `fallback`: Built-in strings used when a dictionary cannot be fetched
//! - `dictionary`: Fetched key→string tables
//! - `translator`: The key lookup policy
//! - `validator`: Cross-language dictionary consistency checks
//! - `metrics`: Switch observability counters
//!
//! # Example
//!
//! ```rust
//! use instant_language_switch::i18n::{Language, Translator};
//!
//! let hausa = Language::from_code("ha").unwrap();
//! assert_eq!(hausa.other(), Language::ENGLISH);
//!
//! let translator = Translator::new(hausa, None);
//! assert_eq!(translator.translate("general_toggle_language", None), "Canja Harshe");
//! ```

mod dictionary;
mod fallback;
mod language;
mod metrics;
mod registry;
mod translator;
mod validator;

pub use dictionary::Dictionary;
pub use fallback::{keys, FallbackStrings, ENGLISH_FALLBACK, HAUSA_FALLBACK};
pub use language::Language;
pub use metrics::{MetricsReport, SwitchMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use translator::Translator;
pub use validator::{DictionaryValidator, ValidationReport};
