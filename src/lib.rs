//! Instant language switching for a server-rendered page.
//!
//! A [`LanguageSwitcher`] keeps the English and Hausa dictionaries in memory
//! and rewrites the marked elements of a [`Page`] when the user toggles the
//! language, instead of reloading the page.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod i18n;
pub mod page;
pub mod refresh;
pub mod retry;
pub mod storage;
pub mod switcher;

pub use client::{HttpTranslationSource, TranslationSource};
pub use config::Config;
pub use error::{FetchError, PageError, StorageError, SwitchError};
pub use events::{LanguageChanged, LanguageEvents, SubscriptionId};
pub use i18n::{Dictionary, Language};
pub use page::{Element, ElementHandle, MemoryPage, Notification, NotificationKind, Page};
pub use storage::{MemorySessionStore, SessionStore};
pub use switcher::{DictionaryOrigin, LanguageSwitcher, Mode, SwitchPhase, ToggleOutcome};
