use thiserror::Error;

use crate::page::ElementHandle;

/// Errors raised while committing a language switch or driving the switcher lifecycle.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("Unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    #[error("Language switcher is not initialized")]
    NotInitialized,

    #[error("Language switcher initialization is already running")]
    InitializationInProgress,

    #[error("Language switcher has been disposed")]
    Disposed,

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from the translation endpoints.
///
/// These never leave the switcher: every variant degrades to the built-in
/// fallback dictionary or is logged and dropped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Translation API error ({status}) for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed translation payload from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("Translation payload from {url} was empty")]
    Empty { url: String },
}

impl FetchError {
    /// Transport failures, rate limits and server errors are worth another attempt.
    /// Client errors and bad payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Malformed { .. } | FetchError::Empty { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Element {0:?} is no longer attached to the page")]
    Detached(ElementHandle),

    #[error("Page rejected write to {target}: {reason}")]
    WriteRejected { target: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}
