//! Error types shared across the client, controller and preference store.

use thiserror::Error;

/// Why a page could not be fetched.
///
/// Both kinds are terminal for the user action that triggered them; nothing
/// is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The API answered with a non-`ok` status.
    #[error("Error fetching news: {message}")]
    Api { message: String },

    /// The request never produced a readable payload.
    #[error("Failed to fetch news: {message}")]
    Transport { message: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Transport {
            message: e.to_string(),
        }
    }
}

/// Rejections raised by the pagination controller before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Please enter a search term.")]
    EmptyQuery,
}

/// Failures of the persistent preference store.
#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
