//! Error handling for Text2Kanji
//!
//! This module provides the error type shared by the message source,
//! conversation store and translation layers. Errors are converted from
//! underlying library errors using `thiserror`.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! Reading the inbox export, copying model files.
//! Automatically converted from `std::io::Error`.
//!
//! ### Serialization Errors
//! Inbox rows and phrase tables that fail to parse.
//! Automatically converted from `serde_json::Error`.
//!
//! ### Domain Errors
//! - `Source`: the message source could not be queried
//! - `Model`: a translation model could not be made available
//! - `Translation`: a translation call failed
//! - `PermissionDenied`: the inbox may not be read
//!
//! Translation pipeline failures are not reported through this type; they are
//! terminal per invocation and carried by
//! [`TranslationFailure`](crate::translation::TranslationFailure).

use thiserror::Error;

/// Result type for Text2Kanji operations
pub type Result<T> = std::result::Result<T, Text2KanjiError>;

/// Message shown when the inbox may not be read
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Permission to read and receive SMS is required to continue.";

/// Errors that can occur while reading the inbox or driving a translation service
///
/// # Examples
///
/// ```rust
/// use text2kanji_core::Text2KanjiError;
///
/// let error = Text2KanjiError::Source("cursor closed".to_string());
/// assert_eq!(error.to_string(), "Message source error: cursor closed");
/// ```
#[derive(Error, Debug)]
pub enum Text2KanjiError {
    /// I/O error (file system, network probe, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The message source could not be queried
    #[error("Message source error: {0}")]
    Source(String),

    /// A translation model could not be downloaded or located
    #[error("Model unavailable: {0}")]
    Model(String),

    /// A translation call failed
    #[error("Translation error: {0}")]
    Translation(String),

    /// Filesystem watcher failure
    #[error("Watch error: {0}")]
    Watch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading or receiving SMS is not permitted
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl Text2KanjiError {
    /// Check if the operation may succeed when the user retries it
    ///
    /// # Examples
    ///
    /// ```rust
    /// use text2kanji_core::Text2KanjiError;
    ///
    /// let error = Text2KanjiError::Model("download interrupted".to_string());
    /// assert!(error.is_recoverable());
    ///
    /// let error = Text2KanjiError::PermissionDenied("READ_SMS".to_string());
    /// assert!(!error.is_recoverable());
    /// ```
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Text2KanjiError::Io(_)
                | Text2KanjiError::Model(_)
                | Text2KanjiError::Translation(_)
                | Text2KanjiError::Source(_)
        )
    }

    /// Get a user-facing message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Text2KanjiError::PermissionDenied(_) => PERMISSION_DENIED_MESSAGE.to_string(),
            Text2KanjiError::Source(msg) => {
                format!("Could not read messages: {}.", msg)
            }
            Text2KanjiError::Model(msg) => {
                format!("Translation model unavailable: {}.", msg)
            }
            Text2KanjiError::Translation(msg) => format!("Translation failed: {}.", msg),
            Text2KanjiError::Configuration(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            Text2KanjiError::Watch(msg) => format!("Inbox watcher stopped: {}.", msg),
            Text2KanjiError::Io(e) => format!("I/O error: {}.", e),
            Text2KanjiError::Json(e) => format!("Data format error: {}.", e),
        }
    }
}
