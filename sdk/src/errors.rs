//! Error types and handling
//!
//! This module provides the error types used throughout the Persona engine.
//! All errors implement the `PersonaErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Safety of messages
//!
//! Hints are static strings. They never echo content payloads, player answers
//! or store URLs, so they are safe to surface in logs shipped off-host and in
//! CLI output.

use thiserror::Error;

/// Trait for Persona error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait PersonaErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried on the next turn. Non-recoverable
    /// errors typically require an operator to fix configuration or content.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Content**: the content store could not be reached or returned garbage
/// - **Validation**: content is present but unusable (e.g. no outcomes)
/// - **Session**: the persisted session record is missing data the turn needs
/// - **Dispatch**: the platform named an action this engine does not know
/// - **Configuration**: invalid or missing configuration
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, PersonaErrorExt};
///
/// let error = EngineError::UnknownAction("DANCE".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Validation("no outcomes".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Content store errors
    #[error("Content fetch failed for {collection}: {reason}")]
    ContentFetch { collection: String, reason: String },

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    // Session errors
    #[error("Session error: {0}")]
    Session(String),

    // Dispatch errors
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Shorthand for a content fetch failure on a named collection
    pub fn content_fetch(collection: impl Into<String>, reason: impl ToString) -> Self {
        Self::ContentFetch {
            collection: collection.into(),
            reason: reason.to_string(),
        }
    }
}

impl PersonaErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::ContentFetch { .. } => "Content store unavailable. Check the content source",
            Self::Validation(_) => "Quiz content is incomplete. Check the content bundle",
            Self::InvalidPrompt(_) => "A prompt is missing text. Check the prompt sheet",

            Self::Session(_) => "Session state was incomplete. Start a new quiz",

            Self::UnknownAction(_) => "The platform requested an unsupported action",
            Self::MalformedRequest(_) => "The platform sent a request that could not be read",

            Self::Network(_) => "Network operation failed. Check your connection",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Content and configuration problems persist until an operator acts
            Self::Config(_) | Self::Validation(_) | Self::InvalidPrompt(_) => false,

            _ => true,
        }
    }
}
