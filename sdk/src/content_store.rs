//! Content store trait
//!
//! This module defines the `ContentStore` trait that every content backend
//! must implement. The engine only ever talks to content through this trait,
//! so a store can be an in-memory bundle, a remote document service or a test
//! double.

use crate::errors::EngineError;
use crate::types::{Outcome, Prompt, Question, QuizIntro};
use async_trait::async_trait;

/// Raw key/value quiz settings as stored in the content source
pub type RawSettings = serde_json::Map<String, serde_json::Value>;

/// Trait that all content backends must implement
///
/// All methods are locale-scoped. Collections that exist but are empty return
/// `Ok(vec![])`; only transport or decoding failures are errors.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Returns the name of the backend, for logs
    fn name(&self) -> &str;

    /// All intro documents for a locale
    async fn intros(&self, locale: &str) -> Result<Vec<QuizIntro>, EngineError>;

    /// All question documents for a locale
    async fn questions(&self, locale: &str) -> Result<Vec<Question>, EngineError>;

    /// All outcome documents for a locale
    async fn outcomes(&self, locale: &str) -> Result<Vec<Outcome>, EngineError>;

    /// Raw quiz settings for a locale
    async fn settings(&self, locale: &str) -> Result<RawSettings, EngineError>;

    /// A single prompt row by sheet key, `None` when the key is absent
    async fn prompt(&self, locale: &str, key: &str) -> Result<Option<Prompt>, EngineError>;
}
