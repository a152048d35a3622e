//! In-memory content store backed by a `ContentBundle`

use async_trait::async_trait;
use sdk::bundle::{ContentBundle, LocaleContent};
use sdk::errors::EngineError;
use sdk::types::{Outcome, Prompt, Question, QuizIntro};
use sdk::{ContentStore, RawSettings};
use std::path::Path;

/// Serves a bundle loaded once at startup
#[derive(Debug, Clone)]
pub struct StaticContentStore {
    bundle: ContentBundle,
}

impl StaticContentStore {
    pub fn new(bundle: ContentBundle) -> Self {
        Self { bundle }
    }

    /// Load and validate a JSON bundle from disk
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        let bundle = ContentBundle::from_json(&json)
            .map_err(|e| EngineError::Validation(format!("bundle is not valid JSON: {}", e)))?;
        bundle.validate()?;
        tracing::info!(
            "Loaded content bundle with {} locale(s)",
            bundle.locales.len()
        );
        Ok(Self::new(bundle))
    }

    pub fn bundle(&self) -> &ContentBundle {
        &self.bundle
    }

    fn content(&self, locale: &str, collection: &str) -> Result<&LocaleContent, EngineError> {
        self.bundle.locale(locale).ok_or_else(|| {
            EngineError::content_fetch(collection, format!("no content for locale {}", locale))
        })
    }
}

#[async_trait]
impl ContentStore for StaticContentStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn intros(&self, locale: &str) -> Result<Vec<QuizIntro>, EngineError> {
        Ok(self.content(locale, "intros")?.intros.clone())
    }

    async fn questions(&self, locale: &str) -> Result<Vec<Question>, EngineError> {
        Ok(self.content(locale, "questions")?.questions.clone())
    }

    async fn outcomes(&self, locale: &str) -> Result<Vec<Outcome>, EngineError> {
        Ok(self.content(locale, "outcomes")?.outcomes.clone())
    }

    async fn settings(&self, locale: &str) -> Result<RawSettings, EngineError> {
        Ok(self.content(locale, "settings")?.settings.clone())
    }

    async fn prompt(&self, locale: &str, key: &str) -> Result<Option<Prompt>, EngineError> {
        Ok(self.content(locale, "prompts")?.prompts.get(key).cloned())
    }
}
