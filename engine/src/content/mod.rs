//! Content access for the dialogue
//!
//! `ContentClient` sits between the dialogue handlers and a `ContentStore`.
//! It scopes every read to the turn's locale, expands prompt names into their
//! stored variants, and normalizes raw documents (prompt speech wrapping,
//! sheet-shaped settings values).
//!
//! Random picks are split from fetching: `prompt_candidates` is async and
//! borrows nothing mutable, so several prompts can be fetched concurrently
//! before one `pick_prompt` per name draws from the turn's RNG.

pub mod http_store;
pub mod prompts;
pub mod static_store;

pub use http_store::HttpContentStore;
pub use prompts::PromptName;
pub use static_store::StaticContentStore;

use futures::future::try_join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use sdk::errors::EngineError;
use sdk::types::{Outcome, Prompt, Question, QuizIntro};
use sdk::{ContentStore, RawSettings};
use serde_json::Value;
use std::sync::Arc;

/// Key inside a sheet settings row that holds the actual value
const SETTINGS_VALUE_KEY: &str = "value";

/// Locale-scoped view of a content store
#[derive(Clone)]
pub struct ContentClient {
    store: Arc<dyn ContentStore>,
    locale: String,
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("store", &self.store.name())
            .field("locale", &self.locale)
            .finish()
    }
}

impl ContentClient {
    pub fn new(store: Arc<dyn ContentStore>, locale: impl Into<String>) -> Self {
        Self {
            store,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub async fn get_all_questions(&self) -> Result<Vec<Question>, EngineError> {
        self.store.questions(&self.locale).await
    }

    pub async fn get_all_outcomes(&self) -> Result<Vec<Outcome>, EngineError> {
        self.store.outcomes(&self.locale).await
    }

    pub async fn get_all_intros(&self) -> Result<Vec<QuizIntro>, EngineError> {
        self.store.intros(&self.locale).await
    }

    /// Raw settings with sheet row shapes unwrapped
    ///
    /// A settings cell may arrive as a bare value, a `{ "value": x }` row, or
    /// a list of either; only the first element of a list is used.
    pub async fn get_quiz_settings(&self) -> Result<RawSettings, EngineError> {
        let raw = self.store.settings(&self.locale).await?;
        Ok(raw
            .into_iter()
            .map(|(key, value)| {
                let first = match value {
                    Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
                    other => other,
                };
                let cell = match first {
                    Value::Object(mut row) => row.remove(SETTINGS_VALUE_KEY).unwrap_or(Value::Null),
                    other => other,
                };
                (key, cell)
            })
            .filter(|(_, value)| !value.is_null())
            .collect())
    }

    /// All stored variants of a prompt that have displayed text
    pub async fn prompt_candidates(&self, name: PromptName) -> Result<Vec<Prompt>, EngineError> {
        let keys = name.variant_keys();
        let fetched = try_join_all(
            keys.iter()
                .map(|key| self.store.prompt(&self.locale, key)),
        )
        .await?;
        Ok(fetched
            .into_iter()
            .flatten()
            .map(|p| Prompt::from_parts(&p.text, Some(&p.speech)))
            .filter(|p| !p.text.is_empty())
            .collect())
    }
}

/// Draw one prompt uniformly from its candidates
pub fn pick_prompt<R: Rng + ?Sized>(
    name: PromptName,
    candidates: Vec<Prompt>,
    rng: &mut R,
) -> Result<Prompt, EngineError> {
    candidates.choose(rng).cloned().ok_or_else(|| {
        EngineError::InvalidPrompt(format!("no usable variant for {}", name.key()))
    })
}

/// Draw one intro uniformly
pub fn pick_intro<R: Rng + ?Sized>(
    intros: Vec<QuizIntro>,
    rng: &mut R,
) -> Result<QuizIntro, EngineError> {
    intros
        .choose(rng)
        .cloned()
        .ok_or_else(|| EngineError::Validation("no quiz intros".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sdk::bundle::{ContentBundle, LocaleContent};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn client() -> ContentClient {
        let mut prompts = BTreeMap::new();
        prompts.insert(
            "transitions_regular_variant_1".to_string(),
            Prompt {
                text: "Next!".into(),
                speech: String::new(),
            },
        );
        prompts.insert(
            "transitions_regular_variant_2".to_string(),
            Prompt::default(),
        );
        let settings = json!({
            "questionsPerQuiz": [{"value": 5}],
            "introTitle": {"value": "Hi"},
            "font": "Roboto",
            "empty": [],
        });
        let mut locales = BTreeMap::new();
        locales.insert(
            "en".to_string(),
            LocaleContent {
                prompts,
                settings: settings.as_object().cloned().unwrap_or_default(),
                ..Default::default()
            },
        );
        let store = StaticContentStore::new(ContentBundle {
            default_locale: "en".into(),
            locales,
        });
        ContentClient::new(Arc::new(store), "en-US")
    }

    #[tokio::test]
    async fn test_prompt_candidates_skip_empty_variants() {
        let candidates = client()
            .prompt_candidates(PromptName::TransitionsRegular)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].speech, "<speak>Next!</speak>");
    }

    #[tokio::test]
    async fn test_missing_prompt_is_invalid() {
        let candidates = client()
            .prompt_candidates(PromptName::GenericYes)
            .await
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            pick_prompt(PromptName::GenericYes, candidates, &mut rng),
            Err(EngineError::InvalidPrompt(_))
        ));
    }

    #[tokio::test]
    async fn test_settings_rows_are_unwrapped() {
        let settings = client().get_quiz_settings().await.unwrap();
        assert_eq!(settings["questionsPerQuiz"], json!(5));
        assert_eq!(settings["introTitle"], json!("Hi"));
        assert_eq!(settings["font"], json!("Roboto"));
        assert_eq!(settings["empty"], json!([]));
    }
}
