//! Content bundle types
//!
//! A bundle is the on-disk/export form of all quiz content, keyed by locale.
//! It is what the sheet converter emits and what the static content store
//! serves from memory.

use crate::errors::EngineError;
use crate::types::{Outcome, Prompt, Question, QuizIntro};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All content for every supported locale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBundle {
    /// Locale used when a request names one the bundle does not carry
    #[serde(default = "default_locale")]
    pub default_locale: String,
    pub locales: BTreeMap<String, LocaleContent>,
}

fn default_locale() -> String {
    "en".to_string()
}

/// Content for a single locale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleContent {
    #[serde(default)]
    pub intros: Vec<QuizIntro>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    /// Raw quiz settings, merged into session settings by key
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    /// General prompts by sheet key (`transitions_regular_variant_2`, ...)
    #[serde(default)]
    pub prompts: BTreeMap<String, Prompt>,
}

impl ContentBundle {
    /// Get the content for a locale
    ///
    /// Lookup tries the exact tag, then its language subtag (`en-US` -> `en`),
    /// then the bundle's default locale.
    pub fn locale(&self, locale: &str) -> Option<&LocaleContent> {
        let language = locale.split(['-', '_']).next().unwrap_or(locale);
        self.locales
            .get(locale)
            .or_else(|| self.locales.get(language))
            .or_else(|| self.locales.get(&self.default_locale))
    }

    /// Parse bundle from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize bundle to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check the bundle can drive a full quiz in every locale
    ///
    /// A locale needs at least one question with both answer lists filled,
    /// and at least one outcome.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.locales.is_empty() {
            return Err(EngineError::Validation("bundle has no locales".to_string()));
        }
        for (name, content) in &self.locales {
            if content.questions.is_empty() {
                return Err(EngineError::Validation(format!(
                    "locale {} has no questions",
                    name
                )));
            }
            if content.outcomes.is_empty() {
                return Err(EngineError::Validation(format!(
                    "locale {} has no outcomes",
                    name
                )));
            }
            if let Some(q) = content
                .questions
                .iter()
                .find(|q| q.positive_answers.is_empty() || q.negative_answers.is_empty())
            {
                return Err(EngineError::Validation(format!(
                    "locale {}: question '{}' is missing answers",
                    name, q.question_text
                )));
            }
        }
        Ok(())
    }
}
