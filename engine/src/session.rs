//! Session record
//!
//! The conversational platform stores an opaque parameter bag per session and
//! sends it back on every turn. This module owns the one key of that bag the
//! engine cares about (`data`) and gives it a typed, versioned shape:
//!
//! ```text
//! { "version": 1, "quizSettings": {...}, "count": 0, "limit": 3,
//!   "questions": [...], "traitToWeight": {...} }
//! ```
//!
//! Records written by an older engine, or that fail validation, are replaced
//! by a fresh record rather than failing the turn.

use crate::quiz::QuizState;
use sdk::errors::EngineError;
use sdk::RawSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Version stamped on every record this engine writes
pub const SESSION_VERSION: u32 = 1;

/// Parameter bag key holding the session record
pub const DATA_KEY: &str = "data";

/// Parameter bag key the platform fills with the captured answer slot
pub const USER_ANSWER_KEY: &str = "UserAnswer";

/// Presentation and pacing settings for a quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSettings {
    pub play_intro_confirmation: bool,
    pub questions_per_quiz: usize,
    pub intro_title: String,
    pub intro_subtitle: String,
    pub intro_title_color: String,
    pub intro_subtitle_color: String,
    pub start_button_text: String,
    pub restart_button_text: String,
    pub text_color: String,
    pub font: String,
    pub button_normal_text_color: String,
    pub button_normal_background_color: String,
    pub button_selected_text_color: String,
    pub button_selected_background_color: String,
    pub progress_bar_background_color: String,
    pub progress_bar_fill_color: String,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            play_intro_confirmation: false,
            questions_per_quiz: 3,
            intro_title: String::new(),
            intro_subtitle: String::new(),
            intro_title_color: "#fff".to_string(),
            intro_subtitle_color: "#fff".to_string(),
            start_button_text: "Start".to_string(),
            restart_button_text: "Play Again".to_string(),
            text_color: "#fff".to_string(),
            font: String::new(),
            button_normal_text_color: "#202124".to_string(),
            button_normal_background_color: "#fff".to_string(),
            button_selected_text_color: "#fff".to_string(),
            button_selected_background_color: "#4285f4".to_string(),
            progress_bar_background_color: "#fff".to_string(),
            progress_bar_fill_color: "#f24738".to_string(),
        }
    }
}

impl QuizSettings {
    /// Settings as a JSON object, the shape the canvas `config` expects
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Overlay remote settings onto these
    ///
    /// Only keys that already exist are taken, matched case-insensitively.
    /// Each value is converted to the type of the current value; values that
    /// cannot be converted are skipped with a warning.
    pub fn merge_remote(&mut self, remote: &RawSettings) -> Result<(), EngineError> {
        let mut current = self.to_map();
        let lookup: Vec<(String, String)> = current
            .keys()
            .map(|k| (k.to_lowercase(), k.clone()))
            .collect();

        for (key, value) in remote {
            let lower = key.to_lowercase();
            let Some((_, prop)) = lookup.iter().find(|(l, _)| *l == lower) else {
                debug!("Ignoring unknown quiz setting {}", key);
                continue;
            };
            let Some(existing) = current.get(prop) else {
                continue;
            };
            match convert_like(value, existing) {
                Some(converted) => {
                    current.insert(prop.clone(), converted);
                }
                None => warn!("Skipping quiz setting {}: cannot convert {}", prop, value),
            }
        }

        *self = serde_json::from_value(Value::Object(current))
            .map_err(|e| EngineError::Validation(format!("quiz settings: {}", e)))?;
        Ok(())
    }
}

/// Convert `value` to the JSON type of `like`
fn convert_like(value: &Value, like: &Value) -> Option<Value> {
    match like {
        Value::Bool(_) => match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(Value::Bool(true)),
                "false" | "no" | "0" | "" => Some(Value::Bool(false)),
                _ => None,
            },
            Value::Number(n) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
            _ => None,
        },
        Value::Number(_) => match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .map(Value::from),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
                    .map(Value::from)
            }
            _ => None,
        },
        Value::String(_) => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        _ => None,
    }
}

/// Typed session record stored under `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub quiz_settings: QuizSettings,
    #[serde(flatten)]
    pub quiz: QuizState,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            version: SESSION_VERSION,
            quiz_settings: QuizSettings::default(),
            quiz: QuizState::default(),
        }
    }
}

impl SessionData {
    /// Read the record from a parameter bag, falling back to a fresh one
    pub fn load(params: &Map<String, Value>) -> Self {
        let Some(raw) = params.get(DATA_KEY).filter(|v| !v.is_null()) else {
            return Self::default();
        };
        match serde_json::from_value::<SessionData>(raw.clone()) {
            Ok(data) => match data.validate() {
                Ok(()) => data,
                Err(e) => {
                    warn!("Discarding session record: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Discarding unreadable session record: {}", e);
                Self::default()
            }
        }
    }

    /// Check the record is one this engine can continue from
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.version != SESSION_VERSION {
            return Err(EngineError::Session(format!(
                "record version {} != {}",
                self.version, SESSION_VERSION
            )));
        }
        if self.quiz.count > self.quiz.limit {
            return Err(EngineError::Session(format!(
                "count {} exceeds limit {}",
                self.quiz.count, self.quiz.limit
            )));
        }
        if !self.quiz.questions.is_empty() && self.quiz.questions.len() < self.quiz.limit {
            return Err(EngineError::Session(format!(
                "{} questions for a limit of {}",
                self.quiz.questions.len(),
                self.quiz.limit
            )));
        }
        Ok(())
    }

    /// Write the record back into a parameter bag
    pub fn persist(&self, params: &mut Map<String, Value>) -> Result<(), EngineError> {
        let value = serde_json::to_value(self)
            .map_err(|e| EngineError::Session(format!("cannot serialize record: {}", e)))?;
        params.insert(DATA_KEY.to_string(), value);
        Ok(())
    }
}

/// Take the captured answer slot out of the bag, leaving it null
pub fn take_user_answer(params: &mut Map<String, Value>) -> Option<String> {
    let answer = params
        .get(USER_ANSWER_KEY)
        .and_then(Value::as_str)
        .map(String::from);
    if params.contains_key(USER_ANSWER_KEY) {
        params.insert(USER_ANSWER_KEY.to_string(), Value::Null);
    }
    answer
}
