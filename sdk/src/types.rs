//! Quiz content types
//!
//! These are the documents a content store hands to the engine. Field names
//! follow the camelCase aliases used by the content sheets, so a bundle
//! exported from a sheet deserializes without renaming.

use serde::{Deserialize, Serialize};

/// A yes/no quiz question bound to one personality trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Personality trait this question scores. Lowercased at session init.
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_speech: Option<String>,
    #[serde(default)]
    pub positive_answers: Vec<String>,
    #[serde(default)]
    pub negative_answers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_followup_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_followup_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_followup_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_followup_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_landscape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_portrait: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_answer_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_answer_image: Option<String>,
}

impl Question {
    /// Create a question with the given trait, text and answer synonyms
    pub fn new(
        trait_name: impl Into<String>,
        question_text: impl Into<String>,
        positive_answers: Vec<String>,
        negative_answers: Vec<String>,
    ) -> Self {
        Self {
            trait_name: trait_name.into(),
            question_text: question_text.into(),
            positive_answers,
            negative_answers,
            ..Default::default()
        }
    }

    /// First positive synonym, used for suggestion chips
    pub fn first_positive(&self) -> &str {
        self.positive_answers.first().map(String::as_str).unwrap_or("")
    }

    /// First negative synonym, used for suggestion chips
    pub fn first_negative(&self) -> &str {
        self.negative_answers.first().map(String::as_str).unwrap_or("")
    }

    /// Displayed/spoken pair for the question body
    pub fn prompt(&self) -> Prompt {
        Prompt::from_parts(&self.question_text, self.question_speech.as_deref())
    }

    /// Displayed/spoken pair for the followup matching the answer polarity
    pub fn followup(&self, positive: bool) -> Prompt {
        if positive {
            Prompt::from_parts(
                self.positive_followup_text.as_deref().unwrap_or(""),
                self.positive_followup_speech.as_deref(),
            )
        } else {
            Prompt::from_parts(
                self.negative_followup_text.as_deref().unwrap_or(""),
                self.negative_followup_speech.as_deref(),
            )
        }
    }
}

/// A quiz result, scored against accumulated trait weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    /// `&`-delimited trait tags that add to this outcome's score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_traits: Option<String>,
    /// `&`-delimited trait tags that subtract from this outcome's score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_traits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_landscape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_portrait: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_landscape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_portrait: Option<String>,
}

impl Outcome {
    pub fn prompt(&self) -> Prompt {
        Prompt::from_parts(&self.text, self.speech.as_deref())
    }
}

/// Opening words for a quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuizIntro {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_landscape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_portrait: Option<String>,
}

impl QuizIntro {
    pub fn prompt(&self) -> Prompt {
        Prompt::from_parts(&self.text, self.speech.as_deref())
    }
}

/// A displayed text paired with its spoken SSML
///
/// `speech` is always a `<speak>` document once it leaves `from_parts`; an
/// empty prompt speaks as `<speak></speak>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Prompt {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub speech: String,
}

impl Prompt {
    /// Build a prompt from a displayed text and optional spoken form.
    ///
    /// Missing speech falls back to the displayed text. Speech not already
    /// wrapped in `<speak>` is wrapped.
    pub fn from_parts(text: &str, speech: Option<&str>) -> Self {
        let spoken = match speech {
            Some(s) if !s.trim().is_empty() => s.trim(),
            _ => text.trim(),
        };
        let speech = if spoken.starts_with("<speak") {
            spoken.to_string()
        } else {
            format!("<speak>{}</speak>", spoken)
        };
        Self {
            text: text.trim().to_string(),
            speech,
        }
    }

    /// The empty prompt: no text, silent speech
    pub fn empty() -> Self {
        Self::from_parts("", None)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when the spoken form has nothing inside its `<speak>` wrapper
    pub fn is_silent(&self) -> bool {
        self.speech
            .trim()
            .trim_start_matches("<speak>")
            .trim_end_matches("</speak>")
            .trim()
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_deserializes_sheet_aliases() {
        let json = r#"{
            "trait": "Adventurous",
            "questionText": "Do you like hiking?",
            "positiveAnswers": ["Yes", "Sure"],
            "negativeAnswers": ["No"],
            "positiveFollowupSpeech": "<speak>Nice!</speak>"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.trait_name, "Adventurous");
        assert_eq!(q.first_positive(), "Yes");
        assert_eq!(q.first_negative(), "No");
        assert_eq!(q.followup(true).speech, "<speak>Nice!</speak>");
        assert!(q.followup(true).text.is_empty());
        assert!(q.followup(false).is_empty());
    }

    #[test]
    fn test_prompt_speech_falls_back_to_text() {
        let p = Prompt::from_parts("Hello there", None);
        assert_eq!(p.speech, "<speak>Hello there</speak>");
        assert_eq!(p.text, "Hello there");
    }

    #[test]
    fn test_empty_prompt_speaks_silence() {
        assert_eq!(Prompt::empty().speech, "<speak></speak>");
        assert!(Prompt::empty().is_empty());
        assert!(Prompt::empty().is_silent());
        assert!(!Prompt::from_parts("", Some("<speak>hi</speak>")).is_silent());
    }

    #[test]
    fn test_outcome_prompt_prefers_speech() {
        let outcome = Outcome {
            text: "You are a cat".into(),
            speech: Some("<speak>Meow</speak>".into()),
            ..Default::default()
        };
        assert_eq!(outcome.prompt().speech, "<speak>Meow</speak>");
        assert_eq!(outcome.prompt().text, "You are a cat");
    }
}
