//! Per-turn conversation context
//!
//! A `Conversation` is built from one inbound request, mutated by exactly one
//! handler, and turned back into one response. It carries the typed session
//! record, the turn's canvas composer, the content client, the turn RNG, and
//! the prompt items the dispatcher has selected so far.
//!
//! Nothing here outlives the turn: the session record travels in the request
//! and goes back out in the response.

pub mod wire;

use crate::canvas::{self, CanvasState, ResponseComposer, Template, TemplateAction};
use crate::content::{pick_intro, pick_prompt, ContentClient, PromptName};
use crate::dispatch::{select_items, Capabilities, Card, Image, PromptItem, Simple, TurnResponses};
use crate::session::SessionData;
use crate::ssml::{self, Ssml};
use rand::rngs::StdRng;
use sdk::errors::EngineError;
use sdk::types::{Outcome, Prompt, Question, QuizIntro};
use serde_json::{Map, Value};
use tracing::debug;
use wire::{
    Content, Expected, NextScene, PromptPayload, Scene, SessionInfo, SuggestionChip,
    SynonymEntry, SynonymType, TurnRequest, TurnResponse, TypeOverride, TypeOverrideMode,
    END_CONVERSATION_SCENE, NEW_CONVERSATION_INTENTS,
};

/// NLU type the answer synonyms are written to
pub const ANSWER_TYPE: &str = "answer";

/// Whether a turn keeps the mic open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Ask,
    Close,
}

/// Engine-wide knobs a conversation needs
#[derive(Debug, Clone)]
pub struct TurnSettings {
    /// Canvas web app loaded on the first canvas turn
    pub immersive_url: String,
    pub ssml: Ssml,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            immersive_url: String::new(),
            ssml: Ssml::default(),
        }
    }
}

/// State of one turn
#[derive(Debug)]
pub struct Conversation {
    pub session_id: String,
    pub handler: String,
    pub intent: wire::Intent,
    pub capabilities: Capabilities,
    /// Session parameter bag, minus the record which lives in `data`
    pub params: Map<String, Value>,
    pub data: SessionData,
    pub type_overrides: Vec<TypeOverride>,
    pub expected_speech: Option<Vec<String>>,
    /// Canvas composer for this turn
    pub immersive: Box<dyn ResponseComposer>,
    pub content: ContentClient,
    pub ssml: Ssml,
    pub rng: StdRng,
    immersive_url: String,
    items: Vec<PromptItem>,
    scene_next: Option<String>,
    language_code: Option<String>,
}

impl Conversation {
    /// Build the turn context from an inbound request
    pub fn new(
        request: TurnRequest,
        content: ContentClient,
        settings: &TurnSettings,
        rng: StdRng,
    ) -> Self {
        let capabilities = Capabilities::from_list(&request.device.capabilities);
        let data = SessionData::load(&request.session.params);
        let mut conv = Self {
            session_id: request.session.id,
            handler: request.handler.name,
            intent: request.intent,
            capabilities,
            params: request.session.params,
            data,
            type_overrides: request.session.type_overrides,
            expected_speech: None,
            immersive: canvas::create(false, CanvasState::new()),
            content,
            ssml: settings.ssml,
            rng,
            immersive_url: settings.immersive_url.clone(),
            items: Vec::new(),
            scene_next: None,
            language_code: request.session.language_code,
        };
        conv.reset_canvas();
        conv
    }

    /// True on the turn that opens the conversation
    pub fn is_new_conversation(&self) -> bool {
        NEW_CONVERSATION_INTENTS.contains(&self.intent.name.as_str())
    }

    pub fn immersive_url(&self) -> &str {
        &self.immersive_url
    }

    /// Replace the turn composer with a fresh one
    ///
    /// The fresh composer points at the canvas app only when this turn opens
    /// the conversation.
    pub fn reset_canvas(&mut self) {
        let state = if self.is_new_conversation() {
            CanvasState::new().with_url(self.immersive_url.clone())
        } else {
            CanvasState::new()
        };
        self.immersive = self.new_canvas(state);
    }

    /// A composer matching this device's canvas capability
    pub fn new_canvas(&self, state: CanvasState) -> Box<dyn ResponseComposer> {
        canvas::create(self.capabilities.interactive_canvas, state)
    }

    /// Build the turn composer into a canvas item, if the device has a canvas
    pub fn build_canvas(&mut self) -> Option<PromptItem> {
        let url = if self.is_new_conversation() {
            Some(self.immersive_url.clone())
        } else {
            None
        };
        self.immersive.build(url.as_deref()).map(PromptItem::Canvas)
    }

    pub async fn get_random_prompt(&mut self, name: PromptName) -> Result<Prompt, EngineError> {
        let candidates = self.content.prompt_candidates(name).await?;
        pick_prompt(name, candidates, &mut self.rng)
    }

    pub async fn get_random_intro(&mut self) -> Result<QuizIntro, EngineError> {
        let intros = self.content.get_all_intros().await?;
        pick_intro(intros, &mut self.rng)
    }

    /// The question at the current position of the quiz
    pub fn current_question(&self) -> Result<&Question, EngineError> {
        self.data.quiz.current_question().ok_or_else(|| {
            EngineError::Session(format!(
                "no question at position {} of {}",
                self.data.quiz.count,
                self.data.quiz.questions.len()
            ))
        })
    }

    /// Bias recognition toward the current question's answers
    ///
    /// Sets the expected speech hints and replaces the session `answer` type
    /// with one positive and one negative entry.
    pub fn setup_session_type_and_speech_biasing(&mut self) -> Result<(), EngineError> {
        let clean = |synonyms: &[String]| {
            let mut out: Vec<String> = Vec::new();
            for s in synonyms {
                let s = ssml::strip_emoji(s).trim().to_string();
                if !out.contains(&s) {
                    out.push(s);
                }
            }
            out
        };
        let question = self.current_question()?;
        let positive = clean(&question.positive_answers);
        let negative = clean(&question.negative_answers);

        let mut expected = positive.clone();
        expected.extend(negative.iter().cloned());
        self.expected_speech = Some(expected);
        self.add_session_type(ANSWER_TYPE, &[positive, negative]);
        Ok(())
    }

    /// Replace (or add) a session type override
    ///
    /// Each synonym list becomes one entry named after its first synonym.
    pub fn add_session_type(&mut self, type_name: &str, synonym_lists: &[Vec<String>]) {
        let entries = synonym_lists
            .iter()
            .filter_map(|synonyms| {
                let mut unique: Vec<String> = Vec::new();
                for s in synonyms {
                    let s = s.to_lowercase().trim().to_string();
                    if !s.is_empty() && !unique.contains(&s) {
                        unique.push(s);
                    }
                }
                let name = unique.first()?.clone();
                Some(SynonymEntry {
                    name,
                    synonyms: unique,
                })
            })
            .collect();
        let session_type = TypeOverride {
            name: type_name.to_string(),
            mode: TypeOverrideMode::TypeReplace,
            synonym: SynonymType { entries },
        };
        match self
            .type_overrides
            .iter_mut()
            .find(|t| t.name == session_type.name)
        {
            Some(existing) => *existing = session_type,
            None => self.type_overrides.push(session_type),
        }
    }

    /// Chip titles for the current question's first positive and negative answers
    pub fn question_rich_suggestions(&self) -> Result<Vec<String>, EngineError> {
        let question = self.current_question()?;
        Ok(vec![
            clean_rich_suggestion(question.first_positive()),
            clean_rich_suggestion(question.first_negative()),
        ])
    }

    /// Fetch chip prompts and return their cleaned texts, in order
    pub async fn build_prompt_rich_suggestions(
        &mut self,
        names: &[PromptName],
    ) -> Result<Vec<String>, EngineError> {
        let mut chips = Vec::with_capacity(names.len());
        for name in names {
            let prompt = self.get_random_prompt(*name).await?;
            chips.push(clean_rich_suggestion(&prompt.text));
        }
        Ok(chips)
    }

    /// Ask with a random variant of a prompt
    pub async fn ask_with_prompt(
        &mut self,
        name: PromptName,
        suggestions: Option<Vec<String>>,
    ) -> Result<(), EngineError> {
        let prompt = self.get_random_prompt(name).await?;
        let mut rich = vec![PromptItem::Simple(Simple::from(&prompt))];
        if let Some(chips) = suggestions {
            rich.extend(
                chips
                    .iter()
                    .map(|c| PromptItem::Suggestion(ssml::strip_emoji(c))),
            );
        }
        self.immersive
            .set_template(Template::Say)
            .set_action(TemplateAction::Reset)
            .set_speech(&prompt.speech);
        let mut immersive = vec![PromptItem::Simple(Simple::speech(prompt.speech.clone()))];
        immersive.extend(self.build_canvas());

        self.ask(TurnResponses {
            simple: prompt.speech,
            rich,
            immersive,
        });
        Ok(())
    }

    /// Close with a random variant of a prompt
    pub async fn close_with_prompt(&mut self, name: PromptName) -> Result<(), EngineError> {
        let prompt = self.get_random_prompt(name).await?;
        self.immersive
            .set_suppress_mic(true)
            .set_template(Template::Tell)
            .set_speech(&prompt.speech);
        let mut immersive = vec![PromptItem::Simple(Simple::speech(prompt.speech.clone()))];
        immersive.extend(self.build_canvas());

        self.close(TurnResponses {
            simple: prompt.speech.clone(),
            rich: vec![PromptItem::Simple(Simple::from(prompt))],
            immersive,
        });
        Ok(())
    }

    pub fn ask(&mut self, responses: TurnResponses) {
        self.respond(ResponseKind::Ask, responses);
    }

    pub fn close(&mut self, responses: TurnResponses) {
        self.respond(ResponseKind::Close, responses);
    }

    /// Add the surface matching this device, ending the conversation on close
    pub fn respond(&mut self, kind: ResponseKind, responses: TurnResponses) {
        let items = select_items(&self.capabilities, responses);
        debug!("Responding with {} item(s) ({:?})", items.len(), kind);
        self.items.extend(items);
        if kind == ResponseKind::Close {
            self.end_conversation();
        }
    }

    /// Add a raw item, bypassing surface selection
    pub fn add(&mut self, item: PromptItem) {
        self.items.push(item);
    }

    pub fn end_conversation(&mut self) {
        self.scene_next = Some(END_CONVERSATION_SCENE.to_string());
    }

    pub fn is_closed(&self) -> bool {
        self.scene_next.as_deref() == Some(END_CONVERSATION_SCENE)
    }

    pub fn items(&self) -> &[PromptItem] {
        &self.items
    }

    /// Roll back everything this turn wrote, restoring the inbound bag
    pub fn restore(&mut self, params: Map<String, Value>, type_overrides: Vec<TypeOverride>) {
        self.data = SessionData::load(&params);
        self.params = params;
        self.type_overrides = type_overrides;
        self.expected_speech = None;
        self.items.clear();
        self.scene_next = None;
        self.reset_canvas();
    }

    /// Merge two prompts into one bubble
    pub fn merge_prompts(&self, first: &Prompt, second: &Prompt) -> Prompt {
        let text = [first.text.as_str(), second.text.as_str()]
            .iter()
            .filter(|t| !t.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("  \n\n");
        Prompt {
            text,
            speech: self.ssml.merge(&[&first.speech, &second.speech]),
        }
    }

    /// Persist the session record and render the platform response
    pub fn into_response(mut self) -> Result<TurnResponse, EngineError> {
        self.data.persist(&mut self.params)?;
        // The platform caps the persisted bag
        debug!("Session params are {} bytes", params_size(&self.params));

        let mut prompt = PromptPayload::default();
        let mut simples = Vec::new();
        for item in self.items {
            match item {
                PromptItem::Simple(simple) => simples.push(simple),
                PromptItem::Card(card) => prompt.content = Some(Content { card }),
                PromptItem::Suggestion(title) => prompt.suggestions.push(SuggestionChip { title }),
                PromptItem::Canvas(canvas) => prompt.canvas = Some(canvas),
            }
        }
        let mut simples = simples.into_iter();
        prompt.first_simple = simples.next();
        prompt.last_simple = simples.fold(None, |acc: Option<Simple>, next| {
            Some(match acc {
                None => next,
                Some(prev) => Simple {
                    speech: self.ssml.merge(&[&prev.speech, &next.speech]),
                    text: match (prev.text, next.text) {
                        (Some(a), Some(b)) => Some(format!("{}  \n{}", a, b)),
                        (a, b) => a.or(b),
                    },
                },
            })
        });

        Ok(TurnResponse {
            session: SessionInfo {
                id: self.session_id,
                params: self.params,
                type_overrides: self.type_overrides,
                language_code: self.language_code,
            },
            prompt,
            scene: self.scene_next.map(|name| Scene {
                next: NextScene { name },
            }),
            expected: self.expected_speech.map(|speech| Expected { speech }),
        })
    }
}

/// Chip title: emoji stripped and trimmed
pub fn clean_rich_suggestion(chip: &str) -> String {
    ssml::strip_emoji(chip).trim().to_string()
}

/// Basic card for an outcome, or `None` when it has neither text nor image
pub fn build_outcome_basic_card(outcome: &Outcome) -> Option<Card> {
    let body = Some(outcome.text.clone()).filter(|t| !t.is_empty());
    let image_url = outcome.image_landscape.clone().filter(|u| !u.is_empty());
    if body.is_none() && image_url.is_none() {
        return None;
    }
    let title = outcome.title.clone().filter(|t| !t.is_empty());
    let alt = title.clone().unwrap_or_else(|| "outcome image".to_string());
    Some(Card {
        title,
        text: body,
        image: image_url.map(|url| Image { url, alt }),
        image_fill: "WHITE".to_string(),
    })
}

/// Serialized size of the session parameter bag
pub fn params_size(params: &Map<String, Value>) -> usize {
    serde_json::to_vec(params).map(|bytes| bytes.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_size_counts_serialized_bytes() {
        assert_eq!(params_size(&Map::new()), 2);

        let mut params = Map::new();
        params.insert("data".to_string(), json!({"count": 1}));
        assert_eq!(params_size(&params), r#"{"data":{"count":1}}"#.len());
    }

    #[test]
    fn test_outcome_card_needs_text_or_image() {
        assert!(build_outcome_basic_card(&Outcome::default()).is_none());

        let card = build_outcome_basic_card(&Outcome {
            text: "".into(),
            image_landscape: Some("https://img/cat.png".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(card.image.unwrap().alt, "outcome image");
        assert!(card.text.is_none());
        assert_eq!(card.image_fill, "WHITE");
    }

    #[test]
    fn test_clean_rich_suggestion() {
        assert_eq!(clean_rich_suggestion(" Yes 👍 "), "Yes");
    }
}
