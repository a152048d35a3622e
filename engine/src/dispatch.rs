//! Multi-surface response selection
//!
//! Handlers compose every turn three ways at once: a voice-only SSML string,
//! a list of chat items (bubbles, a card, chips) and a list of canvas items.
//! The dispatcher picks exactly one for the device, in priority order:
//!
//! 1. canvas-capable device and a non-empty canvas list
//! 2. screen-capable device and a non-empty chat list
//! 3. the voice-only string
//!
//! An empty list never wins over a lower surface, so an inert canvas composer
//! silently degrades to chat or voice.

use crate::canvas::CanvasResponse;
use crate::conversation::wire::Capability;
use sdk::types::Prompt;
use serde::{Deserialize, Serialize};

/// A speech bubble; `text` falls back to speech on display when absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Simple {
    pub speech: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Simple {
    /// Speech-only bubble
    pub fn speech(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            text: None,
        }
    }
}

impl From<Prompt> for Simple {
    fn from(prompt: Prompt) -> Self {
        Self {
            speech: prompt.speech,
            text: Some(prompt.text),
        }
    }
}

impl From<&Prompt> for Simple {
    fn from(prompt: &Prompt) -> Self {
        Self::from(prompt.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// Chat basic card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    pub image_fill: String,
}

/// One item a surface adds to the platform prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptItem {
    Simple(Simple),
    Card(Card),
    /// Suggestion chip title
    Suggestion(String),
    Canvas(CanvasResponse),
}

/// The three renditions of one turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnResponses {
    pub simple: String,
    pub rich: Vec<PromptItem>,
    pub immersive: Vec<PromptItem>,
}

/// Surface chosen for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Immersive,
    Rich,
    Simple,
}

/// Device capability flags derived from the platform capability list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub screen: bool,
    pub audio: bool,
    pub long_form_audio: bool,
    pub web_browser: bool,
    pub interactive_canvas: bool,
}

impl Capabilities {
    pub fn from_list(list: &[Capability]) -> Self {
        Self {
            screen: list.contains(&Capability::RichResponse),
            audio: list.contains(&Capability::Speech),
            long_form_audio: list.contains(&Capability::LongFormAudio),
            web_browser: list.contains(&Capability::WebLink),
            interactive_canvas: list.contains(&Capability::InteractiveCanvas),
        }
    }
}

/// Pick the surface for a device
pub fn select_surface(caps: &Capabilities, responses: &TurnResponses) -> Surface {
    if caps.interactive_canvas && !responses.immersive.is_empty() {
        Surface::Immersive
    } else if caps.screen && !responses.rich.is_empty() {
        Surface::Rich
    } else {
        Surface::Simple
    }
}

/// Items to add to the platform prompt for the chosen surface
pub fn select_items(caps: &Capabilities, responses: TurnResponses) -> Vec<PromptItem> {
    match select_surface(caps, &responses) {
        Surface::Immersive => responses.immersive,
        Surface::Rich => responses.rich,
        Surface::Simple => vec![PromptItem::Simple(Simple::speech(responses.simple))],
    }
}
