//! Platform webhook wire format
//!
//! The subset of the conversational platform's fulfillment request and
//! response JSON that the engine reads and writes. Unknown fields are
//! ignored on the way in.

use crate::canvas::CanvasResponse;
use crate::dispatch::{Card, Simple};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scene name that ends the conversation
pub const END_CONVERSATION_SCENE: &str = "actions.scene.END_CONVERSATION";

/// Intents that open a new conversation
pub const NEW_CONVERSATION_INTENTS: [&str; 2] = ["actions.intent.MAIN", "actions.intent.PLAY_GAME"];

/// Inbound fulfillment request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub handler: Handler,
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub session: SessionInfo,
    #[serde(default)]
    pub user: UserInfo,
    #[serde(default)]
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Handler {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub query: String,
}

impl Intent {
    /// `resolved` value of an intent slot, as a string
    pub fn resolved(&self, slot: &str) -> Option<&str> {
        self.params
            .get(slot)
            .and_then(|p| p.get("resolved"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub type_overrides: Vec<TypeOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

/// Device capability names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    RichResponse,
    Speech,
    LongFormAudio,
    WebLink,
    InteractiveCanvas,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeOverrideMode {
    TypeMerge,
    TypeReplace,
    TypeUnspecified,
}

/// Session-scoped replacement of an NLU type's entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOverride {
    pub name: String,
    pub mode: TypeOverrideMode,
    pub synonym: SynonymType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymType {
    pub entries: Vec<SynonymEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub name: String,
    pub synonyms: Vec<String>,
}

/// Outbound fulfillment response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub session: SessionInfo,
    pub prompt: PromptPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expected>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPayload {
    #[serde(rename = "override")]
    pub override_prompts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_simple: Option<Simple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_simple: Option<Simple>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<SuggestionChip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionChip {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub next: NextScene,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextScene {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expected {
    pub speech: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_parses_platform_payload() {
        let request: TurnRequest = serde_json::from_value(json!({
            "handler": {"name": "ANSWER_ORDINAL"},
            "intent": {
                "name": "OrdinalChoice",
                "params": {"count": {"original": "the first one", "resolved": "first"}},
                "query": "the first one"
            },
            "session": {"id": "abc", "params": {}, "typeOverrides": []},
            "user": {"locale": "en-US"},
            "device": {"capabilities": ["SPEECH", "RICH_RESPONSE", "HOLOGRAM"]}
        }))
        .unwrap();
        assert_eq!(request.handler.name, "ANSWER_ORDINAL");
        assert_eq!(request.intent.resolved("count"), Some("first"));
        assert_eq!(request.intent.resolved("missing"), None);
        assert_eq!(
            request.device.capabilities,
            vec![Capability::Speech, Capability::RichResponse, Capability::Unknown]
        );
    }

    #[test]
    fn test_minimal_request_defaults() {
        let request: TurnRequest =
            serde_json::from_value(json!({"handler": {"name": "SETUP_QUIZ"}})).unwrap();
        assert_eq!(request.user.locale, "en");
        assert!(request.session.params.is_empty());
        assert!(request.device.capabilities.is_empty());
    }

    #[test]
    fn test_type_override_wire_shape() {
        let over = TypeOverride {
            name: "answer".into(),
            mode: TypeOverrideMode::TypeReplace,
            synonym: SynonymType {
                entries: vec![SynonymEntry {
                    name: "yes".into(),
                    synonyms: vec!["yes".into(), "sure".into()],
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&over).unwrap(),
            json!({
                "name": "answer",
                "mode": "TYPE_REPLACE",
                "synonym": {"entries": [{"name": "yes", "synonyms": ["yes", "sure"]}]}
            })
        );
    }
}
