//! Slide and canvas payload types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canvas page layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Template {
    #[serde(rename = "template.question")]
    Question,
    #[serde(rename = "template.intro")]
    Intro,
    #[serde(rename = "template.outcome")]
    Outcome,
    #[serde(rename = "template.say")]
    Say,
    #[serde(rename = "template.tell")]
    Tell,
}

/// Animation the canvas plays when a slide appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateAction {
    #[serde(rename = "template.action.reset")]
    Reset,
    #[serde(rename = "template.action.freeze")]
    Freeze,
    /// Highlight the first (positive) answer
    #[serde(rename = "template.action.positive")]
    Positive,
    /// Highlight the second (negative) answer
    #[serde(rename = "template.action.negative")]
    Negative,
}

impl TemplateAction {
    /// Highlight matching an answer weight
    pub fn for_weight(weight: i64) -> Self {
        if weight > 0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

/// Partial composer state, used to seed or update a composer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasState {
    pub url: Option<String>,
    pub suppress_mic: Option<bool>,
    pub action: Option<TemplateAction>,
    pub template: Option<Template>,
    pub speech: Option<String>,
    pub config: Map<String, Value>,
    pub data: Map<String, Value>,
    pub suggestions: Vec<Value>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_suppress_mic(mut self, suppress: bool) -> Self {
        self.suppress_mic = Some(suppress);
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_action(mut self, action: TemplateAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_speech(mut self, speech: impl Into<String>) -> Self {
        self.speech = Some(speech.into());
        self
    }

    /// Merge object keys into `data`; non-object values are ignored
    pub fn with_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.data.extend(map);
        }
        self
    }

    /// Merge object keys into `config`; non-object values are ignored
    pub fn with_config(mut self, config: Value) -> Self {
        if let Value::Object(map) = config {
            self.config.extend(map);
        }
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<Value>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }
}

/// One rendered canvas page
///
/// Empty fields are dropped when a slide is built, so a slide only carries
/// what the page needs. `next` is populated by `build_state` only; `build`
/// flattens the chain into a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<TemplateAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Slide>>,
}

impl Slide {
    /// Number of slides in this chain, counting `self`
    pub fn chain_len(&self) -> usize {
        1 + self.next.as_ref().map_or(0, |n| n.chain_len())
    }
}

/// Canvas payload for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default)]
    pub suppress_mic: bool,
    pub data: Vec<Slide>,
}

/// Remove nulls, empty strings, empty arrays and empty objects, recursively
///
/// Numbers and booleans are kept as-is, so `progress: 0` survives.
pub fn deep_clean(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(deep_clean).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map = clean_map(map);
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

pub(crate) fn clean_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(k, v)| deep_clean(v).map(|v| (k, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_clean_drops_empties() {
        let cleaned = deep_clean(json!({
            "body": "",
            "progress": 0,
            "background": {"landscape": null, "portrait": null},
            "flags": [null, ""],
            "keep": {"x": false}
        }));
        assert_eq!(cleaned, Some(json!({"progress": 0, "keep": {"x": false}})));
    }

    #[test]
    fn test_template_wire_names() {
        assert_eq!(
            serde_json::to_value(Template::Question).unwrap(),
            json!("template.question")
        );
        assert_eq!(
            serde_json::to_value(TemplateAction::for_weight(-1)).unwrap(),
            json!("template.action.negative")
        );
    }

    #[test]
    fn test_canvas_response_wire_shape() {
        let response = CanvasResponse {
            url: "https://quiz.example/".into(),
            suppress_mic: true,
            data: vec![Slide {
                template: Some(Template::Tell),
                ..Default::default()
            }],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "url": "https://quiz.example/",
                "suppressMic": true,
                "data": [{"template": "template.tell"}]
            })
        );
    }
}
