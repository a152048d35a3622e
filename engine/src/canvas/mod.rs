//! Canvas response composer
//!
//! A composer accumulates the visual state of one turn: a head slide plus an
//! ordered list of slides that play after it. Handlers build slides
//! independently and splice them together with `append_slide`, then `build`
//! flattens everything into the payload the canvas web app consumes.
//!
//! # Active and inert composers
//!
//! Devices without an interactive canvas still run the same handler code.
//! `create` hands them an [`InertCanvas`], whose every call is a chainable
//! no-op and whose `build` returns `None`, so handlers never branch on
//! capability.
//!
//! # Merge rules
//!
//! Scalar fields (`url`, `suppressMic`, `action`, `template`, `speech`) are
//! overwritten. Aggregate fields merge: `config` and `data` are shallow
//! merged with new keys winning, `suggestions` are concatenated.

pub mod slide;

pub use slide::{CanvasResponse, CanvasState, Slide, Template, TemplateAction};

use crate::ssml;
use serde_json::{Map, Value};
use slide::clean_map;
use tracing::debug;

/// Chainable builder for a turn's canvas payload
pub trait ResponseComposer: Send + Sync + std::fmt::Debug {
    /// Apply a partial state using the merge rules
    fn set_state(&mut self, state: CanvasState) -> &mut dyn ResponseComposer;

    fn set_url(&mut self, url: &str) -> &mut dyn ResponseComposer;

    fn set_suppress_mic(&mut self, suppress: bool) -> &mut dyn ResponseComposer;

    fn set_template(&mut self, template: Template) -> &mut dyn ResponseComposer;

    fn set_action(&mut self, action: TemplateAction) -> &mut dyn ResponseComposer;

    fn set_speech(&mut self, speech: &str) -> &mut dyn ResponseComposer;

    /// Merge a value into a field by name; unknown names are ignored
    fn add(&mut self, field: &str, value: Value) -> &mut dyn ResponseComposer;

    /// Queue a composer to play after everything already queued
    fn append_slide(&mut self, next: Box<dyn ResponseComposer>) -> &mut dyn ResponseComposer;

    /// Cleaned snapshot with following slides nested under `next`
    fn build_state(&self) -> Option<Slide>;

    /// Flatten into a canvas payload, optionally overriding the url
    fn build(&mut self, url: Option<&str>) -> Option<CanvasResponse>;

    /// False for the inert composer
    fn is_active(&self) -> bool;

    #[doc(hidden)]
    fn collect_slides(&self, out: &mut Vec<Slide>);
}

/// Active composer or inert stand-in, depending on device capability
pub fn create(enabled: bool, initial: CanvasState) -> Box<dyn ResponseComposer> {
    if enabled {
        Box::new(ActiveCanvas::new(initial))
    } else {
        Box::new(InertCanvas)
    }
}

/// Composer for canvas-capable devices
#[derive(Debug, Default)]
pub struct ActiveCanvas {
    url: String,
    suppress_mic: bool,
    action: Option<TemplateAction>,
    template: Option<Template>,
    speech: String,
    config: Map<String, Value>,
    data: Map<String, Value>,
    suggestions: Vec<Value>,
    following: Vec<Box<dyn ResponseComposer>>,
}

impl ActiveCanvas {
    pub fn new(initial: CanvasState) -> Self {
        let mut canvas = Self::default();
        canvas.apply(initial);
        canvas
    }

    fn apply(&mut self, state: CanvasState) {
        if let Some(url) = state.url {
            self.url = url;
        }
        if let Some(suppress) = state.suppress_mic {
            self.suppress_mic = suppress;
        }
        if state.action.is_some() {
            self.action = state.action;
        }
        if state.template.is_some() {
            self.template = state.template;
        }
        if let Some(speech) = state.speech {
            self.speech = speech;
        }
        self.config.extend(state.config);
        self.data.extend(state.data);
        self.suggestions.extend(state.suggestions);
    }

    /// Number of slides this composer will emit
    pub fn slide_count(&self) -> usize {
        let mut slides = Vec::new();
        self.collect_slides(&mut slides);
        slides.len()
    }

    fn own_slide(&self) -> Slide {
        let speech = ssml::clean(&self.speech);
        let config = clean_map(self.config.clone());
        let data = clean_map(self.data.clone());
        let suggestions: Vec<Value> = self
            .suggestions
            .iter()
            .cloned()
            .filter_map(slide::deep_clean)
            .collect();
        Slide {
            action: self.action,
            template: self.template,
            speech: (!speech.is_empty()).then_some(speech),
            config: (!config.is_empty()).then_some(config),
            data: (!data.is_empty()).then_some(data),
            suggestions: (!suggestions.is_empty()).then_some(suggestions),
            next: None,
        }
    }
}

impl ResponseComposer for ActiveCanvas {
    fn set_state(&mut self, state: CanvasState) -> &mut dyn ResponseComposer {
        self.apply(state);
        self
    }

    fn set_url(&mut self, url: &str) -> &mut dyn ResponseComposer {
        self.url = url.to_string();
        self
    }

    fn set_suppress_mic(&mut self, suppress: bool) -> &mut dyn ResponseComposer {
        self.suppress_mic = suppress;
        self
    }

    fn set_template(&mut self, template: Template) -> &mut dyn ResponseComposer {
        self.template = Some(template);
        self
    }

    fn set_action(&mut self, action: TemplateAction) -> &mut dyn ResponseComposer {
        self.action = Some(action);
        self
    }

    fn set_speech(&mut self, speech: &str) -> &mut dyn ResponseComposer {
        self.speech = speech.to_string();
        self
    }

    fn add(&mut self, field: &str, value: Value) -> &mut dyn ResponseComposer {
        match (field, value) {
            ("config", Value::Object(map)) => self.config.extend(map),
            ("data", Value::Object(map)) => self.data.extend(map),
            ("suggestions", Value::Array(items)) => self.suggestions.extend(items),
            ("suggestions", item) => self.suggestions.push(item),
            ("url", Value::String(url)) => self.url = url,
            ("speech", Value::String(speech)) => self.speech = speech,
            ("suppressMic", Value::Bool(suppress)) => self.suppress_mic = suppress,
            ("template", value) => match serde_json::from_value(value) {
                Ok(template) => self.template = Some(template),
                Err(e) => debug!("Ignoring unknown canvas template: {}", e),
            },
            ("action", value) => match serde_json::from_value(value) {
                Ok(action) => self.action = Some(action),
                Err(e) => debug!("Ignoring unknown canvas action: {}", e),
            },
            (field, value) => {
                debug!("Ignoring canvas field {} with value {}", field, value);
            }
        }
        self
    }

    fn append_slide(&mut self, next: Box<dyn ResponseComposer>) -> &mut dyn ResponseComposer {
        self.following.push(next);
        self
    }

    fn build_state(&self) -> Option<Slide> {
        let mut slides = Vec::new();
        self.collect_slides(&mut slides);
        slides.into_iter().rev().fold(None, |next, mut slide| {
            slide.next = next.map(Box::new);
            Some(slide)
        })
    }

    fn build(&mut self, url: Option<&str>) -> Option<CanvasResponse> {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.url = url.to_string();
        }
        let mut slides = Vec::new();
        self.collect_slides(&mut slides);
        Some(CanvasResponse {
            url: self.url.clone(),
            suppress_mic: self.suppress_mic,
            data: slides,
        })
    }

    fn is_active(&self) -> bool {
        true
    }

    fn collect_slides(&self, out: &mut Vec<Slide>) {
        out.push(self.own_slide());
        for next in &self.following {
            next.collect_slides(out);
        }
    }
}

/// Composer for devices without a canvas; every call is a no-op
#[derive(Debug, Default, Clone, Copy)]
pub struct InertCanvas;

impl ResponseComposer for InertCanvas {
    fn set_state(&mut self, _state: CanvasState) -> &mut dyn ResponseComposer {
        self
    }

    fn set_url(&mut self, _url: &str) -> &mut dyn ResponseComposer {
        self
    }

    fn set_suppress_mic(&mut self, _suppress: bool) -> &mut dyn ResponseComposer {
        self
    }

    fn set_template(&mut self, _template: Template) -> &mut dyn ResponseComposer {
        self
    }

    fn set_action(&mut self, _action: TemplateAction) -> &mut dyn ResponseComposer {
        self
    }

    fn set_speech(&mut self, _speech: &str) -> &mut dyn ResponseComposer {
        self
    }

    fn add(&mut self, _field: &str, _value: Value) -> &mut dyn ResponseComposer {
        self
    }

    fn append_slide(&mut self, _next: Box<dyn ResponseComposer>) -> &mut dyn ResponseComposer {
        self
    }

    fn build_state(&self) -> Option<Slide> {
        None
    }

    fn build(&mut self, _url: Option<&str>) -> Option<CanvasResponse> {
        None
    }

    fn is_active(&self) -> bool {
        false
    }

    fn collect_slides(&self, _out: &mut Vec<Slide>) {}
}
