//! Turn runner
//!
//! Runs one fulfillment turn end to end: builds the `Conversation`, resolves
//! and runs the handler, and renders the response. Every failure is caught
//! here. A failed turn is rolled back to the inbound session bag and closed
//! with the generic max-no-match prompt; if even that prompt cannot be
//! fetched, the turn closes with a fixed sentence.
//!
//! With debug info enabled, a failed turn also leaves the handler name and
//! the error hint in the session bag under [`DEBUG_INFO_KEY`].

use crate::content::ContentClient;
use crate::conversation::wire::{
    NextScene, PromptPayload, Scene, SessionInfo, TurnRequest, TurnResponse,
    END_CONVERSATION_SCENE,
};
use crate::conversation::{Conversation, TurnSettings};
use crate::dispatch::{PromptItem, Simple};
use crate::fulfillment::{Action, Fulfillment};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdk::errors::{EngineError, PersonaErrorExt};
use sdk::ContentStore;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info_span, Instrument};

/// Spoken when the turn cannot produce any prompt at all
pub const UNKNOWN_ERROR_SPEECH: &str = "An unknown error occurred.";

/// Session parameter holding the last failure when debug info is enabled
pub const DEBUG_INFO_KEY: &str = "debugInfo";

/// Shared, stateless turn executor
pub struct TurnRunner {
    store: Arc<dyn ContentStore>,
    settings: TurnSettings,
    fulfillment: Fulfillment,
    rng_seed: Option<u64>,
    debug_info: bool,
}

impl std::fmt::Debug for TurnRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnRunner")
            .field("store", &self.store.name())
            .field("settings", &self.settings)
            .field("rng_seed", &self.rng_seed)
            .field("debug_info", &self.debug_info)
            .finish()
    }
}

impl TurnRunner {
    pub fn new(store: Arc<dyn ContentStore>, settings: TurnSettings) -> Self {
        Self {
            store,
            settings,
            fulfillment: Fulfillment::new(),
            rng_seed: None,
            debug_info: false,
        }
    }

    /// Seed every turn's RNG with a fixed value
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Leave failure details in the session bag of failed turns
    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.debug_info = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    fn turn_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run one turn; never fails
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        let span = info_span!(
            "turn",
            handler = %request.handler.name,
            session = %request.session.id
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: TurnRequest) -> TurnResponse {
        let inbound = request.session.clone();
        let content = ContentClient::new(Arc::clone(&self.store), request.user.locale.clone());
        let mut conv = Conversation::new(request, content, &self.settings, self.turn_rng());

        let result = match conv.handler.parse::<Action>() {
            Ok(action) => self.fulfillment.handle(action, &mut conv).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if self.debug_info {
                    conv.params.remove(DEBUG_INFO_KEY);
                }
            }
            Err(e) => {
                error!(
                    "Turn {} failed: {} (hint: {}, recoverable: {})",
                    conv.handler,
                    e,
                    e.user_hint(),
                    e.is_recoverable()
                );
                self.recover(&mut conv, &inbound).await;
                if self.debug_info {
                    conv.params
                        .insert(DEBUG_INFO_KEY.to_string(), debug_info(&conv.handler, &e));
                }
            }
        }

        match conv.into_response() {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to render turn response: {}", e);
                fallback_response(inbound)
            }
        }
    }

    /// Replace a failed turn's output with a closing prompt
    async fn recover(&self, conv: &mut Conversation, inbound: &SessionInfo) {
        conv.restore(inbound.params.clone(), inbound.type_overrides.clone());
        if let Err(e) = self.fulfillment.generic_max_no_match(conv).await {
            error!("Fallback prompt failed: {}", e);
            conv.restore(inbound.params.clone(), inbound.type_overrides.clone());
            conv.add(PromptItem::Simple(Simple::speech(UNKNOWN_ERROR_SPEECH)));
            conv.end_conversation();
        }
    }
}

fn debug_info(handler: &str, error: &EngineError) -> serde_json::Value {
    json!({
        "handler": handler,
        "hint": error.user_hint(),
        "recoverable": error.is_recoverable(),
    })
}

/// Closing response echoing the inbound session untouched
fn fallback_response(session: SessionInfo) -> TurnResponse {
    TurnResponse {
        session,
        prompt: PromptPayload {
            first_simple: Some(Simple::speech(UNKNOWN_ERROR_SPEECH)),
            ..Default::default()
        },
        scene: Some(Scene {
            next: NextScene {
                name: END_CONVERSATION_SCENE.to_string(),
            },
        }),
        expected: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_response_closes() {
        let session = SessionInfo {
            id: "s1".to_string(),
            ..Default::default()
        };
        let response = fallback_response(session.clone());
        assert_eq!(response.session, session);
        assert_eq!(
            response.prompt.first_simple.unwrap().speech,
            UNKNOWN_ERROR_SPEECH
        );
        assert_eq!(response.scene.unwrap().next.name, END_CONVERSATION_SCENE);
    }

    #[test]
    fn test_debug_info_names_handler_and_hint() {
        let error = EngineError::UnknownAction("DANCE".to_string());
        let info = debug_info("DANCE", &error);
        assert_eq!(info["handler"], "DANCE");
        assert_eq!(info["hint"], error.user_hint());
        assert_eq!(info["recoverable"], error.is_recoverable());
    }
}
