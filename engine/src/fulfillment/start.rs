//! Intro and start confirmation handlers

use super::{Fulfillment, Transition};
use crate::canvas::{CanvasState, Template, TemplateAction};
use crate::content::{pick_intro, pick_prompt, PromptName};
use crate::conversation::{clean_rich_suggestion, Conversation};
use crate::dispatch::{PromptItem, Simple, TurnResponses};
use sdk::errors::EngineError;
use sdk::types::QuizIntro;
use serde_json::{json, Value};

/// Chips offered while the player decides whether to start
const START_CHIPS: [PromptName; 2] = [
    PromptName::IntroConfirmationPositive,
    PromptName::IntroConfirmationNegative,
];

/// Intro slide state shared by both start paths
fn intro_state(conv: &Conversation, intro: &QuizIntro, speech: &str) -> CanvasState {
    let settings = &conv.data.quiz_settings;
    CanvasState::new()
        .with_url(conv.immersive_url().to_string())
        .with_template(Template::Intro)
        .with_action(TemplateAction::Reset)
        .with_speech(speech)
        .with_data(json!({
            "header": settings.intro_title,
            "body": settings.intro_subtitle,
            "progress": -1,
            "background": {
                "landscape": intro.background_landscape,
                "portrait": intro.background_portrait,
            },
        }))
        .with_config(Value::Object(settings.to_map()))
}

impl Fulfillment {
    /// Play the intro and go straight to the first question
    pub async fn start_skip_confirmation(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let intro = conv.get_random_intro().await?;
        let intro_simple = intro.prompt();
        let immersive = conv.new_canvas(intro_state(conv, &intro, &intro_simple.speech));
        let transition = Transition {
            simple: intro_simple.speech.clone(),
            rich: vec![PromptItem::Simple(Simple::from(intro_simple))],
            immersive,
        };
        self.question(conv, Some(transition)).await
    }

    /// Play the intro and ask whether to start
    pub async fn start_confirmation(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let (intros, confirmation, positive, negative) = tokio::try_join!(
            conv.content.get_all_intros(),
            conv.content.prompt_candidates(PromptName::IntroConfirmation),
            conv.content.prompt_candidates(PromptName::IntroConfirmationPositive),
            conv.content.prompt_candidates(PromptName::IntroConfirmationNegative),
        )?;
        let intro = pick_intro(intros, &mut conv.rng)?;
        let confirmation = pick_prompt(PromptName::IntroConfirmation, confirmation, &mut conv.rng)?;
        let positive = pick_prompt(PromptName::IntroConfirmationPositive, positive, &mut conv.rng)?;
        let negative = pick_prompt(PromptName::IntroConfirmationNegative, negative, &mut conv.rng)?;

        let intro_simple = intro.prompt();
        let ssml = conv.ssml.merge(&[&intro_simple.speech, &confirmation.speech]);

        let state = intro_state(conv, &intro, &ssml).with_suggestions(vec![json!({
            "text": conv.data.quiz_settings.start_button_text,
            "speech": positive.text,
        })]);
        conv.immersive = conv.new_canvas(state);

        let mut immersive = vec![PromptItem::Simple(Simple::speech(ssml.clone()))];
        immersive.extend(conv.build_canvas());

        conv.ask(TurnResponses {
            simple: ssml,
            rich: vec![
                PromptItem::Simple(Simple::from(intro_simple)),
                PromptItem::Simple(Simple::from(confirmation)),
                PromptItem::Suggestion(clean_rich_suggestion(&positive.text)),
                PromptItem::Suggestion(clean_rich_suggestion(&negative.text)),
            ],
            immersive,
        });
        Ok(())
    }

    /// Player agreed to start
    pub async fn start_yes(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let prompt = conv.get_random_prompt(PromptName::IntroPositiveResponse).await?;
        let immersive = conv.new_canvas(
            CanvasState::new()
                .with_template(Template::Say)
                .with_action(TemplateAction::Positive)
                .with_speech(prompt.speech.clone())
                .with_data(json!({"progress": -1}))
                .with_config(json!({"questionsPerQuiz": conv.data.quiz.limit})),
        );
        let transition = Transition {
            simple: prompt.speech.clone(),
            rich: vec![PromptItem::Simple(Simple::from(prompt))],
            immersive,
        };
        self.question(conv, Some(transition)).await
    }

    pub async fn start_no(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::IntroNegativeResponse).await
    }

    pub async fn start_help(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let chips = conv.build_prompt_rich_suggestions(&START_CHIPS).await?;
        conv.ask_with_prompt(PromptName::StartHelp, Some(chips)).await
    }

    pub async fn start_repeat(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let chips = conv.build_prompt_rich_suggestions(&START_CHIPS).await?;
        conv.ask_with_prompt(PromptName::StartRepeat, Some(chips)).await
    }

    pub async fn start_no_match_1(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let chips = conv.build_prompt_rich_suggestions(&START_CHIPS).await?;
        conv.ask_with_prompt(PromptName::IntroNoMatch1, Some(chips)).await
    }

    pub async fn start_no_match_2(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let chips = conv.build_prompt_rich_suggestions(&START_CHIPS).await?;
        conv.ask_with_prompt(PromptName::IntroNoMatch2, Some(chips)).await
    }

    pub async fn start_no_input_1(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.ask_with_prompt(PromptName::IntroNoInput1, None).await
    }

    pub async fn start_no_input_2(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.ask_with_prompt(PromptName::IntroNoInput2, None).await
    }
}
