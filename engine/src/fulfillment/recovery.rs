//! Help, reprompt, restart and quit handlers

use super::{Fulfillment, Transition};
use crate::canvas::{CanvasState, Template, TemplateAction};
use crate::content::{pick_prompt, PromptName};
use crate::conversation::Conversation;
use crate::dispatch::{PromptItem, Simple};
use sdk::errors::EngineError;
use serde_json::json;

const PLAY_AGAIN_CHIPS: [PromptName; 2] = [
    PromptName::EndOfGamePlayAgainYes,
    PromptName::EndOfGamePlayAgainNo,
];

const YES_NO_CHIPS: [PromptName; 2] = [PromptName::GenericYes, PromptName::GenericNo];

impl Fulfillment {
    /// Reprompt about the current question, with its answer chips
    async fn reprompt_question(
        &self,
        conv: &mut Conversation,
        name: PromptName,
    ) -> Result<(), EngineError> {
        conv.setup_session_type_and_speech_biasing()?;
        let chips = conv.question_rich_suggestions()?;
        conv.ask_with_prompt(name, Some(chips)).await
    }

    /// Start a fresh quiz and lead into its first question
    async fn replay(
        &self,
        conv: &mut Conversation,
        action: TemplateAction,
    ) -> Result<(), EngineError> {
        let (prompt, questions) = tokio::try_join!(
            conv.content.prompt_candidates(PromptName::RestartYesResponse),
            conv.content.get_all_questions(),
        )?;
        let prompt = pick_prompt(PromptName::RestartYesResponse, prompt, &mut conv.rng)?;
        self.setup_quiz_with(conv, questions);

        let immersive = conv.new_canvas(
            CanvasState::new()
                .with_template(Template::Say)
                .with_action(action)
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

    /// Reply that matches both answers or neither
    pub async fn answer_both_or_none(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.reprompt_question(conv, PromptName::GenericNoMatchNonanswer).await
    }

    pub async fn answer_help(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.reprompt_question(conv, PromptName::AnswerHelp).await
    }

    /// Skipping is not allowed; the question stands
    pub async fn answer_skip(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.reprompt_question(conv, PromptName::Skip).await
    }

    pub async fn answer_no_match_1(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.reprompt_question(conv, PromptName::AnswerNoMatch1).await
    }

    pub async fn answer_no_match_2(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.reprompt_question(conv, PromptName::AnswerNoMatch2).await
    }

    pub async fn answer_max_no_match(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::AnswerMaxNoMatch).await
    }

    pub async fn answer_no_input_1(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.setup_session_type_and_speech_biasing()?;
        conv.ask_with_prompt(PromptName::AnswerNoInput1, None).await
    }

    pub async fn answer_no_input_2(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.setup_session_type_and_speech_biasing()?;
        conv.ask_with_prompt(PromptName::AnswerNoInput2, None).await
    }

    pub async fn answer_max_no_input(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::AnswerMaxNoInput).await
    }

    /// Ask whether to throw away the current quiz
    pub async fn restart_confirmation(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let chips = conv.build_prompt_rich_suggestions(&PLAY_AGAIN_CHIPS).await?;
        conv.ask_with_prompt(PromptName::RestartConfirmation, Some(chips)).await
    }

    /// Restart mid-quiz; the canvas resets instead of celebrating
    pub async fn restart_yes(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.replay(conv, TemplateAction::Reset).await
    }

    /// Another round after an outcome
    pub async fn play_again_yes(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.replay(conv, TemplateAction::Positive).await
    }

    pub async fn play_again_no(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::RestartNoResponse).await
    }

    pub async fn quit_confirmation(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let chips = conv.build_prompt_rich_suggestions(&YES_NO_CHIPS).await?;
        conv.ask_with_prompt(PromptName::QuitConfirmation, Some(chips)).await
    }

    pub async fn quit_yes(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::AcknowledgeQuit).await
    }

    /// Stay in the quiz and go back to the current question
    pub async fn quit_no(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        self.reprompt_question(conv, PromptName::ContinueToPlay).await
    }

    pub async fn generic_no_match(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.ask_with_prompt(PromptName::GenericNoMatch, None).await
    }

    pub async fn generic_max_no_match(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::GenericMaxNoMatch).await
    }

    pub async fn generic_no_input(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.ask_with_prompt(PromptName::GenericNoInput, None).await
    }

    pub async fn generic_max_no_input(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        conv.close_with_prompt(PromptName::GenericMaxNoInput).await
    }
}
