//! Dialogue orchestration
//!
//! `Fulfillment` maps every [`Action`] to a handler. A handler reads and
//! mutates the turn's session record, asks the quiz engine for decisions,
//! composes the three surface renditions, and finishes with exactly one ask
//! or close. Setup actions (`LOAD_SETTINGS`, `SETUP_QUIZ`) only touch the
//! session record and leave the prompt to the platform's scene.
//!
//! Handlers are split by conversation phase:
//!
//! - `start`: intro, start confirmation and its reprompts
//! - `turns`: questions, answers and the outcome
//! - `recovery`: help, repeat, skip, no-match/no-input ladders, restart and quit
//!
//! # Escalation
//!
//! Reprompt ladders are two deep. The platform advances the level on each
//! consecutive failure; the `*_MAX_*` level always closes the conversation.

pub mod action;
mod recovery;
mod start;
mod turns;

pub use action::Action;

use crate::canvas::ResponseComposer;
use crate::conversation::Conversation;
use crate::dispatch::PromptItem;
use crate::quiz;
use sdk::errors::EngineError;
use sdk::types::Question;
use tracing::info;

/// Content spliced in front of the next main slide
///
/// Built by a handler that has something to say before the question or
/// outcome it hands off to (an intro, a followup, a restart greeting).
#[derive(Debug)]
pub struct Transition {
    /// Voice-only speech
    pub simple: String,
    /// Chat items, possibly empty
    pub rich: Vec<PromptItem>,
    /// Canvas slide the main slide is appended to
    pub immersive: Box<dyn ResponseComposer>,
}

/// Handler table for all fulfillment actions
#[derive(Debug, Default, Clone, Copy)]
pub struct Fulfillment;

impl Fulfillment {
    pub fn new() -> Self {
        Self
    }

    /// Run the handler bound to `action`
    pub async fn handle(&self, action: Action, conv: &mut Conversation) -> Result<(), EngineError> {
        info!(
            "Handling {} for session {} (count {}/{})",
            action, conv.session_id, conv.data.quiz.count, conv.data.quiz.limit
        );
        match action {
            Action::LoadSettings => self.load_settings(conv).await,
            Action::SetupQuiz => self.setup_quiz(conv).await,
            Action::StartSkipConfirmation => self.start_skip_confirmation(conv).await,
            Action::StartConfirmation => self.start_confirmation(conv).await,
            Action::StartYes => self.start_yes(conv).await,
            Action::StartNo => self.start_no(conv).await,
            Action::StartHelp => self.start_help(conv).await,
            Action::StartRepeat => self.start_repeat(conv).await,
            Action::StartNoMatch1 => self.start_no_match_1(conv).await,
            Action::StartNoMatch2 => self.start_no_match_2(conv).await,
            Action::StartNoInput1 => self.start_no_input_1(conv).await,
            Action::StartNoInput2 => self.start_no_input_2(conv).await,
            Action::QuestionRepeat => self.question_repeat(conv).await,
            Action::Answer => self.answer(conv, None).await,
            Action::AnswerOrdinal => self.answer_ordinal(conv).await,
            Action::AnswerBothOrNone => self.answer_both_or_none(conv).await,
            Action::AnswerHelp => self.answer_help(conv).await,
            Action::AnswerSkip => self.answer_skip(conv).await,
            Action::AnswerNoMatch1 => self.answer_no_match_1(conv).await,
            Action::AnswerNoMatch2 => self.answer_no_match_2(conv).await,
            Action::AnswerMaxNoMatch => self.answer_max_no_match(conv).await,
            Action::AnswerNoInput1 => self.answer_no_input_1(conv).await,
            Action::AnswerNoInput2 => self.answer_no_input_2(conv).await,
            Action::AnswerMaxNoInput => self.answer_max_no_input(conv).await,
            Action::RestartConfirmation => self.restart_confirmation(conv).await,
            Action::RestartYes => self.restart_yes(conv).await,
            Action::RestartNo => self.quit_no(conv).await,
            Action::RestartRepeat => self.restart_confirmation(conv).await,
            Action::PlayAgainYes => self.play_again_yes(conv).await,
            Action::PlayAgainNo => self.play_again_no(conv).await,
            Action::PlayAgainRepeat => self.restart_confirmation(conv).await,
            Action::QuitConfirmation => self.quit_confirmation(conv).await,
            Action::QuitYes => self.quit_yes(conv).await,
            Action::QuitNo => self.quit_no(conv).await,
            Action::QuitRepeat => self.quit_confirmation(conv).await,
            Action::GenericNoMatch => self.generic_no_match(conv).await,
            Action::GenericMaxNoMatch => self.generic_max_no_match(conv).await,
            Action::GenericNoInput => self.generic_no_input(conv).await,
            Action::GenericMaxNoInput => self.generic_max_no_input(conv).await,
        }
    }

    /// Overlay remote quiz settings onto the session's settings
    pub async fn load_settings(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let remote = conv.content.get_quiz_settings().await?;
        conv.data.quiz_settings.merge_remote(&remote)
    }

    /// Start a new quiz from the full question pool
    pub async fn setup_quiz(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let questions = conv.content.get_all_questions().await?;
        self.setup_quiz_with(conv, questions);
        Ok(())
    }

    fn setup_quiz_with(&self, conv: &mut Conversation, questions: Vec<Question>) {
        let per_quiz = conv.data.quiz_settings.questions_per_quiz;
        conv.data.quiz = quiz::init_session_state(questions, per_quiz, &mut conv.rng);
        conv.data.quiz_settings.questions_per_quiz = conv.data.quiz.limit;
        info!(
            "Quiz ready with {} question(s) across {} trait(s)",
            conv.data.quiz.limit,
            conv.data.quiz.trait_to_weight.len()
        );
    }
}
