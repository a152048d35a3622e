//! General prompt catalogue
//!
//! Every prompt the engine speaks has a sheet key and a variant count. A
//! prompt with `N > 0` variants is stored as `<key>_variant_1` through
//! `<key>_variant_N`; a prompt with no variants is stored under its key.

/// Suffix joining a prompt key to its variant number
pub const VARIANT_SUFFIX: &str = "_variant_";

/// Named prompts the dialogue can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptName {
    IntroConfirmation,
    IntroConfirmationPositive,
    IntroConfirmationNegative,
    IntroPositiveResponse,
    IntroNegativeResponse,
    IntroNoMatch1,
    IntroNoMatch2,
    IntroNoInput1,
    IntroNoInput2,
    StartRepeat,
    StartHelp,
    TransitionsRegular,
    TransitionsFinal,
    QuestionRepeat,
    AnswerHelp,
    AnswerNoMatch1,
    AnswerNoMatch2,
    AnswerMaxNoMatch,
    AnswerNoInput1,
    AnswerNoInput2,
    AnswerMaxNoInput,
    OutcomeIntro,
    EndOfGame,
    EndOfGamePlayAgainYes,
    EndOfGamePlayAgainNo,
    RestartConfirmation,
    RestartYesResponse,
    RestartNoResponse,
    Skip,
    QuitConfirmation,
    ContinueToPlay,
    AcknowledgeQuit,
    GenericNoMatch,
    GenericMaxNoMatch,
    GenericNoInput,
    GenericMaxNoInput,
    QuestionOr,
    GenericYes,
    GenericNo,
    GenericNoMatchNonanswer,
}

impl PromptName {
    /// Every prompt, in catalogue order
    pub const ALL: [PromptName; 40] = [
        PromptName::IntroConfirmation,
        PromptName::IntroConfirmationPositive,
        PromptName::IntroConfirmationNegative,
        PromptName::IntroPositiveResponse,
        PromptName::IntroNegativeResponse,
        PromptName::IntroNoMatch1,
        PromptName::IntroNoMatch2,
        PromptName::IntroNoInput1,
        PromptName::IntroNoInput2,
        PromptName::StartRepeat,
        PromptName::StartHelp,
        PromptName::TransitionsRegular,
        PromptName::TransitionsFinal,
        PromptName::QuestionRepeat,
        PromptName::AnswerHelp,
        PromptName::AnswerNoMatch1,
        PromptName::AnswerNoMatch2,
        PromptName::AnswerMaxNoMatch,
        PromptName::AnswerNoInput1,
        PromptName::AnswerNoInput2,
        PromptName::AnswerMaxNoInput,
        PromptName::OutcomeIntro,
        PromptName::EndOfGame,
        PromptName::EndOfGamePlayAgainYes,
        PromptName::EndOfGamePlayAgainNo,
        PromptName::RestartConfirmation,
        PromptName::RestartYesResponse,
        PromptName::RestartNoResponse,
        PromptName::Skip,
        PromptName::QuitConfirmation,
        PromptName::ContinueToPlay,
        PromptName::AcknowledgeQuit,
        PromptName::GenericNoMatch,
        PromptName::GenericMaxNoMatch,
        PromptName::GenericNoInput,
        PromptName::GenericMaxNoInput,
        PromptName::QuestionOr,
        PromptName::GenericYes,
        PromptName::GenericNo,
        PromptName::GenericNoMatchNonanswer,
    ];

    /// Sheet key and number of variants
    pub fn spec(&self) -> (&'static str, usize) {
        use PromptName::*;
        match self {
            IntroConfirmation => ("intro_confirmation_question", 3),
            IntroConfirmationPositive => ("intro_confirmation_positive", 0),
            IntroConfirmationNegative => ("intro_confirmation_negative", 0),
            IntroPositiveResponse => ("intro_positive_response", 3),
            IntroNegativeResponse => ("intro_negative_response", 3),
            IntroNoMatch1 => ("intro_no_match_first", 3),
            IntroNoMatch2 => ("intro_no_match_second", 3),
            IntroNoInput1 => ("intro_no_input_first", 3),
            IntroNoInput2 => ("intro_no_input_second", 3),
            StartRepeat => ("start_repeat", 3),
            StartHelp => ("start_help", 0),
            TransitionsRegular => ("transitions_regular", 3),
            TransitionsFinal => ("transitions_final", 3),
            QuestionRepeat => ("question_repeat", 3),
            AnswerHelp => ("answer_help", 0),
            AnswerNoMatch1 => ("answer_no_match_first", 3),
            AnswerNoMatch2 => ("answer_no_match_second", 3),
            AnswerMaxNoMatch => ("answer_max_no_match", 3),
            AnswerNoInput1 => ("answer_no_input_first", 3),
            AnswerNoInput2 => ("answer_no_input_second", 3),
            AnswerMaxNoInput => ("answer_max_no_input", 3),
            OutcomeIntro => ("outcome_intro", 3),
            EndOfGame => ("end_of_game", 3),
            EndOfGamePlayAgainYes => ("end_of_game_play_again_yes", 0),
            EndOfGamePlayAgainNo => ("end_of_game_play_again_no", 0),
            RestartConfirmation => ("restart_confirmation", 3),
            RestartYesResponse => ("restart_yes_response", 3),
            RestartNoResponse => ("restart_no_response", 3),
            Skip => ("skip", 3),
            QuitConfirmation => ("quit_confirmation", 3),
            ContinueToPlay => ("continue_to_play", 3),
            AcknowledgeQuit => ("acknowledge_quit", 3),
            GenericNoMatch => ("generic_no_match", 3),
            GenericMaxNoMatch => ("generic_max_no_match", 3),
            GenericNoInput => ("generic_no_input", 3),
            GenericMaxNoInput => ("generic_max_no_input", 3),
            QuestionOr => ("question_or", 0),
            GenericYes => ("generic_yes", 0),
            GenericNo => ("generic_no", 0),
            GenericNoMatchNonanswer => ("generic_no_match_nonanswer", 3),
        }
    }

    pub fn key(&self) -> &'static str {
        self.spec().0
    }

    /// Storage keys to fetch for this prompt
    pub fn variant_keys(&self) -> Vec<String> {
        let (key, variants) = self.spec();
        if variants == 0 {
            return vec![key.to_string()];
        }
        (1..=variants)
            .map(|i| format!("{}{}{}", key, VARIANT_SUFFIX, i))
            .collect()
    }
}
