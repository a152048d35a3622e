//! Fulfillment action symbols

use sdk::errors::EngineError;
use std::fmt;
use std::str::FromStr;

/// Every action the platform can route to this webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LoadSettings,
    SetupQuiz,
    StartSkipConfirmation,
    StartConfirmation,
    StartYes,
    StartNo,
    StartHelp,
    StartRepeat,
    StartNoMatch1,
    StartNoMatch2,
    StartNoInput1,
    StartNoInput2,
    QuestionRepeat,
    Answer,
    AnswerOrdinal,
    AnswerBothOrNone,
    AnswerHelp,
    AnswerSkip,
    AnswerNoMatch1,
    AnswerNoMatch2,
    AnswerMaxNoMatch,
    AnswerNoInput1,
    AnswerNoInput2,
    AnswerMaxNoInput,
    RestartConfirmation,
    RestartYes,
    RestartNo,
    RestartRepeat,
    PlayAgainYes,
    PlayAgainNo,
    PlayAgainRepeat,
    QuitConfirmation,
    QuitYes,
    QuitNo,
    QuitRepeat,
    GenericNoMatch,
    GenericMaxNoMatch,
    GenericNoInput,
    GenericMaxNoInput,
}

impl Action {
    pub const ALL: [Action; 39] = [
        Action::LoadSettings,
        Action::SetupQuiz,
        Action::StartSkipConfirmation,
        Action::StartConfirmation,
        Action::StartYes,
        Action::StartNo,
        Action::StartHelp,
        Action::StartRepeat,
        Action::StartNoMatch1,
        Action::StartNoMatch2,
        Action::StartNoInput1,
        Action::StartNoInput2,
        Action::QuestionRepeat,
        Action::Answer,
        Action::AnswerOrdinal,
        Action::AnswerBothOrNone,
        Action::AnswerHelp,
        Action::AnswerSkip,
        Action::AnswerNoMatch1,
        Action::AnswerNoMatch2,
        Action::AnswerMaxNoMatch,
        Action::AnswerNoInput1,
        Action::AnswerNoInput2,
        Action::AnswerMaxNoInput,
        Action::RestartConfirmation,
        Action::RestartYes,
        Action::RestartNo,
        Action::RestartRepeat,
        Action::PlayAgainYes,
        Action::PlayAgainNo,
        Action::PlayAgainRepeat,
        Action::QuitConfirmation,
        Action::QuitYes,
        Action::QuitNo,
        Action::QuitRepeat,
        Action::GenericNoMatch,
        Action::GenericMaxNoMatch,
        Action::GenericNoInput,
        Action::GenericMaxNoInput,
    ];

    /// Handler name as the platform sends it
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::LoadSettings => "LOAD_SETTINGS",
            Action::SetupQuiz => "SETUP_QUIZ",
            Action::StartSkipConfirmation => "START_SKIP_CONFIRMATION",
            Action::StartConfirmation => "START_CONFIRMATION",
            Action::StartYes => "START_YES",
            Action::StartNo => "START_NO",
            Action::StartHelp => "START_HELP",
            Action::StartRepeat => "START_REPEAT",
            Action::StartNoMatch1 => "START_NO_MATCH_1",
            Action::StartNoMatch2 => "START_NO_MATCH_2",
            Action::StartNoInput1 => "START_NO_INPUT_1",
            Action::StartNoInput2 => "START_NO_INPUT_2",
            Action::QuestionRepeat => "QUESTION_REPEAT",
            Action::Answer => "ANSWER",
            Action::AnswerOrdinal => "ANSWER_ORDINAL",
            Action::AnswerBothOrNone => "ANSWER_BOTH_OR_NONE",
            Action::AnswerHelp => "ANSWER_HELP",
            Action::AnswerSkip => "ANSWER_SKIP",
            Action::AnswerNoMatch1 => "ANSWER_NO_MATCH_1",
            Action::AnswerNoMatch2 => "ANSWER_NO_MATCH_2",
            Action::AnswerMaxNoMatch => "ANSWER_MAX_NO_MATCH",
            Action::AnswerNoInput1 => "ANSWER_NO_INPUT_1",
            Action::AnswerNoInput2 => "ANSWER_NO_INPUT_2",
            Action::AnswerMaxNoInput => "ANSWER_MAX_NO_INPUT",
            Action::RestartConfirmation => "RESTART_CONFIRMATION",
            Action::RestartYes => "RESTART_YES",
            Action::RestartNo => "RESTART_NO",
            Action::RestartRepeat => "RESTART_REPEAT",
            Action::PlayAgainYes => "PLAY_AGAIN_YES",
            Action::PlayAgainNo => "PLAY_AGAIN_NO",
            Action::PlayAgainRepeat => "PLAY_AGAIN_REPEAT",
            Action::QuitConfirmation => "QUIT_CONFIRMATION",
            Action::QuitYes => "QUIT_YES",
            Action::QuitNo => "QUIT_NO",
            Action::QuitRepeat => "QUIT_REPEAT",
            Action::GenericNoMatch => "GENERIC_NO_MATCH",
            Action::GenericMaxNoMatch => "GENERIC_MAX_NO_MATCH",
            Action::GenericNoInput => "GENERIC_NO_INPUT",
            Action::GenericMaxNoInput => "GENERIC_MAX_NO_INPUT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| EngineError::UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        let names: HashSet<_> = Action::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(names.len(), Action::ALL.len());
    }

    #[test]
    fn test_unknown_action() {
        assert!(matches!(
            "DANCE".parse::<Action>(),
            Err(EngineError::UnknownAction(name)) if name == "DANCE"
        ));
    }
}
