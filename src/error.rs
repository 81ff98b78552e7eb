//! Error types for scoring and configuration

use thiserror::Error;

/// A submitted answer set that cannot be scored. The caller must resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected {expected} answers, got {actual}")]
    WrongAnswerCount { expected: usize, actual: usize },

    #[error("unknown question id: {0}")]
    UnknownQuestion(u32),

    #[error("question {0} answered more than once")]
    DuplicateAnswer(u32),

    #[error("invalid option '{option}' for question {question_id} (expected A, B, C or D)")]
    InvalidOption { question_id: u32, option: String },
}

/// A question bank that cannot be used for scoring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("question bank has no {0} questions")]
    EmptyBlock(&'static str),

    #[error("question id {0} appears more than once in the bank")]
    DuplicateQuestion(u32),

    #[error("question {question_id} option {option}: category '{category}' is not allowed in the {block} block")]
    MisplacedCategory {
        question_id: u32,
        option: crate::AnswerOption,
        category: &'static str,
        block: &'static str,
    },

    #[error("awareness threshold {0} is above 100")]
    ThresholdOutOfRange(u8),
}

/// Configuration errors that are not plain I/O or JSON failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid question bank: {0}")]
    Bank(#[from] BankError),

    #[error("unknown tier '{0}' in config (expected beginner, intermediate, advanced or mastermind)")]
    UnknownTier(String),

    #[error("course list must be an array of ids or the string \"ALL\", got \"{0}\"")]
    InvalidCourseAllowance(String),

    #[error(
        "retake cooldown of {0} days is out of range (expected at most {max})",
        max = crate::quiz::retake::MAX_COOLDOWN_DAYS
    )]
    CooldownOutOfRange(u32),
}
