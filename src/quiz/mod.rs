//! Quiz module - Entrepreneurial DNA scoring and retake policy

pub mod bank;
pub mod retake;
pub mod scoring;
pub mod submission;

pub use bank::{Block, Category, OptionCategories, Question, QuestionBank};
pub use retake::{Eligibility, RetakePolicy};
pub use scoring::QuizScorer;
pub use submission::{latest_result, submit, QuizOutcome};

use serde::{Deserialize, Serialize};

/// An answer as it arrives from a client: the letter is still unchecked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: u32,
    #[serde(alias = "selectedOption")]
    pub answer: String,
}

/// Body of a quiz submission: `{ "answers": [{ "questionId": 1, "answer": "A" }, ...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(alias = "responses")]
    pub answers: Vec<SubmittedAnswer>,
}
