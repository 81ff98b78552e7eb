//! Scored submission with the retake cooldown applied

use super::bank::QuestionBank;
use super::retake::RetakePolicy;
use super::scoring::QuizScorer;
use super::SubmittedAnswer;
use crate::results::{ResultsFile, StoredResult};
use crate::{QuizResult, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// What the submitter sees: the result plus when they may retake
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    #[serde(flatten)]
    pub result: QuizResult,
    pub can_retake: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retake_date: Option<DateTime<Utc>>,
    /// False when the cooldown was still running and the previous result was returned
    pub stored: bool,
    pub taken_at: DateTime<Utc>,
}

/// Score `answers` for `user_id` and store the result, unless the user's
/// previous result is still inside the cooldown. In that case the previous
/// result is returned unchanged and nothing is stored.
pub fn submit(
    store: &mut ResultsFile,
    bank: &QuestionBank,
    policy: &RetakePolicy,
    user_id: &str,
    answers: &[SubmittedAnswer],
    now: DateTime<Utc>,
) -> Result<QuizOutcome, ValidationError> {
    let typed = QuizScorer::validate(bank, answers)?;
    let result = QuizScorer::score(bank, &typed)?;

    if let Some(previous) = store.latest_for_user(user_id) {
        let eligibility = policy.eligibility(Some(previous.created_at), now);
        if !eligibility.can_retake {
            info!(
                user = user_id,
                next = ?eligibility.next_retake_date,
                "retake refused, returning previous result"
            );
            return Ok(QuizOutcome {
                result: previous.result,
                can_retake: false,
                next_retake_date: eligibility.next_retake_date,
                stored: false,
                taken_at: previous.created_at,
            });
        }
    }

    store.append(StoredResult {
        user_id: user_id.to_string(),
        result,
        responses: typed,
        created_at: now,
    });
    info!(user = user_id, archetype = %result.archetype, "stored quiz result");

    Ok(QuizOutcome {
        result,
        can_retake: false,
        next_retake_date: Some(policy.next_eligible(now)),
        stored: true,
        taken_at: now,
    })
}

/// Latest stored result for a user, with its retake eligibility at `now`
pub fn latest_result(
    store: &ResultsFile,
    policy: &RetakePolicy,
    user_id: &str,
    now: DateTime<Utc>,
) -> Option<QuizOutcome> {
    let previous = store.latest_for_user(user_id)?;
    let eligibility = policy.eligibility(Some(previous.created_at), now);
    Some(QuizOutcome {
        result: previous.result,
        can_retake: eligibility.can_retake,
        next_retake_date: eligibility.next_retake_date,
        stored: true,
        taken_at: previous.created_at,
    })
}
