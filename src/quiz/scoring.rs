//! Archetype scoring for a complete answer set

use super::bank::{Block, Category, QuestionBank};
use super::SubmittedAnswer;
use crate::{AnswerOption, Archetype, QuizAnswer, QuizResult, ValidationError};
use rayon::prelude::*;
use std::collections::HashSet;

/// Scorer for the Entrepreneurial DNA quiz
pub struct QuizScorer;

impl QuizScorer {
    /// Turn wire answers into typed answers, checking count, ids, duplicates
    /// and option letters.
    pub fn validate(
        bank: &QuestionBank,
        submitted: &[SubmittedAnswer],
    ) -> Result<Vec<QuizAnswer>, ValidationError> {
        Self::check_count(bank, submitted.len())?;

        let mut seen = HashSet::with_capacity(submitted.len());
        let mut answers = Vec::with_capacity(submitted.len());
        for raw in submitted {
            if bank.question(raw.question_id).is_none() {
                return Err(ValidationError::UnknownQuestion(raw.question_id));
            }
            if !seen.insert(raw.question_id) {
                return Err(ValidationError::DuplicateAnswer(raw.question_id));
            }
            let option =
                AnswerOption::parse(&raw.answer).ok_or_else(|| ValidationError::InvalidOption {
                    question_id: raw.question_id,
                    option: raw.answer.clone(),
                })?;
            answers.push(QuizAnswer::new(raw.question_id, option));
        }
        Ok(answers)
    }

    /// Validate and score wire answers
    pub fn score_submitted(
        bank: &QuestionBank,
        submitted: &[SubmittedAnswer],
    ) -> Result<QuizResult, ValidationError> {
        let answers = Self::validate(bank, submitted)?;
        Self::score(bank, &answers)
    }

    /// Score typed answers. One pass: two type-block counters and one
    /// awareness counter, then a three-way classification.
    pub fn score(bank: &QuestionBank, answers: &[QuizAnswer]) -> Result<QuizResult, ValidationError> {
        Self::check_count(bank, answers.len())?;

        let mut seen = HashSet::with_capacity(answers.len());
        let mut architect_score = 0u32;
        let mut alchemist_score = 0u32;
        let mut awareness_score = 0u32;

        for answer in answers {
            let question = bank
                .question(answer.question_id)
                .ok_or(ValidationError::UnknownQuestion(answer.question_id))?;
            if !seen.insert(answer.question_id) {
                return Err(ValidationError::DuplicateAnswer(answer.question_id));
            }

            match (question.block, question.category(answer.selected_option)) {
                (Block::Type, Category::Architect) => architect_score += 1,
                (Block::Type, Category::Alchemist) => alchemist_score += 1,
                (Block::Awareness, Category::Aware) => awareness_score += 1,
                _ => {}
            }
        }

        let awareness_percentage =
            Self::awareness_percentage(awareness_score, bank.awareness_block_len());
        let archetype = Self::classify(
            architect_score,
            alchemist_score,
            awareness_percentage,
            bank.awareness_threshold(),
        );

        Ok(QuizResult {
            archetype,
            awareness_percentage,
            architect_score,
            alchemist_score,
            awareness_score,
        })
    }

    /// Score a batch of submissions. Each entry is scored independently.
    pub fn score_many(
        bank: &QuestionBank,
        submissions: &[Vec<SubmittedAnswer>],
        parallel: bool,
    ) -> Vec<Result<QuizResult, ValidationError>> {
        if parallel {
            submissions
                .par_iter()
                .map(|answers| Self::score_submitted(bank, answers))
                .collect()
        } else {
            submissions
                .iter()
                .map(|answers| Self::score_submitted(bank, answers))
                .collect()
        }
    }

    /// Integer percentage of aware answers, floored
    pub fn awareness_percentage(awareness_score: u32, block_len: usize) -> u8 {
        if block_len == 0 {
            return 0;
        }
        let pct = (awareness_score as usize * 100) / block_len;
        pct.min(100) as u8
    }

    /// Tied tally is always Unfocused Potential; a dominant tally stands only
    /// at or above the awareness threshold.
    pub fn classify(
        architect_score: u32,
        alchemist_score: u32,
        awareness_percentage: u8,
        threshold: u8,
    ) -> Archetype {
        let aware = awareness_percentage >= threshold;
        if architect_score > alchemist_score {
            if aware {
                Archetype::Architect
            } else {
                Archetype::BlurredIdentity
            }
        } else if alchemist_score > architect_score {
            if aware {
                Archetype::Alchemist
            } else {
                Archetype::BlurredIdentity
            }
        } else {
            Archetype::UnfocusedPotential
        }
    }

    /// Short description of an archetype
    pub fn archetype_description(archetype: Archetype) -> &'static str {
        match archetype {
            Archetype::Architect => {
                "Structured and strategic - you build through systems, logic and clear plans"
            }
            Archetype::Alchemist => {
                "Intuitive and creative - you build through vision, energy and connection"
            }
            Archetype::BlurredIdentity => {
                "A clear default pattern, but low awareness of how you operate under pressure"
            }
            Archetype::UnfocusedPotential => {
                "No dominant pattern yet - your strengths are there but pulling in both directions"
            }
        }
    }

    fn check_count(bank: &QuestionBank, actual: usize) -> Result<(), ValidationError> {
        if actual != bank.len() {
            return Err(ValidationError::WrongAnswerCount {
                expected: bank.len(),
                actual,
            });
        }
        Ok(())
    }
}
