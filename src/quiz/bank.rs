//! Question bank: per-question, per-option category table

use crate::{AnswerOption, BankError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default minimum awareness percentage for a dominant archetype to stand
pub const DEFAULT_AWARENESS_THRESHOLD: u8 = 70;

/// What choosing an option says about the respondent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Architect,
    Alchemist,
    Blurred,
    Neutral,
    /// Self-aware answer (awareness block only)
    Aware,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Architect => "architect",
            Category::Alchemist => "alchemist",
            Category::Blurred => "blurred",
            Category::Neutral => "neutral",
            Category::Aware => "aware",
        }
    }

    fn allowed_in(self, block: Block) -> bool {
        match (self, block) {
            (Category::Architect | Category::Alchemist, Block::Type) => true,
            (Category::Aware, Block::Awareness) => true,
            (Category::Blurred | Category::Neutral, _) => true,
            _ => false,
        }
    }
}

/// Which tally a question feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    /// Default DNA block: architect vs alchemist tally
    Type,
    /// Awareness block: counts self-aware answers
    Awareness,
}

impl Block {
    pub fn as_str(self) -> &'static str {
        match self {
            Block::Type => "type",
            Block::Awareness => "awareness",
        }
    }
}

/// Category for each of the four options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCategories {
    #[serde(rename = "A")]
    pub a: Category,
    #[serde(rename = "B")]
    pub b: Category,
    #[serde(rename = "C")]
    pub c: Category,
    #[serde(rename = "D")]
    pub d: Category,
}

impl OptionCategories {
    pub fn new(a: Category, b: Category, c: Category, d: Category) -> Self {
        Self { a, b, c, d }
    }

    pub fn get(&self, option: AnswerOption) -> Category {
        match option {
            AnswerOption::A => self.a,
            AnswerOption::B => self.b,
            AnswerOption::C => self.c,
            AnswerOption::D => self.d,
        }
    }
}

/// A single forced-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub block: Block,
    pub options: OptionCategories,
    /// Prompt text, only used for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Question {
    pub fn new(id: u32, block: Block, options: OptionCategories) -> Self {
        Self {
            id,
            block,
            options,
            text: None,
        }
    }

    pub fn category(&self, option: AnswerOption) -> Category {
        self.options.get(option)
    }
}

/// Validated, immutable question bank used by the scorer
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    index: HashMap<u32, usize>,
    type_block_len: usize,
    awareness_block_len: usize,
    awareness_threshold: u8,
}

impl QuestionBank {
    /// Build a bank, rejecting duplicate ids, empty blocks and categories
    /// placed in the wrong block.
    pub fn new(questions: Vec<Question>, awareness_threshold: u8) -> Result<Self, BankError> {
        if awareness_threshold > 100 {
            return Err(BankError::ThresholdOutOfRange(awareness_threshold));
        }

        let mut seen = HashMap::with_capacity(questions.len());
        for (pos, question) in questions.iter().enumerate() {
            if seen.insert(question.id, pos).is_some() {
                return Err(BankError::DuplicateQuestion(question.id));
            }
            for option in AnswerOption::ALL {
                let category = question.category(option);
                if !category.allowed_in(question.block) {
                    return Err(BankError::MisplacedCategory {
                        question_id: question.id,
                        option,
                        category: category.as_str(),
                        block: question.block.as_str(),
                    });
                }
            }
        }

        let bank = Self::assemble(questions, awareness_threshold);
        if bank.type_block_len == 0 {
            return Err(BankError::EmptyBlock(Block::Type.as_str()));
        }
        if bank.awareness_block_len == 0 {
            return Err(BankError::EmptyBlock(Block::Awareness.as_str()));
        }
        Ok(bank)
    }

    /// The production 20-question bank: Q1-10 type block (A/C architect,
    /// B/D alchemist), Q11-20 awareness block (A/B aware).
    pub fn standard() -> Self {
        Self::assemble(standard_questions(), DEFAULT_AWARENESS_THRESHOLD)
    }

    fn assemble(questions: Vec<Question>, awareness_threshold: u8) -> Self {
        let index = questions
            .iter()
            .enumerate()
            .map(|(pos, q)| (q.id, pos))
            .collect();
        let type_block_len = questions.iter().filter(|q| q.block == Block::Type).count();
        let awareness_block_len = questions.len() - type_block_len;
        Self {
            questions,
            index,
            type_block_len,
            awareness_block_len,
            awareness_threshold,
        }
    }

    /// Same questions, different threshold
    pub fn with_threshold(self, awareness_threshold: u8) -> Result<Self, BankError> {
        if awareness_threshold > 100 {
            return Err(BankError::ThresholdOutOfRange(awareness_threshold));
        }
        Ok(Self {
            awareness_threshold,
            ..self
        })
    }

    pub fn question(&self, id: u32) -> Option<&Question> {
        self.index.get(&id).map(|&pos| &self.questions[pos])
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of answers a complete submission must contain
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn type_block_len(&self) -> usize {
        self.type_block_len
    }

    pub fn awareness_block_len(&self) -> usize {
        self.awareness_block_len
    }

    pub fn awareness_threshold(&self) -> u8 {
        self.awareness_threshold
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::standard()
    }
}

/// Question list behind [`QuestionBank::standard`]
pub fn standard_questions() -> Vec<Question> {
    use Category::*;

    let type_block = (1..=10).map(|id| {
        Question::new(
            id,
            Block::Type,
            OptionCategories::new(Architect, Alchemist, Architect, Alchemist),
        )
    });
    let awareness_block = (11..=20).map(|id| {
        Question::new(
            id,
            Block::Awareness,
            OptionCategories::new(Aware, Aware, Neutral, Neutral),
        )
    });
    type_block.chain(awareness_block).collect()
}
