//! Brandscaling: Entrepreneurial DNA quiz scoring and tiered access control
//!
//! This library scores the Entrepreneurial DNA quiz into an archetype and an
//! awareness percentage, and decides which subscription tiers may use which
//! features and courses.

pub mod access;
pub mod config;
pub mod error;
pub mod quiz;
pub mod reporter;
pub mod results;
pub mod rpc;

pub use error::{BankError, ConfigError, ValidationError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four option letters of a forced-choice question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] = [
        AnswerOption::A,
        AnswerOption::B,
        AnswerOption::C,
        AnswerOption::D,
    ];

    /// Parse a letter as submitted by a client form ("a", " B ", ...)
    pub fn parse(letter: &str) -> Option<Self> {
        match letter.trim() {
            "A" | "a" => Some(AnswerOption::A),
            "B" | "b" => Some(AnswerOption::B),
            "C" | "c" => Some(AnswerOption::C),
            "D" | "d" => Some(AnswerOption::D),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        };
        write!(f, "{}", letter)
    }
}

/// A validated answer to a single question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: u32,
    pub selected_option: AnswerOption,
}

impl QuizAnswer {
    pub fn new(question_id: u32, selected_option: AnswerOption) -> Self {
        Self {
            question_id,
            selected_option,
        }
    }
}

/// Entrepreneurial DNA classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Architect,
    Alchemist,
    #[serde(rename = "Blurred Identity")]
    BlurredIdentity,
    #[serde(rename = "Unfocused Potential")]
    UnfocusedPotential,
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::Architect => write!(f, "Architect"),
            Archetype::Alchemist => write!(f, "Alchemist"),
            Archetype::BlurredIdentity => write!(f, "Blurred Identity"),
            Archetype::UnfocusedPotential => write!(f, "Unfocused Potential"),
        }
    }
}

/// Outcome of scoring one complete answer set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Classified archetype
    pub archetype: Archetype,
    /// Share of self-aware answers in the awareness block (0-100)
    pub awareness_percentage: u8,
    /// Type-block answers tagged architect
    pub architect_score: u32,
    /// Type-block answers tagged alchemist
    pub alchemist_score: u32,
    /// Awareness-block answers tagged aware
    pub awareness_score: u32,
}

/// Subscription tier, strictly ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AccessTier {
    Beginner = 0,
    Intermediate = 1,
    Advanced = 2,
    Mastermind = 3,
}

impl AccessTier {
    /// All tiers in ascending order
    pub const ALL: [AccessTier; 4] = [
        AccessTier::Beginner,
        AccessTier::Intermediate,
        AccessTier::Advanced,
        AccessTier::Mastermind,
    ];

    pub const TOP: AccessTier = AccessTier::Mastermind;

    /// Parse a tier name. Unknown names return None so callers can fail closed.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(AccessTier::Beginner),
            "intermediate" => Some(AccessTier::Intermediate),
            "advanced" => Some(AccessTier::Advanced),
            "mastermind" => Some(AccessTier::Mastermind),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessTier::Beginner => "beginner",
            AccessTier::Intermediate => "intermediate",
            AccessTier::Advanced => "advanced",
            AccessTier::Mastermind => "mastermind",
        }
    }

    /// Tiers strictly above this one, ascending
    pub fn above(self) -> impl Iterator<Item = AccessTier> {
        AccessTier::ALL.into_iter().filter(move |t| *t > self)
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature flags gated by tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Qna,
    StrategyDay,
    Events,
    AiAgents,
    BoardAccess,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Qna,
        Feature::StrategyDay,
        Feature::Events,
        Feature::AiAgents,
        Feature::BoardAccess,
    ];

    /// Parse a feature name; accepts camelCase, kebab-case and snake_case
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "qna" => Some(Feature::Qna),
            "strategyday" => Some(Feature::StrategyDay),
            "events" => Some(Feature::Events),
            "aiagents" => Some(Feature::AiAgents),
            "boardaccess" => Some(Feature::BoardAccess),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Qna => "qna",
            Feature::StrategyDay => "strategyDay",
            Feature::Events => "events",
            Feature::AiAgents => "aiAgents",
            Feature::BoardAccess => "boardAccess",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
