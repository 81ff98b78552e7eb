//! Tier permission table and course catalog

use crate::{AccessTier, ConfigError, Feature};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Courses a tier may view: every course, or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAllowance")]
pub enum CourseAllowance {
    All,
    Only(Vec<String>),
}

impl CourseAllowance {
    pub fn allows(&self, course_id: &str) -> bool {
        match self {
            CourseAllowance::All => true,
            CourseAllowance::Only(ids) => ids.iter().any(|id| id == course_id),
        }
    }
}

impl Serialize for CourseAllowance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CourseAllowance::All => serializer.serialize_str("ALL"),
            CourseAllowance::Only(ids) => ids.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAllowance {
    Keyword(String),
    List(Vec<String>),
}

impl TryFrom<RawAllowance> for CourseAllowance {
    type Error = ConfigError;

    fn try_from(raw: RawAllowance) -> Result<Self, Self::Error> {
        match raw {
            RawAllowance::Keyword(k) if k == "ALL" => Ok(CourseAllowance::All),
            RawAllowance::Keyword(k) => Err(ConfigError::InvalidCourseAllowance(k)),
            RawAllowance::List(ids) => Ok(CourseAllowance::Only(ids)),
        }
    }
}

/// What one tier unlocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPermissions {
    #[serde(alias = "allowedCourses")]
    pub courses: CourseAllowance,
    #[serde(default)]
    pub qna: bool,
    #[serde(default)]
    pub strategy_day: bool,
    #[serde(default)]
    pub events: bool,
    #[serde(default)]
    pub ai_agents: bool,
    #[serde(default)]
    pub board_access: bool,
}

impl TierPermissions {
    pub fn flag(&self, feature: Feature) -> bool {
        match feature {
            Feature::Qna => self.qna,
            Feature::StrategyDay => self.strategy_day,
            Feature::Events => self.events,
            Feature::AiAgents => self.ai_agents,
            Feature::BoardAccess => self.board_access,
        }
    }
}

/// Tier -> permissions. A tier with no entry grants nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierPermissionTable {
    tiers: BTreeMap<AccessTier, TierPermissions>,
}

impl TierPermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tier(mut self, tier: AccessTier, permissions: TierPermissions) -> Self {
        self.tiers.insert(tier, permissions);
        self
    }

    pub fn set(&mut self, tier: AccessTier, permissions: TierPermissions) {
        self.tiers.insert(tier, permissions);
    }

    pub fn get(&self, tier: AccessTier) -> Option<&TierPermissions> {
        self.tiers.get(&tier)
    }

    /// Entries in ascending tier order
    pub fn iter(&self) -> impl Iterator<Item = (AccessTier, &TierPermissions)> {
        self.tiers.iter().map(|(t, p)| (*t, p))
    }

    /// Production tier table
    pub fn standard() -> Self {
        let only = |ids: &[&str]| CourseAllowance::Only(ids.iter().map(|s| s.to_string()).collect());
        Self::new()
            .with_tier(
                AccessTier::Beginner,
                TierPermissions {
                    courses: only(&["getting-started", "business-idea-lab"]),
                    qna: true,
                    strategy_day: false,
                    events: false,
                    ai_agents: false,
                    board_access: false,
                },
            )
            .with_tier(
                AccessTier::Intermediate,
                TierPermissions {
                    courses: only(&[
                        "getting-started",
                        "business-idea-lab",
                        "frameworks-101",
                        "foundations",
                    ]),
                    qna: true,
                    strategy_day: false,
                    events: false,
                    ai_agents: false,
                    board_access: false,
                },
            )
            .with_tier(
                AccessTier::Advanced,
                TierPermissions {
                    courses: CourseAllowance::All,
                    qna: true,
                    strategy_day: true,
                    events: true,
                    ai_agents: true,
                    board_access: false,
                },
            )
            .with_tier(
                AccessTier::Mastermind,
                TierPermissions {
                    courses: CourseAllowance::All,
                    qna: true,
                    strategy_day: true,
                    events: true,
                    ai_agents: true,
                    board_access: true,
                },
            )
    }
}

/// Which DNA track a course is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    #[default]
    All,
    Architect,
    Alchemist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub required_tier: AccessTier,
    #[serde(default)]
    pub track: Track,
}

impl CourseRecord {
    pub fn new(id: &str, title: &str, required_tier: AccessTier, track: Track) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            required_tier,
            track,
        }
    }
}

/// Ordered course lookup table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseCatalog {
    courses: Vec<CourseRecord>,
}

impl CourseCatalog {
    pub fn new(courses: Vec<CourseRecord>) -> Self {
        let mut catalog = Self::default();
        for course in courses {
            catalog.upsert(course);
        }
        catalog
    }

    /// Insert a course, replacing any entry with the same id in place
    pub fn upsert(&mut self, course: CourseRecord) {
        match self.courses.iter_mut().find(|c| c.id == course.id) {
            Some(existing) => *existing = course,
            None => self.courses.push(course),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CourseRecord> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseRecord> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Production course catalog
    pub fn standard() -> Self {
        use AccessTier::*;
        Self::new(vec![
            CourseRecord::new("getting-started", "Getting Started with Brandscaling", Beginner, Track::All),
            CourseRecord::new("business-idea-lab", "Business Idea Lab", Beginner, Track::All),
            CourseRecord::new("frameworks-101", "Frameworks 101", Intermediate, Track::Architect),
            CourseRecord::new("foundations", "Brandscaling Foundations", Intermediate, Track::All),
            CourseRecord::new("architect-mastery", "Architect Mastery Program", Advanced, Track::Architect),
            CourseRecord::new("alchemist-intuition", "Alchemist Intuition Training", Advanced, Track::Alchemist),
            CourseRecord::new("mastermind-mastery", "Mastermind Mastery", Advanced, Track::All),
            CourseRecord::new("100k-club-exclusive", "£100K Club Exclusive Strategies", Mastermind, Track::All),
        ])
    }
}
