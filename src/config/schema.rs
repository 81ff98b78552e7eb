//! Config schema and deserialization

use crate::access::{
    AccessControl, CourseCatalog, CourseRecord, TierPermissionTable, TierPermissions,
};
use crate::quiz::bank::{standard_questions, Question, QuestionBank, DEFAULT_AWARENESS_THRESHOLD};
use crate::quiz::retake::{RetakePolicy, DEFAULT_COOLDOWN_DAYS, MAX_COOLDOWN_DAYS};
use crate::results::RESULTS_FILENAME;
use crate::{AccessTier, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Quiz settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    /// Minimum awareness percentage for a dominant archetype. Default: 70
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awareness_threshold: Option<u8>,

    /// Days between stored results for the same user. Default: 30
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retake_cooldown_days: Option<u32>,

    /// Replacement question bank (default: the standard 20-question bank)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
}

/// Root config structure for .brandscalingrc.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default)]
    pub quiz: QuizConfig,

    /// Per-tier permission entries. Each entry replaces the standard one.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tiers: BTreeMap<String, TierPermissions>,

    /// Courses added to (or replacing by id in) the standard catalog
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<CourseRecord>,

    /// Where quiz results are stored (relative to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_file: Option<String>,

    /// Directory of the file this config was loaded from
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl Config {
    /// Config with every default written out, for `init`
    pub fn with_defaults() -> Self {
        let access = AccessControl::standard();
        Self {
            extends: None,
            quiz: QuizConfig {
                awareness_threshold: Some(DEFAULT_AWARENESS_THRESHOLD),
                retake_cooldown_days: Some(DEFAULT_COOLDOWN_DAYS),
                questions: Some(standard_questions()),
            },
            tiers: access
                .table()
                .iter()
                .map(|(tier, p)| (tier.to_string(), p.clone()))
                .collect(),
            courses: access.catalog().iter().cloned().collect(),
            results_file: Some(RESULTS_FILENAME.to_string()),
            source_dir: None,
        }
    }

    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, cli_threshold: Option<u8>) -> Self {
        if cli_threshold.is_some() {
            self.quiz.awareness_threshold = cli_threshold;
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        if self.quiz.awareness_threshold.is_none() {
            self.quiz.awareness_threshold = base.quiz.awareness_threshold;
        }
        if self.quiz.retake_cooldown_days.is_none() {
            self.quiz.retake_cooldown_days = base.quiz.retake_cooldown_days;
        }
        if self.quiz.questions.is_none() {
            self.quiz.questions = base.quiz.questions;
        }
        if self.results_file.is_none() {
            // Keep the base's relative path anchored to the base's directory
            self.results_file = base.results_file.map(|file| match &base.source_dir {
                Some(dir) if Path::new(&file).is_relative() => {
                    dir.join(&file).to_string_lossy().into_owned()
                }
                _ => file,
            });
        }

        // Tier entries: this config wins per tier
        for (tier, permissions) in base.tiers {
            self.tiers.entry(tier).or_insert(permissions);
        }

        // Courses: base first, then this config's entries replace by id
        let mut catalog = CourseCatalog::new(base.courses);
        for course in self.courses.drain(..) {
            catalog.upsert(course);
        }
        self.courses = catalog.iter().cloned().collect();
    }

    pub fn build_question_bank(&self) -> Result<QuestionBank, ConfigError> {
        let threshold = self
            .quiz
            .awareness_threshold
            .unwrap_or(DEFAULT_AWARENESS_THRESHOLD);
        let bank = match &self.quiz.questions {
            Some(questions) => QuestionBank::new(questions.clone(), threshold)?,
            None => QuestionBank::standard().with_threshold(threshold)?,
        };
        Ok(bank)
    }

    /// Standard table and catalog with this config's entries applied.
    /// Inconsistencies are logged, not rejected.
    pub fn build_access_control(&self) -> Result<AccessControl, ConfigError> {
        let mut table = TierPermissionTable::standard();
        for (name, permissions) in &self.tiers {
            let tier =
                AccessTier::parse(name).ok_or_else(|| ConfigError::UnknownTier(name.clone()))?;
            table.set(tier, permissions.clone());
        }

        let mut catalog = CourseCatalog::standard();
        for course in &self.courses {
            catalog.upsert(course.clone());
        }

        let access = AccessControl::new(table, catalog);
        for issue in access.validate() {
            warn!(%issue, "access configuration issue");
        }
        Ok(access)
    }

    pub fn retake_policy(&self) -> Result<RetakePolicy, ConfigError> {
        let days = self
            .quiz
            .retake_cooldown_days
            .unwrap_or(DEFAULT_COOLDOWN_DAYS);
        if days > MAX_COOLDOWN_DAYS {
            return Err(ConfigError::CooldownOutOfRange(days));
        }
        Ok(RetakePolicy::new(days))
    }

    /// Results file location. Relative paths resolve against the config's
    /// directory, or `work_dir` when no config file was found.
    pub fn results_path(&self, work_dir: &Path) -> PathBuf {
        let file = self.results_file.as_deref().unwrap_or(RESULTS_FILENAME);
        let file = Path::new(file);
        if file.is_absolute() {
            return file.to_path_buf();
        }
        self.source_dir
            .as_deref()
            .unwrap_or(work_dir)
            .join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    #[test]
    fn empty_config_builds_standard_objects() {
        let config: Config = serde_json::from_str("{}").unwrap();
        let bank = config.build_question_bank().unwrap();
        assert_eq!(bank.len(), 20);
        assert_eq!(bank.awareness_threshold(), 70);
        assert_eq!(config.retake_policy().unwrap().cooldown_days(), 30);

        let access = config.build_access_control().unwrap();
        assert!(!access.has_feature(AccessTier::Beginner, Feature::AiAgents));
    }

    #[test]
    fn tier_entry_replaces_standard_entry() {
        let config: Config = serde_json::from_str(
            r#"{ "tiers": { "intermediate": { "courses": "ALL", "qna": true, "events": true } } }"#,
        )
        .unwrap();
        let access = config.build_access_control().unwrap();
        assert!(access.has_feature(AccessTier::Intermediate, Feature::Events));
        assert!(access.can_view_course(AccessTier::Intermediate, "architect-mastery"));
        assert!(!access.has_feature(AccessTier::Beginner, Feature::Events));
    }

    #[test]
    fn unknown_tier_name_is_an_error() {
        let config: Config =
            serde_json::from_str(r#"{ "tiers": { "platinum": { "courses": "ALL" } } }"#).unwrap();
        let err = config.build_access_control().unwrap_err();
        assert!(err.to_string().contains("platinum"));
    }

    #[test]
    fn threshold_override_applies_to_standard_bank() {
        let config: Config =
            serde_json::from_str(r#"{ "quiz": { "awarenessThreshold": 60 } }"#).unwrap();
        assert_eq!(config.build_question_bank().unwrap().awareness_threshold(), 60);

        let cli = config.merge_with_cli(Some(90));
        assert_eq!(cli.build_question_bank().unwrap().awareness_threshold(), 90);
    }

    #[test]
    fn oversized_cooldown_is_an_error() {
        let config: Config =
            serde_json::from_str(r#"{ "quiz": { "retakeCooldownDays": 4294967295 } }"#).unwrap();
        assert!(matches!(
            config.retake_policy(),
            Err(ConfigError::CooldownOutOfRange(4294967295))
        ));

        let config: Config =
            serde_json::from_str(r#"{ "quiz": { "retakeCooldownDays": 3650 } }"#).unwrap();
        assert_eq!(config.retake_policy().unwrap().cooldown_days(), 3650);
    }

    #[test]
    fn malformed_question_bank_is_an_error() {
        let config: Config = serde_json::from_str(
            r#"{ "quiz": { "questions": [
                { "id": 1, "block": "type", "options": { "A": "architect", "B": "alchemist", "C": "neutral", "D": "blurred" } }
            ] } }"#,
        )
        .unwrap();
        assert!(matches!(
            config.build_question_bank(),
            Err(ConfigError::Bank(crate::BankError::EmptyBlock("awareness")))
        ));
    }

    #[test]
    fn defaults_roundtrip_through_json() {
        let json = serde_json::to_string_pretty(&Config::with_defaults()).unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.build_question_bank().unwrap().len(), 20);
        let access = config.build_access_control().unwrap();
        assert!(access.validate().is_empty());
        assert_eq!(access.catalog(), AccessControl::standard().catalog());
    }

    #[test]
    fn merge_from_keeps_child_values() {
        let mut child: Config = serde_json::from_str(
            r#"{ "quiz": { "retakeCooldownDays": 14 },
                 "courses": [{ "id": "foundations", "title": "F2", "requiredTier": "beginner" }] }"#,
        )
        .unwrap();
        let base: Config = serde_json::from_str(
            r#"{ "quiz": { "retakeCooldownDays": 30, "awarenessThreshold": 65 },
                 "courses": [
                    { "id": "foundations", "title": "F1", "requiredTier": "intermediate" },
                    { "id": "extra", "requiredTier": "advanced" }
                 ] }"#,
        )
        .unwrap();
        child.merge_from(base);

        assert_eq!(child.quiz.retake_cooldown_days, Some(14));
        assert_eq!(child.quiz.awareness_threshold, Some(65));
        assert_eq!(child.courses.len(), 2);
        assert_eq!(child.courses[0].title, "F2");
        assert_eq!(child.courses[1].id, "extra");
    }

    #[test]
    fn results_path_resolves_against_source_dir() {
        let mut config = Config::default();
        assert_eq!(
            config.results_path(Path::new("/work")),
            PathBuf::from("/work").join(RESULTS_FILENAME)
        );

        config.results_file = Some("data/results.json".to_string());
        config.source_dir = Some(PathBuf::from("/project"));
        assert_eq!(
            config.results_path(Path::new("/work")),
            PathBuf::from("/project/data/results.json")
        );
    }
}
