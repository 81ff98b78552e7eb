//! Access decisions over an injected tier table and course catalog

use super::table::{CourseAllowance, CourseCatalog, TierPermissionTable};
use crate::{AccessTier, Feature};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// What an access check is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequest<'a> {
    Feature(&'a str),
    Course(&'a str),
}

/// Result of an access check, shaped for the access endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub has_access: bool,
    /// Tier as given by the caller (may be unrecognized)
    pub current_tier: String,
    /// Tier a requested course is configured to require
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<AccessTier>,
    /// Tier to suggest when access is denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_target: Option<AccessTier>,
}

/// A permission table inconsistency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConfigIssue {
    /// A tier has no entry, so it grants nothing
    MissingTier { tier: AccessTier },
    /// A lower tier grants a feature that a higher tier does not
    #[serde(rename_all = "camelCase")]
    FeatureNotMonotonic {
        feature: Feature,
        granted_by: AccessTier,
        denied_by: AccessTier,
    },
    /// A lower tier grants a course that a higher tier does not
    #[serde(rename_all = "camelCase")]
    CourseNotMonotonic {
        course: String,
        granted_by: AccessTier,
        denied_by: AccessTier,
    },
    /// The course's own required tier cannot view it
    #[serde(rename_all = "camelCase")]
    RequiredTierDenied {
        course: String,
        required_tier: AccessTier,
    },
    /// A tier lists a course id that is not in the catalog
    UnknownCourse { tier: AccessTier, course: String },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::MissingTier { tier } => {
                write!(f, "tier '{}' has no permission entry", tier)
            }
            ConfigIssue::FeatureNotMonotonic {
                feature,
                granted_by,
                denied_by,
            } => write!(
                f,
                "feature '{}' is granted to {} but not to higher tier {}",
                feature, granted_by, denied_by
            ),
            ConfigIssue::CourseNotMonotonic {
                course,
                granted_by,
                denied_by,
            } => write!(
                f,
                "course '{}' is granted to {} but not to higher tier {}",
                course, granted_by, denied_by
            ),
            ConfigIssue::RequiredTierDenied {
                course,
                required_tier,
            } => write!(
                f,
                "course '{}' requires {} but {} cannot view it",
                course, required_tier, required_tier
            ),
            ConfigIssue::UnknownCourse { tier, course } => {
                write!(f, "tier {} lists unknown course '{}'", tier, course)
            }
        }
    }
}

/// Immutable access-control configuration; share it freely across threads
#[derive(Debug, Clone)]
pub struct AccessControl {
    table: TierPermissionTable,
    catalog: CourseCatalog,
}

impl AccessControl {
    pub fn new(table: TierPermissionTable, catalog: CourseCatalog) -> Self {
        Self { table, catalog }
    }

    /// Production table and catalog
    pub fn standard() -> Self {
        Self::new(TierPermissionTable::standard(), CourseCatalog::standard())
    }

    pub fn table(&self) -> &TierPermissionTable {
        &self.table
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    /// With a course id, whether the tier may view that course; otherwise the
    /// tier's feature flag. A tier without an entry gets nothing.
    pub fn has_access(&self, tier: AccessTier, feature: Feature, course_id: Option<&str>) -> bool {
        match course_id {
            Some(id) => self.can_view_course(tier, id),
            None => self.has_feature(tier, feature),
        }
    }

    pub fn has_feature(&self, tier: AccessTier, feature: Feature) -> bool {
        self.table.get(tier).is_some_and(|p| p.flag(feature))
    }

    pub fn can_view_course(&self, tier: AccessTier, course_id: &str) -> bool {
        self.table
            .get(tier)
            .is_some_and(|p| p.courses.allows(course_id))
    }

    /// String form of [`has_access`](Self::has_access); unrecognized names are denied
    pub fn has_access_named(&self, tier: &str, feature: &str, course_id: Option<&str>) -> bool {
        let Some(tier) = AccessTier::parse(tier) else {
            debug!(tier, "unknown tier, denying access");
            return false;
        };
        match course_id {
            Some(id) => self.can_view_course(tier, id),
            None => Feature::parse(feature).is_some_and(|f| self.has_feature(tier, f)),
        }
    }

    pub fn course_required_tier(&self, course_id: &str) -> Option<AccessTier> {
        self.catalog.get(course_id).map(|c| c.required_tier)
    }

    /// First tier strictly above `current` that grants `feature`. With no
    /// current tier the search starts at the lowest tier.
    pub fn find_upgrade_target(
        &self,
        current: Option<AccessTier>,
        feature: Feature,
    ) -> Option<AccessTier> {
        AccessTier::ALL
            .into_iter()
            .filter(|t| current.map_or(true, |c| *t > c))
            .find(|t| self.has_feature(*t, feature))
    }

    /// Tier to suggest for an upgrade. A course answers with its configured
    /// tier; a feature answers with the first higher tier that grants it.
    /// Falls back to the top tier when nothing qualifies.
    pub fn upgrade_target(
        &self,
        current: AccessTier,
        feature: Feature,
        course_id: Option<&str>,
    ) -> AccessTier {
        match course_id {
            Some(id) => self.course_upgrade_target(id),
            None => self.feature_upgrade_target(Some(current), feature),
        }
    }

    fn course_upgrade_target(&self, course_id: &str) -> AccessTier {
        self.course_required_tier(course_id).unwrap_or_else(|| {
            warn!(
                course = course_id,
                "course not in catalog, suggesting {}",
                AccessTier::TOP
            );
            AccessTier::TOP
        })
    }

    fn feature_upgrade_target(&self, current: Option<AccessTier>, feature: Feature) -> AccessTier {
        self.find_upgrade_target(current, feature).unwrap_or_else(|| {
            warn!(
                feature = %feature,
                current = ?current,
                "no tier above current grants feature, suggesting {}",
                AccessTier::TOP
            );
            AccessTier::TOP
        })
    }

    /// Every catalog course for an `ALL` tier, otherwise the tier's own list
    pub fn allowed_courses(&self, tier: AccessTier) -> Vec<String> {
        match self.table.get(tier).map(|p| &p.courses) {
            Some(CourseAllowance::All) => self.catalog.ids(),
            Some(CourseAllowance::Only(ids)) => ids.clone(),
            None => Vec::new(),
        }
    }

    /// String form of [`allowed_courses`](Self::allowed_courses)
    pub fn allowed_courses_named(&self, tier: &str) -> Vec<String> {
        AccessTier::parse(tier)
            .map(|t| self.allowed_courses(t))
            .unwrap_or_default()
    }

    /// Full access check as served to clients. Never fails: unknown tiers,
    /// features and courses are denied.
    pub fn check(&self, tier_name: &str, request: AccessRequest<'_>) -> AccessDecision {
        let tier = AccessTier::parse(tier_name);
        match request {
            AccessRequest::Course(course_id) => {
                let has_access = tier.is_some_and(|t| self.can_view_course(t, course_id));
                AccessDecision {
                    has_access,
                    current_tier: tier_name.to_string(),
                    required_tier: self.course_required_tier(course_id),
                    upgrade_target: (!has_access).then(|| self.course_upgrade_target(course_id)),
                }
            }
            AccessRequest::Feature(feature_name) => {
                let feature = Feature::parse(feature_name);
                let has_access = match (tier, feature) {
                    (Some(t), Some(f)) => self.has_feature(t, f),
                    _ => false,
                };
                let upgrade_target = match feature {
                    Some(f) if !has_access => Some(self.feature_upgrade_target(tier, f)),
                    _ => None,
                };
                AccessDecision {
                    has_access,
                    current_tier: tier_name.to_string(),
                    required_tier: None,
                    upgrade_target,
                }
            }
        }
    }

    /// Find every place where access is not monotonic in tier order, plus
    /// catalog entries the table contradicts.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for tier in AccessTier::ALL {
            if self.table.get(tier).is_none() {
                issues.push(ConfigIssue::MissingTier { tier });
            }
        }

        let tiers = AccessTier::ALL;
        for pair in tiers.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            for feature in Feature::ALL {
                if self.has_feature(lower, feature) && !self.has_feature(higher, feature) {
                    issues.push(ConfigIssue::FeatureNotMonotonic {
                        feature,
                        granted_by: lower,
                        denied_by: higher,
                    });
                }
            }
        }

        let mut course_ids: BTreeSet<String> = self.catalog.ids().into_iter().collect();
        for (tier, permissions) in self.table.iter() {
            if let CourseAllowance::Only(ids) = &permissions.courses {
                for id in ids {
                    if self.catalog.get(id).is_none() {
                        issues.push(ConfigIssue::UnknownCourse {
                            tier,
                            course: id.clone(),
                        });
                    }
                    course_ids.insert(id.clone());
                }
            }
        }

        for course in &course_ids {
            for pair in tiers.windows(2) {
                let (lower, higher) = (pair[0], pair[1]);
                if self.can_view_course(lower, course) && !self.can_view_course(higher, course) {
                    issues.push(ConfigIssue::CourseNotMonotonic {
                        course: course.clone(),
                        granted_by: lower,
                        denied_by: higher,
                    });
                }
            }
        }

        for course in self.catalog.iter() {
            if !self.can_view_course(course.required_tier, &course.id) {
                issues.push(ConfigIssue::RequiredTierDenied {
                    course: course.id.clone(),
                    required_tier: course.required_tier,
                });
            }
        }

        issues
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::table::TierPermissions;
    use AccessTier::*;

    fn perms(courses: CourseAllowance, ai_agents: bool) -> TierPermissions {
        TierPermissions {
            courses,
            qna: true,
            strategy_day: false,
            events: false,
            ai_agents,
            board_access: false,
        }
    }

    #[test]
    fn beginner_has_no_ai_agents_and_upgrades_to_advanced() {
        let access = AccessControl::standard();
        assert!(!access.has_access(Beginner, Feature::AiAgents, None));
        assert_eq!(access.upgrade_target(Beginner, Feature::AiAgents, None), Advanced);
    }

    #[test]
    fn feature_flags_follow_standard_table() {
        let access = AccessControl::standard();
        assert!(access.has_feature(Beginner, Feature::Qna));
        assert!(!access.has_feature(Intermediate, Feature::Events));
        assert!(access.has_feature(Advanced, Feature::StrategyDay));
        assert!(!access.has_feature(Advanced, Feature::BoardAccess));
        assert!(access.has_feature(Mastermind, Feature::BoardAccess));
    }

    #[test]
    fn course_access_uses_list_or_all() {
        let access = AccessControl::standard();
        assert!(access.has_access(Beginner, Feature::Qna, Some("getting-started")));
        assert!(!access.has_access(Beginner, Feature::Qna, Some("foundations")));
        assert!(access.has_access(Intermediate, Feature::Qna, Some("foundations")));
        assert!(access.has_access(Advanced, Feature::Qna, Some("100k-club-exclusive")));
    }

    #[test]
    fn course_argument_overrides_feature_flag() {
        let access = AccessControl::standard();
        // Beginner lacks boardAccess, but the course check ignores the feature.
        assert!(access.has_access(Beginner, Feature::BoardAccess, Some("business-idea-lab")));
    }

    #[test]
    fn unknown_names_fail_closed() {
        let access = AccessControl::standard();
        assert!(!access.has_access_named("platinum", "qna", None));
        assert!(!access.has_access_named("beginner", "teleport", None));
        assert!(!access.has_access_named("nope", "qna", Some("getting-started")));
        assert!(access.has_access_named("Beginner", "qna", None));
        assert!(access.allowed_courses_named("platinum").is_empty());
    }

    #[test]
    fn missing_tier_entry_fails_closed() {
        let table = TierPermissionTable::new().with_tier(Beginner, perms(CourseAllowance::All, true));
        let access = AccessControl::new(table, CourseCatalog::standard());
        assert!(!access.has_feature(Advanced, Feature::Qna));
        assert!(access.allowed_courses(Advanced).is_empty());
    }

    #[test]
    fn upgrade_target_for_course_is_its_required_tier() {
        let access = AccessControl::standard();
        // Required tier is returned even when it is not above the current tier.
        assert_eq!(access.upgrade_target(Mastermind, Feature::Qna, Some("foundations")), Intermediate);
        assert_eq!(access.upgrade_target(Beginner, Feature::Qna, Some("100k-club-exclusive")), Mastermind);
    }

    #[test]
    fn upgrade_target_falls_back_to_top_tier() {
        let access = AccessControl::standard();
        assert_eq!(access.upgrade_target(Mastermind, Feature::BoardAccess, None), Mastermind);
        assert_eq!(access.upgrade_target(Beginner, Feature::Qna, Some("no-such-course")), Mastermind);
        assert_eq!(access.find_upgrade_target(Some(Mastermind), Feature::BoardAccess), None);
    }

    #[test]
    fn find_upgrade_target_without_current_tier_starts_at_lowest() {
        let access = AccessControl::standard();
        assert_eq!(access.find_upgrade_target(None, Feature::Qna), Some(Beginner));
        assert_eq!(access.find_upgrade_target(None, Feature::BoardAccess), Some(Mastermind));
    }

    #[test]
    fn allowed_courses_for_all_tier_is_whole_catalog() {
        let access = AccessControl::standard();
        assert_eq!(access.allowed_courses(Mastermind), access.catalog().ids());
        assert_eq!(
            access.allowed_courses(Beginner),
            vec!["getting-started".to_string(), "business-idea-lab".to_string()]
        );
    }

    #[test]
    fn check_denied_feature_suggests_upgrade() {
        let access = AccessControl::standard();
        let decision = access.check("beginner", AccessRequest::Feature("aiAgents"));
        assert!(!decision.has_access);
        assert_eq!(decision.current_tier, "beginner");
        assert_eq!(decision.upgrade_target, Some(Advanced));
        assert_eq!(decision.required_tier, None);
    }

    #[test]
    fn check_granted_course_has_no_upgrade() {
        let access = AccessControl::standard();
        let decision = access.check("advanced", AccessRequest::Course("architect-mastery"));
        assert!(decision.has_access);
        assert_eq!(decision.required_tier, Some(Advanced));
        assert_eq!(decision.upgrade_target, None);
    }

    #[test]
    fn check_unknown_tier_denies_and_suggests_lowest_granting_tier() {
        let access = AccessControl::standard();
        let decision = access.check("gold", AccessRequest::Feature("events"));
        assert!(!decision.has_access);
        assert_eq!(decision.current_tier, "gold");
        assert_eq!(decision.upgrade_target, Some(Advanced));
    }

    #[test]
    fn check_unknown_feature_has_no_upgrade_target() {
        let access = AccessControl::standard();
        let decision = access.check("mastermind", AccessRequest::Feature("teleport"));
        assert!(!decision.has_access);
        assert_eq!(decision.upgrade_target, None);
    }

    #[test]
    fn decision_json_omits_absent_tiers() {
        let access = AccessControl::standard();
        let json = serde_json::to_value(access.check("mastermind", AccessRequest::Feature("qna"))).unwrap();
        assert_eq!(json["hasAccess"], true);
        assert_eq!(json["currentTier"], "mastermind");
        assert!(json.get("upgradeTarget").is_none());
        assert!(json.get("requiredTier").is_none());
    }

    #[test]
    fn standard_configuration_is_consistent() {
        assert!(AccessControl::standard().validate().is_empty());
    }

    #[test]
    fn validate_reports_non_monotonic_feature() {
        let table = TierPermissionTable::standard().with_tier(Mastermind, perms(CourseAllowance::All, false));
        let issues = AccessControl::new(table, CourseCatalog::standard()).validate();
        assert!(issues.contains(&ConfigIssue::FeatureNotMonotonic {
            feature: Feature::AiAgents,
            granted_by: Advanced,
            denied_by: Mastermind,
        }));
    }

    #[test]
    fn validate_reports_course_regressions_and_unknown_ids() {
        let only = |ids: &[&str]| CourseAllowance::Only(ids.iter().map(|s| s.to_string()).collect());
        let table = TierPermissionTable::standard()
            .with_tier(Beginner, perms(only(&["getting-started", "business-idea-lab", "ghost"]), false))
            .with_tier(Intermediate, perms(only(&["frameworks-101", "foundations"]), false));
        let issues = AccessControl::new(table, CourseCatalog::standard()).validate();

        assert!(issues.contains(&ConfigIssue::UnknownCourse {
            tier: Beginner,
            course: "ghost".to_string()
        }));
        assert!(issues.contains(&ConfigIssue::CourseNotMonotonic {
            course: "getting-started".to_string(),
            granted_by: Beginner,
            denied_by: Intermediate,
        }));
    }

    #[test]
    fn validate_reports_missing_tier_and_required_tier_denied() {
        let table = TierPermissionTable::standard();
        let mut catalog = CourseCatalog::standard();
        catalog.upsert(crate::access::CourseRecord::new(
            "secret",
            "Secret",
            Beginner,
            crate::access::Track::All,
        ));
        let mut issues = AccessControl::new(table, catalog).validate();
        assert!(issues.contains(&ConfigIssue::RequiredTierDenied {
            course: "secret".to_string(),
            required_tier: Beginner,
        }));

        let sparse = TierPermissionTable::new().with_tier(Mastermind, perms(CourseAllowance::All, true));
        issues = AccessControl::new(sparse, CourseCatalog::standard()).validate();
        assert!(issues.contains(&ConfigIssue::MissingTier { tier: Beginner }));
    }

    #[test]
    fn access_control_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AccessControl>();
    }
}
