//! Property tests for scoring, access monotonicity and the retake window.

use brandscaling::access::AccessControl;
use brandscaling::quiz::{QuestionBank, QuizScorer, RetakePolicy};
use brandscaling::{AccessTier, AnswerOption, Archetype, Feature, QuizAnswer};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn answer_set() -> impl Strategy<Value = Vec<QuizAnswer>> {
    prop::collection::vec(0usize..4, 20).prop_map(|letters| {
        letters
            .into_iter()
            .enumerate()
            .map(|(i, l)| QuizAnswer::new(i as u32 + 1, AnswerOption::ALL[l]))
            .collect()
    })
}

fn tier() -> impl Strategy<Value = AccessTier> {
    prop::sample::select(AccessTier::ALL.to_vec())
}

fn feature() -> impl Strategy<Value = Feature> {
    prop::sample::select(Feature::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_valid_answer_set_scores(answers in answer_set()) {
        let bank = QuestionBank::standard();
        let result = QuizScorer::score(&bank, &answers).unwrap();

        prop_assert!(result.awareness_percentage <= 100);
        prop_assert_eq!(result.architect_score + result.alchemist_score, 10);
        prop_assert_eq!(u32::from(result.awareness_percentage), result.awareness_score * 10);
        prop_assert!(matches!(
            result.archetype,
            Archetype::Architect
                | Archetype::Alchemist
                | Archetype::BlurredIdentity
                | Archetype::UnfocusedPotential
        ));
    }

    #[test]
    fn scoring_is_deterministic_and_order_independent(answers in answer_set()) {
        let bank = QuestionBank::standard();
        let first = QuizScorer::score(&bank, &answers).unwrap();
        let again = QuizScorer::score(&bank, &answers).unwrap();
        let mut reversed = answers.clone();
        reversed.reverse();
        let flipped = QuizScorer::score(&bank, &reversed).unwrap();

        prop_assert_eq!(first, again);
        prop_assert_eq!(first, flipped);
    }

    #[test]
    fn tied_type_block_is_unfocused(answers in answer_set()) {
        let bank = QuestionBank::standard();
        let result = QuizScorer::score(&bank, &answers).unwrap();
        if result.architect_score == result.alchemist_score {
            prop_assert_eq!(result.archetype, Archetype::UnfocusedPotential);
        } else {
            prop_assert_ne!(result.archetype, Archetype::UnfocusedPotential);
        }
    }

    #[test]
    fn dominant_archetype_needs_threshold(answers in answer_set()) {
        let bank = QuestionBank::standard();
        let result = QuizScorer::score(&bank, &answers).unwrap();
        if matches!(result.archetype, Archetype::Architect | Archetype::Alchemist) {
            prop_assert!(result.awareness_percentage >= bank.awareness_threshold());
        }
    }

    #[test]
    fn feature_access_is_monotonic(low in tier(), high in tier(), f in feature()) {
        prop_assume!(low <= high);
        let access = AccessControl::standard();
        if access.has_feature(low, f) {
            prop_assert!(access.has_feature(high, f));
        }
    }

    #[test]
    fn course_access_is_monotonic(low in tier(), high in tier(), idx in 0usize..8) {
        prop_assume!(low <= high);
        let access = AccessControl::standard();
        let ids = access.catalog().ids();
        let course = &ids[idx % ids.len()];
        if access.can_view_course(low, course) {
            prop_assert!(access.can_view_course(high, course));
        }
    }

    #[test]
    fn upgrade_target_is_above_current(current in tier(), f in feature()) {
        let access = AccessControl::standard();
        if !access.has_feature(current, f) {
            let target = access.upgrade_target(current, f, None);
            prop_assert!(target > current);
            prop_assert!(access.has_feature(target, f));
        }
    }

    #[test]
    fn retake_window_is_half_open(days in 0i64..90, minutes in 0i64..1440) {
        let policy = RetakePolicy::default();
        let last = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let now = last + Duration::days(days) + Duration::minutes(minutes);
        let eligibility = policy.eligibility(Some(last), now);
        prop_assert_eq!(eligibility.can_retake, days >= 30);
    }
}

#[test]
fn standard_table_validates_clean() {
    assert!(AccessControl::standard().validate().is_empty());
}

#[test]
fn mastermind_sees_the_whole_catalog() {
    let access = AccessControl::standard();
    assert_eq!(
        access.allowed_courses(AccessTier::Mastermind),
        access.catalog().ids()
    );
}
