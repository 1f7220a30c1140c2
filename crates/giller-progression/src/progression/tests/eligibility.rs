use std::sync::Arc;

use super::common::*;
use crate::progression::catalog::{self, BadgeCatalog};
use crate::progression::domain::{ActivityHistory, BadgeCategory, UserBadges, UserStats};
use crate::progression::requirement::{
    evaluate, evaluate_with_history, is_eligible, EligibilityEvaluator, Eligibility,
    HistorySource, Requirement,
};

#[test]
fn completed_deliveries_threshold_is_inclusive() {
    let one_delivery = stats(1);

    assert!(is_eligible(
        &one_delivery,
        &Requirement::CompletedDeliveries { count: 1 }
    ));
    assert!(!is_eligible(
        &one_delivery,
        &Requirement::CompletedDeliveries { count: 2 }
    ));
}

#[test]
fn min_rating_needs_enough_deliveries() {
    let requirement = Requirement::MinRating {
        rating: 4.9,
        min_deliveries: 20,
    };
    let mut candidate = UserStats {
        rating: 4.95,
        completed_deliveries: 19,
        ..UserStats::default()
    };

    assert_eq!(evaluate(&candidate, &requirement), Eligibility::Ineligible);

    candidate.completed_deliveries = 20;
    assert_eq!(evaluate(&candidate, &requirement), Eligibility::Eligible);

    candidate.rating = 4.8;
    assert_eq!(evaluate(&candidate, &requirement), Eligibility::Ineligible);
}

#[test]
fn weekly_deliveries_reads_trailing_thirty_days() {
    let requirement = Requirement::WeeklyDeliveries { count: 10 };
    let busy_month = UserStats {
        completed_deliveries: 3,
        recent_30_days_deliveries: 10,
        ..UserStats::default()
    };
    let long_tenure = UserStats {
        completed_deliveries: 300,
        recent_30_days_deliveries: 9,
        ..UserStats::default()
    };

    assert!(is_eligible(&busy_month, &requirement));
    assert!(!is_eligible(&long_tenure, &requirement));
}

#[test]
fn penalty_free_requirements_fail_on_any_penalty() {
    let streak = Requirement::ConsecutiveDeliveriesWithoutDelay { count: 30 };
    let no_show = Requirement::NoShowCount {
        max_no_shows: 0,
        min_deliveries: 10,
    };
    let mut candidate = stats(40);

    assert!(is_eligible(&candidate, &streak));
    assert!(is_eligible(&candidate, &no_show));

    candidate.recent_penalties = 1;
    assert!(!is_eligible(&candidate, &streak));
    assert!(!is_eligible(&candidate, &no_show));
}

#[test]
fn delay_rate_is_strictly_below_allowance() {
    let requirement = Requirement::DelayRate {
        max_rate: 0.05,
        min_deliveries: 50,
    };
    let mut candidate = UserStats {
        completed_deliveries: 100,
        recent_penalties: 4,
        ..UserStats::default()
    };

    assert!(is_eligible(&candidate, &requirement));

    candidate.recent_penalties = 5;
    assert!(!is_eligible(&candidate, &requirement));

    candidate.recent_penalties = 0;
    candidate.completed_deliveries = 49;
    assert!(!is_eligible(&candidate, &requirement));
}

#[test]
fn history_backed_requirements_are_not_evaluable_without_history() {
    let veteran = veteran_stats();
    let cases = [
        (
            Requirement::UniqueLinesUsed { count: 5 },
            HistorySource::RouteLines,
        ),
        (
            Requirement::TransferDeliveries { count: 10 },
            HistorySource::Transfers,
        ),
        (
            Requirement::ConsecutiveWeeks { weeks: 4 },
            HistorySource::WeeklyCohorts,
        ),
        (
            Requirement::MentorCount { count: 3 },
            HistorySource::Mentorship,
        ),
        (
            Requirement::CommunityPosts { count: 5 },
            HistorySource::CommunityPosts,
        ),
        (
            Requirement::MonthlyTopRating { months: 1 },
            HistorySource::MonthlyRankings,
        ),
        (
            Requirement::EarlySignup {
                max_signup_rank: 1000,
            },
            HistorySource::SignupOrder,
        ),
    ];

    for (requirement, source) in cases {
        assert_eq!(
            evaluate(&veteran, &requirement),
            Eligibility::NotEvaluable(source)
        );
        assert_eq!(requirement.history_source(), Some(source));
        assert!(!is_eligible(&veteran, &requirement));
    }
}

#[test]
fn history_backed_requirements_use_supplied_history() {
    let history = ActivityHistory {
        unique_lines_used: Some(6),
        consecutive_active_weeks: Some(3),
        signup_rank: Some(1000),
        ..ActivityHistory::default()
    };
    let newcomer = stats(0);

    assert_eq!(
        evaluate_with_history(
            &newcomer,
            &history,
            &Requirement::UniqueLinesUsed { count: 5 }
        ),
        Eligibility::Eligible
    );
    assert_eq!(
        evaluate_with_history(
            &newcomer,
            &history,
            &Requirement::ConsecutiveWeeks { weeks: 4 }
        ),
        Eligibility::Ineligible
    );
    assert_eq!(
        evaluate_with_history(
            &newcomer,
            &history,
            &Requirement::EarlySignup {
                max_signup_rank: 1000
            }
        ),
        Eligibility::Eligible
    );
    assert_eq!(
        evaluate_with_history(
            &newcomer,
            &history,
            &Requirement::MentorCount { count: 1 }
        ),
        Eligibility::NotEvaluable(HistorySource::Mentorship)
    );
}

#[test]
fn pending_skips_owned_badges_and_separates_unevaluable() {
    let catalog = BadgeCatalog::standard();
    let evaluator = EligibilityEvaluator::new(catalog.clone());
    let mut owned = UserBadges::new();
    owned.insert(catalog.find_by_id(catalog::NEWBIE).expect("newbie exists"));

    let pass = evaluator.pending(&veteran_stats(), &ActivityHistory::default(), &owned);

    assert!(!pass.eligible.contains(&catalog::NEWBIE));
    assert!(!pass.ineligible.contains(&catalog::NEWBIE));
    assert_eq!(
        pass.eligible,
        vec![
            catalog::WEEKLY_RUNNER,
            catalog::TOP_RATED,
            catalog::NO_SHOW_FREE,
            catalog::PUNCTUAL,
            catalog::ON_TIME_STREAK,
        ]
    );
    assert!(pass.ineligible.is_empty());
    assert_eq!(pass.not_evaluable.len(), 7);
    assert_eq!(
        pass.eligible.len() + pass.ineligible.len() + pass.not_evaluable.len(),
        catalog.len() - owned.total()
    );
}

#[test]
fn pending_is_deterministic() {
    let evaluator = EligibilityEvaluator::new(Arc::new(
        BadgeCatalog::new(
            BadgeCatalog::standard()
                .by_category(BadgeCategory::Quality)
                .into_iter()
                .cloned()
                .collect(),
        )
        .expect("quality subset is unique"),
    ));
    let candidate = UserStats {
        rating: 4.95,
        completed_deliveries: 25,
        ..UserStats::default()
    };

    let first = evaluator.pending(&candidate, &ActivityHistory::default(), &UserBadges::new());
    let second = evaluator.pending(&candidate, &ActivityHistory::default(), &UserBadges::new());

    assert_eq!(first, second);
    assert_eq!(first.eligible, vec![catalog::TOP_RATED, catalog::NO_SHOW_FREE]);
    assert_eq!(first.ineligible, vec![catalog::PUNCTUAL]);
}

#[test]
fn missing_stats_fields_default_to_zero() {
    let parsed: UserStats =
        serde_json::from_str(r#"{ "completed_deliveries": 12 }"#).expect("partial stats parse");

    assert_eq!(parsed.completed_deliveries, 12);
    assert_eq!(parsed.recent_penalties, 0);
    assert_eq!(parsed.rating, 0.0);
    assert_eq!(parsed.recent_30_days_deliveries, 0);
}
