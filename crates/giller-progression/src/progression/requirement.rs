use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::BadgeCatalog;
use super::domain::{ActivityHistory, UserBadges, UserStats};

/// Typed unlock rule attached to a catalog badge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    CompletedDeliveries { count: u32 },
    /// Approximated by deliveries in the trailing 30 days.
    WeeklyDeliveries { count: u32 },
    ConsecutiveDeliveriesWithoutDelay { count: u32 },
    MinRating { rating: f32, min_deliveries: u32 },
    NoShowCount { max_no_shows: u32, min_deliveries: u32 },
    DelayRate { max_rate: f64, min_deliveries: u32 },
    UniqueLinesUsed { count: u32 },
    TransferDeliveries { count: u32 },
    ConsecutiveWeeks { weeks: u32 },
    MentorCount { count: u32 },
    CommunityPosts { count: u32 },
    MonthlyTopRating { months: u32 },
    EarlySignup { max_signup_rank: u32 },
}

/// External data feed a requirement needs beyond [`UserStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    RouteLines,
    Transfers,
    WeeklyCohorts,
    Mentorship,
    CommunityPosts,
    MonthlyRankings,
    SignupOrder,
}

/// Result of checking one requirement against a stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "missing_source", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Ineligible,
    NotEvaluable(HistorySource),
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    fn from_check(passed: bool) -> Self {
        if passed {
            Eligibility::Eligible
        } else {
            Eligibility::Ineligible
        }
    }
}

impl Requirement {
    /// The supplemental feed this requirement reads, if any.
    pub fn history_source(&self) -> Option<HistorySource> {
        match self {
            Requirement::UniqueLinesUsed { .. } => Some(HistorySource::RouteLines),
            Requirement::TransferDeliveries { .. } => Some(HistorySource::Transfers),
            Requirement::ConsecutiveWeeks { .. } => Some(HistorySource::WeeklyCohorts),
            Requirement::MentorCount { .. } => Some(HistorySource::Mentorship),
            Requirement::CommunityPosts { .. } => Some(HistorySource::CommunityPosts),
            Requirement::MonthlyTopRating { .. } => Some(HistorySource::MonthlyRankings),
            Requirement::EarlySignup { .. } => Some(HistorySource::SignupOrder),
            _ => None,
        }
    }
}

/// Check a requirement using only the stats snapshot.
pub fn evaluate(stats: &UserStats, requirement: &Requirement) -> Eligibility {
    evaluate_with_history(stats, &ActivityHistory::default(), requirement)
}

pub fn is_eligible(stats: &UserStats, requirement: &Requirement) -> bool {
    evaluate(stats, requirement).is_eligible()
}

pub fn evaluate_with_history(
    stats: &UserStats,
    history: &ActivityHistory,
    requirement: &Requirement,
) -> Eligibility {
    let completed = stats.completed_deliveries;
    let clean = stats.recent_penalties == 0;

    match *requirement {
        Requirement::CompletedDeliveries { count } => Eligibility::from_check(completed >= count),
        Requirement::WeeklyDeliveries { count } => {
            Eligibility::from_check(stats.recent_30_days_deliveries >= count)
        }
        Requirement::ConsecutiveDeliveriesWithoutDelay { count } => {
            Eligibility::from_check(clean && completed >= count)
        }
        Requirement::MinRating {
            rating,
            min_deliveries,
        } => Eligibility::from_check(stats.rating >= rating && completed >= min_deliveries),
        Requirement::NoShowCount {
            max_no_shows,
            min_deliveries,
        } => Eligibility::from_check(
            stats.recent_penalties <= max_no_shows && completed >= min_deliveries,
        ),
        Requirement::DelayRate {
            max_rate,
            min_deliveries,
        } => {
            let allowance = max_rate * f64::from(completed);
            Eligibility::from_check(
                f64::from(stats.recent_penalties) < allowance && completed >= min_deliveries,
            )
        }
        Requirement::UniqueLinesUsed { count } => {
            at_least(history.unique_lines_used, count, HistorySource::RouteLines)
        }
        Requirement::TransferDeliveries { count } => {
            at_least(history.transfer_deliveries, count, HistorySource::Transfers)
        }
        Requirement::ConsecutiveWeeks { weeks } => at_least(
            history.consecutive_active_weeks,
            weeks,
            HistorySource::WeeklyCohorts,
        ),
        Requirement::MentorCount { count } => {
            at_least(history.mentees, count, HistorySource::Mentorship)
        }
        Requirement::CommunityPosts { count } => {
            at_least(history.community_posts, count, HistorySource::CommunityPosts)
        }
        Requirement::MonthlyTopRating { months } => at_least(
            history.monthly_top_rating_months,
            months,
            HistorySource::MonthlyRankings,
        ),
        Requirement::EarlySignup { max_signup_rank } => match history.signup_rank {
            Some(rank) => Eligibility::from_check(rank <= max_signup_rank),
            None => Eligibility::NotEvaluable(HistorySource::SignupOrder),
        },
    }
}

fn at_least(observed: Option<u32>, threshold: u32, source: HistorySource) -> Eligibility {
    match observed {
        Some(value) => Eligibility::from_check(value >= threshold),
        None => Eligibility::NotEvaluable(source),
    }
}

/// Badge that could not be judged because its data feed is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotEvaluableBadge {
    pub badge_id: &'static str,
    pub missing_source: HistorySource,
}

/// Partition of the unowned catalog produced by one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationPass {
    pub eligible: Vec<&'static str>,
    pub ineligible: Vec<&'static str>,
    pub not_evaluable: Vec<NotEvaluableBadge>,
}

/// Runs catalog requirements against a user's stats. Owned badges are skipped.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    catalog: Arc<BadgeCatalog>,
}

impl EligibilityEvaluator {
    pub fn new(catalog: Arc<BadgeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn pending(
        &self,
        stats: &UserStats,
        history: &ActivityHistory,
        owned: &UserBadges,
    ) -> EvaluationPass {
        let mut pass = EvaluationPass::default();

        for badge in self.catalog.iter().filter(|badge| !owned.contains(badge.id)) {
            match evaluate_with_history(stats, history, &badge.requirement) {
                Eligibility::Eligible => pass.eligible.push(badge.id),
                Eligibility::Ineligible => pass.ineligible.push(badge.id),
                Eligibility::NotEvaluable(missing_source) => {
                    pass.not_evaluable.push(NotEvaluableBadge {
                        badge_id: badge.id,
                        missing_source,
                    })
                }
            }
        }

        pass
    }
}
