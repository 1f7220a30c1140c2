//! Fixed badge catalog shipped with each deployment.
//!
//! Badge ids are stable strings persisted in every user's badge record; renaming one orphans
//! the badge for existing holders.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use super::domain::{BadgeCategory, BadgeTier};
use super::requirement::Requirement;

pub const NEWBIE: &str = "badge_newbie";
pub const WEEKLY_RUNNER: &str = "badge_weekly_runner";
pub const STEADY_COMMUTER: &str = "badge_steady_commuter";
pub const TOP_RATED: &str = "badge_top_rated";
pub const NO_SHOW_FREE: &str = "badge_no_show_free";
pub const PUNCTUAL: &str = "badge_punctual";
pub const LINE_EXPLORER: &str = "badge_line_explorer";
pub const TRANSFER_PRO: &str = "badge_transfer_pro";
pub const ON_TIME_STREAK: &str = "badge_on_time_streak";
pub const MENTOR: &str = "badge_mentor";
pub const STORYTELLER: &str = "badge_storyteller";
pub const MONTHLY_STAR: &str = "badge_monthly_star";
pub const EARLY_BIRD: &str = "badge_early_bird";

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub category: BadgeCategory,
    pub tier: BadgeTier,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("badge '{0}' is not in the catalog")]
    BadgeNotFound(String),
    #[error("badge id '{0}' appears more than once")]
    DuplicateBadgeId(String),
}

/// Read-only registry of badge definitions.
#[derive(Debug, Clone)]
pub struct BadgeCatalog {
    entries: Vec<Badge>,
}

static STANDARD: OnceLock<Arc<BadgeCatalog>> = OnceLock::new();

impl BadgeCatalog {
    pub fn new(entries: Vec<Badge>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for badge in &entries {
            if !seen.insert(badge.id) {
                return Err(CatalogError::DuplicateBadgeId(badge.id.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// The production catalog, built on first use and shared afterwards.
    pub fn standard() -> Arc<BadgeCatalog> {
        STANDARD
            .get_or_init(|| {
                Arc::new(BadgeCatalog {
                    entries: standard_entries(),
                })
            })
            .clone()
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Badge, CatalogError> {
        self.entries
            .iter()
            .find(|badge| badge.id == id)
            .ok_or_else(|| CatalogError::BadgeNotFound(id.to_string()))
    }

    pub fn by_category(&self, category: BadgeCategory) -> Vec<&Badge> {
        self.entries
            .iter()
            .filter(|badge| badge.category == category)
            .collect()
    }

    pub fn by_tier(&self, tier: BadgeTier) -> Vec<&Badge> {
        self.entries
            .iter()
            .filter(|badge| badge.tier == tier)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Badge> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn standard_entries() -> Vec<Badge> {
    vec![
        Badge {
            id: NEWBIE,
            category: BadgeCategory::Activity,
            tier: BadgeTier::Bronze,
            name: "First Delivery",
            description: "Completed your first delivery as a giller.",
            icon: "🌱",
            requirement: Requirement::CompletedDeliveries { count: 1 },
        },
        Badge {
            id: WEEKLY_RUNNER,
            category: BadgeCategory::Activity,
            tier: BadgeTier::Silver,
            name: "Weekly Runner",
            description: "Completed 10 deliveries within the last 30 days.",
            icon: "🏃",
            requirement: Requirement::WeeklyDeliveries { count: 10 },
        },
        Badge {
            id: STEADY_COMMUTER,
            category: BadgeCategory::Activity,
            tier: BadgeTier::Gold,
            name: "Steady Commuter",
            description: "Delivered in 4 consecutive weeks.",
            icon: "📅",
            requirement: Requirement::ConsecutiveWeeks { weeks: 4 },
        },
        Badge {
            id: TOP_RATED,
            category: BadgeCategory::Quality,
            tier: BadgeTier::Gold,
            name: "Top Rated",
            description: "Holds a 4.9 rating across at least 20 deliveries.",
            icon: "⭐",
            requirement: Requirement::MinRating {
                rating: 4.9,
                min_deliveries: 20,
            },
        },
        Badge {
            id: NO_SHOW_FREE,
            category: BadgeCategory::Quality,
            tier: BadgeTier::Silver,
            name: "Always There",
            description: "No missed pickups across at least 10 deliveries.",
            icon: "🤝",
            requirement: Requirement::NoShowCount {
                max_no_shows: 0,
                min_deliveries: 10,
            },
        },
        Badge {
            id: PUNCTUAL,
            category: BadgeCategory::Quality,
            tier: BadgeTier::Platinum,
            name: "Punctual",
            description: "Fewer than 5% of at least 50 deliveries were late.",
            icon: "⏱️",
            requirement: Requirement::DelayRate {
                max_rate: 0.05,
                min_deliveries: 50,
            },
        },
        Badge {
            id: LINE_EXPLORER,
            category: BadgeCategory::Expertise,
            tier: BadgeTier::Silver,
            name: "Line Explorer",
            description: "Delivered along 5 different subway lines.",
            icon: "🚇",
            requirement: Requirement::UniqueLinesUsed { count: 5 },
        },
        Badge {
            id: TRANSFER_PRO,
            category: BadgeCategory::Expertise,
            tier: BadgeTier::Gold,
            name: "Transfer Pro",
            description: "Completed 10 deliveries that required a transfer.",
            icon: "🔀",
            requirement: Requirement::TransferDeliveries { count: 10 },
        },
        Badge {
            id: ON_TIME_STREAK,
            category: BadgeCategory::Expertise,
            tier: BadgeTier::Platinum,
            name: "On-Time Streak",
            description: "30 deliveries without a single delay.",
            icon: "🎯",
            requirement: Requirement::ConsecutiveDeliveriesWithoutDelay { count: 30 },
        },
        Badge {
            id: MENTOR,
            category: BadgeCategory::Community,
            tier: BadgeTier::Gold,
            name: "Mentor",
            description: "Guided 3 new gillers through their first deliveries.",
            icon: "🧭",
            requirement: Requirement::MentorCount { count: 3 },
        },
        Badge {
            id: STORYTELLER,
            category: BadgeCategory::Community,
            tier: BadgeTier::Bronze,
            name: "Storyteller",
            description: "Shared 5 posts with the giller community.",
            icon: "💬",
            requirement: Requirement::CommunityPosts { count: 5 },
        },
        Badge {
            id: MONTHLY_STAR,
            category: BadgeCategory::Community,
            tier: BadgeTier::Platinum,
            name: "Monthly Star",
            description: "Finished a month as the top-rated giller.",
            icon: "🏆",
            requirement: Requirement::MonthlyTopRating { months: 1 },
        },
        Badge {
            id: EARLY_BIRD,
            category: BadgeCategory::Community,
            tier: BadgeTier::Bronze,
            name: "Early Bird",
            description: "One of the first 1,000 gillers to sign up.",
            icon: "🐣",
            requirement: Requirement::EarlySignup {
                max_signup_rank: 1000,
            },
        },
    ]
}
