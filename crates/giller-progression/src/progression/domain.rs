use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use super::catalog::{Badge, BadgeCatalog};
use super::tier::tier_of;

/// Identifier wrapper for a giller account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Catalog grouping a badge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Activity,
    Quality,
    Expertise,
    Community,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 4] = [
        BadgeCategory::Activity,
        BadgeCategory::Quality,
        BadgeCategory::Expertise,
        BadgeCategory::Community,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            BadgeCategory::Activity => "activity",
            BadgeCategory::Quality => "quality",
            BadgeCategory::Expertise => "expertise",
            BadgeCategory::Community => "community",
        }
    }
}

/// Rarity printed on an individual catalog badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl BadgeTier {
    pub const fn label(self) -> &'static str {
        match self {
            BadgeTier::Bronze => "bronze",
            BadgeTier::Silver => "silver",
            BadgeTier::Gold => "gold",
            BadgeTier::Platinum => "platinum",
        }
    }
}

/// Rank derived from the number of earned badges. Doubles as the profile frame.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTier {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ProfileTier {
    pub const fn label(self) -> &'static str {
        match self {
            ProfileTier::None => "none",
            ProfileTier::Bronze => "bronze",
            ProfileTier::Silver => "silver",
            ProfileTier::Gold => "gold",
            ProfileTier::Platinum => "platinum",
        }
    }
}

/// Tenure classification driven purely by completed deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Newcomer,
    Regular,
    Expert,
    Master,
}

impl Grade {
    pub const fn label(self) -> &'static str {
        match self {
            Grade::Newcomer => "newcomer",
            Grade::Regular => "regular",
            Grade::Expert => "expert",
            Grade::Master => "master",
        }
    }
}

/// Activity snapshot supplied by the delivery and rating subsystems.
///
/// Fields absent from an incoming payload deserialize to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub completed_deliveries: u32,
    pub total_earnings: f64,
    pub rating: f32,
    pub recent_penalties: u32,
    pub account_age_days: u32,
    pub recent_30_days_deliveries: u32,
}

/// Supplemental history that `UserStats` cannot answer.
///
/// `None` means the upstream source is not wired up for this user, which leaves the dependent
/// requirements not evaluable rather than failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityHistory {
    pub unique_lines_used: Option<u32>,
    pub transfer_deliveries: Option<u32>,
    pub consecutive_active_weeks: Option<u32>,
    pub mentees: Option<u32>,
    pub community_posts: Option<u32>,
    pub monthly_top_rating_months: Option<u32>,
    pub signup_rank: Option<u32>,
}

/// Earned badge ids grouped by catalog category.
///
/// Mutation goes through catalog entries so an id can only be filed under its own category.
/// Deserialization re-files every id under its catalog category and rejects unknown ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserBadges {
    by_category: BTreeMap<BadgeCategory, BTreeSet<String>>,
}

impl UserBadges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the badge was not held before.
    pub fn insert(&mut self, badge: &Badge) -> bool {
        self.by_category
            .entry(badge.category)
            .or_default()
            .insert(badge.id.to_string())
    }

    /// Returns `true` when the badge was held before.
    pub fn remove(&mut self, badge: &Badge) -> bool {
        let Some(ids) = self.by_category.get_mut(&badge.category) else {
            return false;
        };
        let removed = ids.remove(badge.id);
        if ids.is_empty() {
            self.by_category.remove(&badge.category);
        }
        removed
    }

    pub fn contains(&self, badge_id: &str) -> bool {
        self.by_category.values().any(|ids| ids.contains(badge_id))
    }

    pub fn in_category(&self, category: BadgeCategory) -> impl Iterator<Item = &str> {
        self.by_category
            .get(&category)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_category
            .values()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    pub fn total(&self) -> usize {
        self.by_category.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Ids held here but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a UserBadges) -> impl Iterator<Item = &'a str> {
        self.ids().filter(move |id| !other.contains(id))
    }
}

impl<'de> Deserialize<'de> for UserBadges {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = BTreeMap::<BadgeCategory, BTreeSet<String>>::deserialize(deserializer)?;
        let catalog = BadgeCatalog::standard();
        let mut badges = UserBadges::new();
        for id in stored.into_values().flatten() {
            let badge = catalog.find_by_id(&id).map_err(serde::de::Error::custom)?;
            badges.insert(badge);
        }
        Ok(badges)
    }
}

/// Cached tier summary kept in lockstep with a [`UserBadges`] set.
///
/// Only [`BadgeBenefits::from_badges`] builds one, so it is serialized but never read back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeBenefits {
    current_tier: ProfileTier,
    total_badges: u32,
}

impl BadgeBenefits {
    pub fn from_badges(badges: &UserBadges) -> Self {
        let total = badges.total();
        Self {
            current_tier: tier_of(total),
            total_badges: u32::try_from(total).unwrap_or(u32::MAX),
        }
    }

    pub fn current_tier(&self) -> ProfileTier {
        self.current_tier
    }

    /// Same value as the tier; kept for frame-oriented consumers.
    pub fn profile_frame(&self) -> ProfileTier {
        self.current_tier
    }

    pub fn total_badges(&self) -> u32 {
        self.total_badges
    }
}
