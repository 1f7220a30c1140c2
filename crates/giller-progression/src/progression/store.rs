use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{BadgeBenefits, UserBadges, UserId};

/// Persisted badge set plus the benefits derived from it.
///
/// `version` starts at 0 for a user with no stored record and increases by one per commit.
/// Loading a record recomputes `benefits` from the badge set instead of trusting stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct BadgeRecord {
    badges: UserBadges,
    benefits: BadgeBenefits,
    version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl BadgeRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn badges(&self) -> &UserBadges {
        &self.badges
    }

    pub fn benefits(&self) -> &BadgeBenefits {
        &self.benefits
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Next revision carrying `badges`, with benefits recomputed from them.
    pub(crate) fn successor(&self, badges: UserBadges, now: DateTime<Utc>) -> Self {
        Self {
            benefits: BadgeBenefits::from_badges(&badges),
            badges,
            version: self.version + 1,
            updated_at: Some(now),
        }
    }
}

#[derive(Deserialize)]
struct StoredRecord {
    badges: UserBadges,
    version: u64,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredRecord> for BadgeRecord {
    fn from(stored: StoredRecord) -> Self {
        Self {
            benefits: BadgeBenefits::from_badges(&stored.badges),
            badges: stored.badges,
            version: stored.version,
            updated_at: stored.updated_at,
        }
    }
}

/// Storage abstraction for per-user badge records.
///
/// `compare_and_swap` must replace the record only when the stored version equals
/// `expected_version` (absent records count as version 0), writing badges and benefits
/// together.
pub trait BadgeStore: Send + Sync {
    fn load(&self, user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError>;
    fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected_version: u64,
        record: BadgeRecord,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record changed concurrently (expected version {expected}, found {found})")]
    VersionConflict { expected: u64, found: u64 },
    #[error("badge store unavailable: {0}")]
    Unavailable(String),
}
