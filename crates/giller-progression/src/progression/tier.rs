use super::domain::ProfileTier;

pub const BRONZE_MIN_BADGES: usize = 1;
pub const SILVER_MIN_BADGES: usize = 5;
pub const GOLD_MIN_BADGES: usize = 9;
pub const PLATINUM_MIN_BADGES: usize = 13;

/// Map an earned-badge count onto the profile tier.
pub fn tier_of(total_badges: usize) -> ProfileTier {
    if total_badges >= PLATINUM_MIN_BADGES {
        ProfileTier::Platinum
    } else if total_badges >= GOLD_MIN_BADGES {
        ProfileTier::Gold
    } else if total_badges >= SILVER_MIN_BADGES {
        ProfileTier::Silver
    } else if total_badges >= BRONZE_MIN_BADGES {
        ProfileTier::Bronze
    } else {
        ProfileTier::None
    }
}
