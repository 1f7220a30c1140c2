//! Giller progression: badge catalog, eligibility rules, tier and grade calculators, and the
//! ledger that keeps a user's badge set and derived tier consistent in storage.
//!
//! The pure pieces (`catalog`, `requirement`, `tier`, `grade`, `policy`) hold no state and can
//! be called from any thread. All writes go through [`BadgeLedger`].

pub mod catalog;
pub mod domain;
mod facade;
pub mod grade;
mod ledger;
mod policy;
pub mod requirement;
pub mod router;
mod service;
pub mod store;
pub mod tier;

#[cfg(test)]
mod tests;

pub use catalog::{Badge, BadgeCatalog, CatalogError};
pub use domain::{
    ActivityHistory, BadgeBenefits, BadgeCategory, BadgeTier, Grade, ProfileTier, UserBadges,
    UserId, UserStats,
};
pub use facade::{GradeStanding, ProgressionFacade, ProgressionSnapshot};
pub use grade::GradeProgress;
pub use ledger::{
    BadgeLedger, LedgerChange, LedgerConfig, LedgerError, DEFAULT_MAX_COMMIT_ATTEMPTS,
};
pub use policy::{GradeBenefits, PolicyError, PriorityClass, ProgressionPolicy};
pub use requirement::{
    Eligibility, EligibilityEvaluator, EvaluationPass, HistorySource, NotEvaluableBadge,
    Requirement,
};
pub use router::progression_router;
pub use service::{EvaluationReport, ProgressionService};
pub use store::{BadgeRecord, BadgeStore, StoreError};
pub use tier::tier_of;
