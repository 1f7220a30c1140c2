use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::{Badge, BadgeCatalog, CatalogError};
use super::domain::{UserBadges, UserId};
use super::store::{BadgeRecord, BadgeStore, StoreError};

pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Compare-and-set attempts before giving up on a contended record.
    pub max_commit_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
        }
    }
}

/// Outcome of an award or revoke. `applied` is false for idempotent no-ops.
///
/// `added` and `removed` are measured against the state the winning commit replaced, so a badge
/// landed by a concurrent writer never shows up here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerChange {
    pub applied: bool,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub record: BadgeRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("gave up on user {user_id} after {attempts} conflicting commits")]
    Contention { user_id: String, attempts: u32 },
}

/// Sole writer of badge records.
///
/// Every mutation is a read-modify-write of the whole record committed through
/// [`BadgeStore::compare_and_swap`]; a version conflict replays the mutation on fresh state.
pub struct BadgeLedger<S> {
    store: Arc<S>,
    catalog: Arc<BadgeCatalog>,
    config: LedgerConfig,
}

impl<S> BadgeLedger<S>
where
    S: BadgeStore + 'static,
{
    pub fn new(store: Arc<S>, catalog: Arc<BadgeCatalog>, config: LedgerConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    /// Current record for a user; users without one get an empty record.
    pub fn snapshot(&self, user_id: &UserId) -> Result<BadgeRecord, LedgerError> {
        Ok(self.store.load(user_id)?.unwrap_or_default())
    }

    pub fn award(&self, user_id: &UserId, badge_id: &str) -> Result<LedgerChange, LedgerError> {
        let badge = self.catalog.find_by_id(badge_id)?;
        self.commit(user_id, "award", |badges| badges.insert(badge))
    }

    pub fn revoke(&self, user_id: &UserId, badge_id: &str) -> Result<LedgerChange, LedgerError> {
        let badge = self.catalog.find_by_id(badge_id)?;
        self.commit(user_id, "revoke", |badges| badges.remove(badge))
    }

    /// Award several badges in a single commit. Unknown ids fail the whole batch.
    pub fn award_all(
        &self,
        user_id: &UserId,
        badge_ids: &[&str],
    ) -> Result<LedgerChange, LedgerError> {
        let badges = badge_ids
            .iter()
            .map(|id| self.catalog.find_by_id(id))
            .collect::<Result<Vec<&Badge>, _>>()?;

        self.commit(user_id, "award_all", |owned| {
            badges
                .iter()
                .fold(false, |changed, badge| owned.insert(badge) || changed)
        })
    }

    fn commit<F>(
        &self,
        user_id: &UserId,
        operation: &'static str,
        mutate: F,
    ) -> Result<LedgerChange, LedgerError>
    where
        F: Fn(&mut UserBadges) -> bool,
    {
        let attempts = self.config.max_commit_attempts.max(1);

        for attempt in 1..=attempts {
            let current = self.snapshot(user_id)?;
            let mut badges = current.badges().clone();

            if !mutate(&mut badges) {
                debug!(user_id = user_id.as_str(), operation, "badge set unchanged");
                return Ok(LedgerChange {
                    applied: false,
                    added: Vec::new(),
                    removed: Vec::new(),
                    record: current,
                });
            }

            let next = current.successor(badges, Utc::now());
            match self
                .store
                .compare_and_swap(user_id, current.version(), next.clone())
            {
                Ok(()) => {
                    info!(
                        user_id = user_id.as_str(),
                        operation,
                        version = next.version(),
                        total_badges = next.benefits().total_badges(),
                        tier = next.benefits().current_tier().label(),
                        "badge record committed"
                    );
                    let added = next.badges().difference(current.badges());
                    let removed = current.badges().difference(next.badges());
                    return Ok(LedgerChange {
                        applied: true,
                        added: added.map(String::from).collect(),
                        removed: removed.map(String::from).collect(),
                        record: next,
                    });
                }
                Err(StoreError::VersionConflict { expected, found }) => {
                    warn!(
                        user_id = user_id.as_str(),
                        operation, attempt, expected, found, "badge record conflict, retrying"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(LedgerError::Contention {
            user_id: user_id.0.clone(),
            attempts,
        })
    }
}
