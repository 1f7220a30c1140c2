use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::progression::catalog::{self, BadgeCatalog};
use crate::progression::domain::{UserId, UserStats};
use crate::progression::ledger::{BadgeLedger, LedgerConfig};
use crate::progression::policy::ProgressionPolicy;
use crate::progression::service::ProgressionService;
use crate::progression::store::{BadgeRecord, BadgeStore, StoreError};

pub(super) fn giller(suffix: &str) -> UserId {
    UserId(format!("giller-{suffix}"))
}

pub(super) fn stats(completed_deliveries: u32) -> UserStats {
    UserStats {
        completed_deliveries,
        ..UserStats::default()
    }
}

/// Stats that satisfy every badge computable from `UserStats` alone.
pub(super) fn veteran_stats() -> UserStats {
    UserStats {
        completed_deliveries: 120,
        total_earnings: 1_450_000.0,
        rating: 4.95,
        recent_penalties: 0,
        account_age_days: 400,
        recent_30_days_deliveries: 24,
    }
}

/// Ids of five standard badges, spread over several categories.
pub(super) fn five_badges() -> [&'static str; 5] {
    [
        catalog::NEWBIE,
        catalog::WEEKLY_RUNNER,
        catalog::TOP_RATED,
        catalog::LINE_EXPLORER,
        catalog::MENTOR,
    ]
}

pub(super) fn ledger_config() -> LedgerConfig {
    LedgerConfig {
        max_commit_attempts: 3,
    }
}

pub(super) fn ledger_with<S: BadgeStore + 'static>(store: Arc<S>) -> BadgeLedger<S> {
    BadgeLedger::new(store, BadgeCatalog::standard(), ledger_config())
}

pub(super) fn build_service() -> (ProgressionService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = ProgressionService::with_standard_catalog(
        store.clone(),
        ProgressionPolicy::standard(),
        ledger_config(),
    );
    (service, store)
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<UserId, BadgeRecord>>>,
    pub(super) writes: Arc<AtomicU32>,
}

impl MemoryStore {
    pub(super) fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl BadgeStore for MemoryStore {
    fn load(&self, user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(user_id).cloned())
    }

    fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected_version: u64,
        record: BadgeRecord,
    ) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let found = guard.get(user_id).map_or(0, BadgeRecord::version);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found,
            });
        }
        guard.insert(user_id.clone(), record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reads succeed from the wrapped store; every write fails.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    pub(super) inner: MemoryStore,
}

impl BadgeStore for ReadOnlyStore {
    fn load(&self, user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError> {
        self.inner.load(user_id)
    }

    fn compare_and_swap(
        &self,
        _user_id: &UserId,
        _expected_version: u64,
        _record: BadgeRecord,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("write quorum lost".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl BadgeStore for UnavailableStore {
    fn load(&self, _user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn compare_and_swap(
        &self,
        _user_id: &UserId,
        _expected_version: u64,
        _record: BadgeRecord,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Lets a competing writer award `rival_badge` right before the first commit lands.
pub(super) struct RacingStore {
    pub(super) inner: MemoryStore,
    pub(super) rival: Mutex<Option<(BadgeLedger<MemoryStore>, &'static str)>>,
}

impl RacingStore {
    pub(super) fn new(rival_badge: &'static str) -> Self {
        let inner = MemoryStore::default();
        let rival = ledger_with(Arc::new(inner.clone()));
        Self {
            inner,
            rival: Mutex::new(Some((rival, rival_badge))),
        }
    }
}

impl BadgeStore for RacingStore {
    fn load(&self, user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError> {
        self.inner.load(user_id)
    }

    fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected_version: u64,
        record: BadgeRecord,
    ) -> Result<(), StoreError> {
        let rival = self.rival.lock().expect("rival mutex poisoned").take();
        if let Some((ledger, badge_id)) = rival {
            ledger
                .award(user_id, badge_id)
                .expect("rival award commits");
        }
        self.inner.compare_and_swap(user_id, expected_version, record)
    }
}

/// Every commit loses the race.
pub(super) struct ContendedStore;

impl BadgeStore for ContendedStore {
    fn load(&self, _user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError> {
        Ok(None)
    }

    fn compare_and_swap(
        &self,
        _user_id: &UserId,
        expected_version: u64,
        _record: BadgeRecord,
    ) -> Result<(), StoreError> {
        Err(StoreError::VersionConflict {
            expected: expected_version,
            found: expected_version + 1,
        })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
