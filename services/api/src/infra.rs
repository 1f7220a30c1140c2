use giller_progression::progression::{BadgeRecord, BadgeStore, StoreError, UserId};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local badge store with version-checked writes.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBadgeStore {
    records: Arc<Mutex<HashMap<UserId, BadgeRecord>>>,
}

impl InMemoryBadgeStore {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<UserId, BadgeRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("badge store mutex poisoned".to_string()))
    }

    pub(crate) fn len(&self) -> Result<usize, StoreError> {
        Ok(self.guard()?.len())
    }
}

impl BadgeStore for InMemoryBadgeStore {
    fn load(&self, user_id: &UserId) -> Result<Option<BadgeRecord>, StoreError> {
        Ok(self.guard()?.get(user_id).cloned())
    }

    fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected_version: u64,
        record: BadgeRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.guard()?;
        let found = records.get(user_id).map_or(0, BadgeRecord::version);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found,
            });
        }
        records.insert(user_id.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giller_progression::progression::{catalog, BadgeCatalog, BadgeLedger, LedgerConfig};

    #[test]
    fn stale_version_is_rejected() {
        let store = Arc::new(InMemoryBadgeStore::default());
        let ledger = BadgeLedger::new(
            store.clone(),
            BadgeCatalog::standard(),
            LedgerConfig::default(),
        );
        let user = UserId("giller-infra".to_string());
        let change = ledger.award(&user, catalog::NEWBIE).expect("award commits");

        let result = store.compare_and_swap(&user, 0, change.record.clone());

        assert!(matches!(
            result,
            Err(StoreError::VersionConflict {
                expected: 0,
                found: 1
            })
        ));
        assert_eq!(store.len().expect("store readable"), 1);
    }

    #[test]
    fn poisoned_store_reports_unavailable() {
        let store = InMemoryBadgeStore::default();
        let records = store.records.clone();
        let _ = std::thread::spawn(move || {
            let _guard = records.lock().expect("first lock");
            panic!("writer crashed while holding the store");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.load(&UserId("giller-infra".to_string())),
            Err(StoreError::Unavailable(_))
        ));
    }
}
