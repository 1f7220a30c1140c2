use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::catalog::BadgeCatalog;
use super::domain::{ActivityHistory, BadgeBenefits, UserId, UserStats};
use super::facade::{ProgressionFacade, ProgressionSnapshot};
use super::ledger::{BadgeLedger, LedgerChange, LedgerConfig, LedgerError};
use super::policy::ProgressionPolicy;
use super::requirement::{EligibilityEvaluator, NotEvaluableBadge};
use super::store::{BadgeRecord, BadgeStore};

/// Result of one evaluation pass for a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub user_id: UserId,
    pub awarded: Vec<&'static str>,
    pub not_evaluable: Vec<NotEvaluableBadge>,
    pub benefits: BadgeBenefits,
}

/// Service composing the evaluator, ledger, and read facade.
pub struct ProgressionService<S> {
    evaluator: EligibilityEvaluator,
    ledger: Arc<BadgeLedger<S>>,
    facade: ProgressionFacade<S>,
}

impl<S> ProgressionService<S>
where
    S: BadgeStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        catalog: Arc<BadgeCatalog>,
        policy: ProgressionPolicy,
        ledger_config: LedgerConfig,
    ) -> Self {
        let ledger = Arc::new(BadgeLedger::new(store, catalog.clone(), ledger_config));
        let facade = ProgressionFacade::new(ledger.clone(), Arc::new(policy));

        Self {
            evaluator: EligibilityEvaluator::new(catalog),
            ledger,
            facade,
        }
    }

    pub fn with_standard_catalog(
        store: Arc<S>,
        policy: ProgressionPolicy,
        ledger_config: LedgerConfig,
    ) -> Self {
        Self::new(store, BadgeCatalog::standard(), policy, ledger_config)
    }

    pub fn catalog(&self) -> &BadgeCatalog {
        self.ledger.catalog()
    }

    pub fn facade(&self) -> &ProgressionFacade<S> {
        &self.facade
    }

    /// Check every unowned badge and commit the newly earned ones together.
    ///
    /// `awarded` lists only the badges this commit added; ones a concurrent writer landed first
    /// are left out.
    pub fn evaluate(
        &self,
        user_id: &UserId,
        stats: &UserStats,
        history: &ActivityHistory,
    ) -> Result<EvaluationReport, LedgerError> {
        let current = self.ledger.snapshot(user_id)?;
        let pass = self.evaluator.pending(stats, history, current.badges());

        debug!(
            user_id = user_id.as_str(),
            eligible = pass.eligible.len(),
            ineligible = pass.ineligible.len(),
            not_evaluable = pass.not_evaluable.len(),
            "evaluated unowned badges"
        );

        let (record, awarded) = if pass.eligible.is_empty() {
            (current, Vec::new())
        } else {
            let change = self.ledger.award_all(user_id, &pass.eligible)?;
            let awarded = pass
                .eligible
                .into_iter()
                .filter(|id| change.added.iter().any(|added| added == id))
                .collect();
            (change.record, awarded)
        };

        Ok(EvaluationReport {
            user_id: user_id.clone(),
            awarded,
            not_evaluable: pass.not_evaluable,
            benefits: *record.benefits(),
        })
    }

    pub fn benefits_for(
        &self,
        user_id: &UserId,
        completed_deliveries: u32,
    ) -> Result<ProgressionSnapshot, LedgerError> {
        self.facade.benefits_for(user_id, completed_deliveries)
    }

    pub fn badges(&self, user_id: &UserId) -> Result<BadgeRecord, LedgerError> {
        self.ledger.snapshot(user_id)
    }

    pub fn award(&self, user_id: &UserId, badge_id: &str) -> Result<LedgerChange, LedgerError> {
        self.ledger.award(user_id, badge_id)
    }

    pub fn revoke(&self, user_id: &UserId, badge_id: &str) -> Result<LedgerChange, LedgerError> {
        self.ledger.revoke(user_id, badge_id)
    }
}
