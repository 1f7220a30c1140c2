use std::sync::Arc;

use serde::Serialize;

use super::domain::{BadgeBenefits, Grade, UserId};
use super::grade;
use super::ledger::{BadgeLedger, LedgerError};
use super::policy::{GradeBenefits, ProgressionPolicy};
use super::store::BadgeStore;

/// Grade-side benefits read by matching and fee calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeStanding {
    pub grade: Grade,
    pub progress_fraction: f64,
    pub deliveries_until_next: Option<u32>,
    #[serde(flatten)]
    pub benefits: GradeBenefits,
}

/// Read-only view combining grade standing and the persisted badge tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSnapshot {
    pub user_id: UserId,
    pub grade: GradeStanding,
    pub badges: BadgeBenefits,
}

pub struct ProgressionFacade<S> {
    ledger: Arc<BadgeLedger<S>>,
    policy: Arc<ProgressionPolicy>,
}

impl<S> ProgressionFacade<S>
where
    S: BadgeStore + 'static,
{
    pub fn new(ledger: Arc<BadgeLedger<S>>, policy: Arc<ProgressionPolicy>) -> Self {
        Self { ledger, policy }
    }

    pub fn policy(&self) -> &ProgressionPolicy {
        &self.policy
    }

    pub fn grade_standing(&self, completed_deliveries: u32) -> GradeStanding {
        let progress = grade::progress_of(completed_deliveries);
        GradeStanding {
            grade: progress.grade,
            progress_fraction: progress.progress_fraction,
            deliveries_until_next: progress.deliveries_until_next,
            benefits: self.policy.benefits(progress.grade).clone(),
        }
    }

    /// Never writes; badge benefits come straight from the stored record.
    pub fn benefits_for(
        &self,
        user_id: &UserId,
        completed_deliveries: u32,
    ) -> Result<ProgressionSnapshot, LedgerError> {
        let record = self.ledger.snapshot(user_id)?;
        Ok(ProgressionSnapshot {
            user_id: user_id.clone(),
            grade: self.grade_standing(completed_deliveries),
            badges: *record.benefits(),
        })
    }
}
