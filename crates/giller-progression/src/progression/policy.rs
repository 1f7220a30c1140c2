use serde::{Deserialize, Serialize};

use super::domain::Grade;

/// Matching queue a giller is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    Standard,
    Preferred,
    Top,
}

/// Benefits granted to every giller holding a given grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBenefits {
    pub rate_bonus_percent: f32,
    pub max_daily_deliveries: u32,
    pub max_routes: u32,
    pub priority_class: PriorityClass,
}

/// Canonical grade → benefits table shared by matching and fee calculation.
///
/// One field per grade keeps the mapping total; alternative level names bind to this table
/// instead of carrying thresholds of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionPolicy {
    pub newcomer: GradeBenefits,
    pub regular: GradeBenefits,
    pub expert: GradeBenefits,
    pub master: GradeBenefits,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("{grade:?} rate bonus {value} must be within 0..=100")]
    RateBonusOutOfRange { grade: Grade, value: f32 },
    #[error("{grade:?} must allow at least one daily delivery and one route")]
    EmptyAllowance { grade: Grade },
    #[error("{grade:?} grants fewer benefits than the grade below it")]
    NotMonotonic { grade: Grade },
}

impl ProgressionPolicy {
    pub fn standard() -> Self {
        Self {
            newcomer: GradeBenefits {
                rate_bonus_percent: 0.0,
                max_daily_deliveries: 3,
                max_routes: 1,
                priority_class: PriorityClass::Standard,
            },
            regular: GradeBenefits {
                rate_bonus_percent: 3.0,
                max_daily_deliveries: 5,
                max_routes: 2,
                priority_class: PriorityClass::Standard,
            },
            expert: GradeBenefits {
                rate_bonus_percent: 5.0,
                max_daily_deliveries: 8,
                max_routes: 3,
                priority_class: PriorityClass::Preferred,
            },
            master: GradeBenefits {
                rate_bonus_percent: 10.0,
                max_daily_deliveries: 12,
                max_routes: 5,
                priority_class: PriorityClass::Top,
            },
        }
    }

    pub fn benefits(&self, grade: Grade) -> &GradeBenefits {
        match grade {
            Grade::Newcomer => &self.newcomer,
            Grade::Regular => &self.regular,
            Grade::Expert => &self.expert,
            Grade::Master => &self.master,
        }
    }

    /// Reject tables where a higher grade would lose benefits.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let ladder = [
            (Grade::Newcomer, &self.newcomer),
            (Grade::Regular, &self.regular),
            (Grade::Expert, &self.expert),
            (Grade::Master, &self.master),
        ];

        for (grade, benefits) in ladder {
            if !(0.0..=100.0).contains(&benefits.rate_bonus_percent) {
                return Err(PolicyError::RateBonusOutOfRange {
                    grade,
                    value: benefits.rate_bonus_percent,
                });
            }
            if benefits.max_daily_deliveries == 0 || benefits.max_routes == 0 {
                return Err(PolicyError::EmptyAllowance { grade });
            }
        }

        for pair in ladder.windows(2) {
            let (_, lower) = pair[0];
            let (grade, higher) = pair[1];
            if higher.rate_bonus_percent < lower.rate_bonus_percent
                || higher.max_daily_deliveries < lower.max_daily_deliveries
                || higher.max_routes < lower.max_routes
                || higher.priority_class < lower.priority_class
            {
                return Err(PolicyError::NotMonotonic { grade });
            }
        }

        Ok(())
    }
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
