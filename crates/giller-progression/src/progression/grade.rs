use serde::Serialize;

use super::domain::Grade;

struct GradeBand {
    grade: Grade,
    lower: u32,
    upper: Option<u32>,
}

// Contiguous, inclusive bands; the last one is open-ended.
static BANDS: [GradeBand; 4] = [
    GradeBand {
        grade: Grade::Newcomer,
        lower: 0,
        upper: Some(10),
    },
    GradeBand {
        grade: Grade::Regular,
        lower: 11,
        upper: Some(30),
    },
    GradeBand {
        grade: Grade::Expert,
        lower: 31,
        upper: Some(50),
    },
    GradeBand {
        grade: Grade::Master,
        lower: 51,
        upper: None,
    },
];

fn band_for(completed_deliveries: u32) -> &'static GradeBand {
    BANDS
        .iter()
        .rev()
        .find(|band| completed_deliveries >= band.lower)
        .unwrap_or(&BANDS[0])
}

/// Position of a giller within their grade band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeProgress {
    pub grade: Grade,
    pub progress_fraction: f64,
    pub deliveries_until_next: Option<u32>,
}

pub fn grade_of(completed_deliveries: u32) -> Grade {
    band_for(completed_deliveries).grade
}

/// Fraction of the current band already covered; `1.0` once the top grade is reached.
pub fn progress_fraction(completed_deliveries: u32) -> f64 {
    let band = band_for(completed_deliveries);
    match band.upper {
        Some(upper) if upper > band.lower => {
            let covered = f64::from(completed_deliveries - band.lower);
            let span = f64::from(upper - band.lower);
            (covered / span).clamp(0.0, 1.0)
        }
        _ => 1.0,
    }
}

pub fn deliveries_until_next(completed_deliveries: u32) -> Option<u32> {
    band_for(completed_deliveries)
        .upper
        .map(|upper| upper + 1 - completed_deliveries)
}

pub fn progress_of(completed_deliveries: u32) -> GradeProgress {
    GradeProgress {
        grade: grade_of(completed_deliveries),
        progress_fraction: progress_fraction(completed_deliveries),
        deliveries_until_next: deliveries_until_next(completed_deliveries),
    }
}
