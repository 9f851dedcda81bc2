//! Credit-weighted average over a normalized transcript.

use crate::error::LedgerError;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Un-divided totals of a transcript: `Σ lp_evaluate` and `Σ lp_evaluate·grade`.
///
/// Kept separate so further units can be folded in before dividing, see
/// [`calculate_average_with_addition`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeTotals {
    pub weighted_grade: f64,
    pub total_lp: u64,
}

impl GradeTotals {
    /// `weighted_grade / total_lp`. Only constructed with `total_lp > 0`.
    pub fn average(&self) -> f64 {
        self.weighted_grade / self.total_lp as f64
    }
}

/// Normalize every area, then fold every graded subject into [`GradeTotals`].
///
/// # Errors
/// [`LedgerError::ZeroCredit`] when no graded credit survives normalization.
pub fn calculate_average(transcript: &mut Transcript) -> Result<GradeTotals, LedgerError> {
    let mut total_lp: u64 = 0;
    let mut weighted_grade = 0.0;

    for area in transcript.areas_mut() {
        let removed = area.normalize_lp();
        if removed > 0 {
            debug!(area = area.name(), removed, ceiling = area.lp(), "Area over ceiling");
        }
        for subject in area.subjects() {
            if let Some(grade) = subject.grade {
                total_lp += u64::from(subject.lp_evaluate());
                weighted_grade += f64::from(subject.lp_evaluate()) * grade;
            }
        }
    }

    if total_lp == 0 {
        return Err(LedgerError::ZeroCredit);
    }

    let totals = GradeTotals {
        weighted_grade,
        total_lp,
    };
    info!(total_lp, weighted_grade, average = totals.average(), "Calculated average");
    Ok(totals)
}

/// Average after hypothetically adding `extra_credit` points graded `extra_grade`.
///
/// # Errors
/// [`LedgerError::ZeroCredit`] when both `total_lp` and `extra_credit` are 0.
pub fn calculate_average_with_addition(
    weighted_grade: f64,
    total_lp: u64,
    extra_credit: u32,
    extra_grade: f64,
) -> Result<f64, LedgerError> {
    let lp = total_lp + u64::from(extra_credit);
    if lp == 0 {
        return Err(LedgerError::ZeroCredit);
    }
    Ok((weighted_grade + f64::from(extra_credit) * extra_grade) / lp as f64)
}
