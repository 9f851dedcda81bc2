//! End-to-end evaluation entry points.
//!
//! The order of the steps is fixed: normalization reads `lp_evaluate`, which
//! track exclusion may already have zeroed.
//!
//! ```text
//! text ─▶ parse ─▶ track exclusion ─▶ normalize + sum ─▶ thesis projection
//!         (fatal     (optional,         (ZeroCredit is
//!          on error)  injected)          recoverable)
//! ```

use crate::average::{calculate_average, calculate_average_with_addition, GradeTotals};
use crate::config::{Curriculum, ThesisProjection};
use crate::error::{LedgerError, SkipReason};
use crate::parser::{self, SkippedLine};
use crate::pipeline::extract::{self, ExtractOptions};
use crate::tracks::{apply_track_selection, TrackSelector};
use crate::transcript::Transcript;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// The average with a hypothetical thesis folded in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub thesis: ThesisProjection,
    pub average: f64,
}

/// Everything one run produces.
#[derive(Debug)]
pub struct Evaluation {
    /// Areas after track exclusion and normalization.
    pub transcript: Transcript,
    /// Lines that did not contribute.
    pub skipped: Vec<SkippedLine>,
    /// Name of the elective track left out, if any.
    pub excluded_track: Option<String>,
    /// Weighted totals, or the reason there are none.
    pub totals: Result<GradeTotals, LedgerError>,
    /// Average including the configured thesis, when totals exist.
    pub projection: Option<Projection>,
}

impl Evaluation {
    pub fn average(&self) -> Option<f64> {
        self.totals.as_ref().ok().map(GradeTotals::average)
    }

    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Evaluate already extracted transcript text.
///
/// # Errors
/// Only parse failures are returned as `Err`. A transcript without countable
/// credit still yields an [`Evaluation`] whose `totals` holds
/// [`LedgerError::ZeroCredit`].
pub fn evaluate_text(
    text: &str,
    curriculum: &Curriculum,
    selector: &mut dyn TrackSelector,
) -> Result<Evaluation, LedgerError> {
    evaluate_lines(text.lines(), curriculum, selector)
}

/// Evaluate a sequence of transcript lines.
pub fn evaluate_lines<I, S>(
    lines: I,
    curriculum: &Curriculum,
    selector: &mut dyn TrackSelector,
) -> Result<Evaluation, LedgerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start = Instant::now();

    // ── Step 1: Parse ────────────────────────────────────────────────────
    let outcome = parser::parse_lines(lines, curriculum)?;
    let mut transcript = outcome.transcript;

    // ── Step 2: Elective track exclusion ─────────────────────────────────
    let excluded_track = apply_track_selection(&mut transcript, &curriculum.tracks, selector);

    // ── Step 3: Normalize and sum ────────────────────────────────────────
    let totals = calculate_average(&mut transcript);
    if let Err(ref e) = totals {
        warn!("Average not available: {}", e);
    }

    // ── Step 4: Thesis projection ────────────────────────────────────────
    let projection = match totals {
        Ok(ref t) => calculate_average_with_addition(
            t.weighted_grade,
            t.total_lp,
            curriculum.thesis.lp,
            curriculum.thesis.grade,
        )
        .ok()
        .map(|average| Projection {
            thesis: curriculum.thesis,
            average,
        }),
        Err(_) => None,
    };

    info!(
        "Evaluation complete: {} areas, {} subjects, {}ms",
        transcript.len(),
        transcript.subjects().count(),
        start.elapsed().as_millis()
    );

    Ok(Evaluation {
        transcript,
        skipped: outcome.skipped,
        excluded_track,
        totals,
        projection,
    })
}

/// Extract a transcript file (PDF or text) and evaluate it.
pub fn evaluate_file(
    path: impl AsRef<Path>,
    curriculum: &Curriculum,
    options: &ExtractOptions,
    selector: &mut dyn TrackSelector,
) -> Result<Evaluation, LedgerError> {
    let text = extract::extract_text(path, options)?;
    evaluate_text(&text, curriculum, selector)
}
