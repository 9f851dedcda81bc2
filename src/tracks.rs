//! Elective track exclusion.
//!
//! Some curricula offer several specialization tracks of which only a fixed
//! number count. When exactly the configured number of candidate tracks is on
//! the transcript, a [`TrackSelector`] may pick one to drop before the average
//! is calculated. The selector is injected, so the pipeline itself never
//! touches the console:
//!
//! - [`KeepAllTracks`] — never excludes anything;
//! - [`ExcludeTrack`] — excludes a fixed label, e.g. from a CLI flag;
//! - the `transcript-gpa` binary ships an interactive console selector.

use crate::config::TrackRule;
use crate::transcript::Transcript;
use serde::Serialize;
use tracing::{info, warn};

/// One elective track offered for exclusion.
///
/// Figures are computed on nominal credit because normalization has not run yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackCandidate {
    /// Short label the user picks, the marker without its dot (`"2."` → `"2"`).
    pub label: String,
    /// Area name.
    pub name: String,
    /// Nominal credit of graded subjects.
    pub total_lp: u64,
    /// Area ceiling.
    pub ceiling: u32,
    /// Average over nominal credit, `None` when nothing is graded.
    pub average: Option<f64>,
}

/// What the selector decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackChoice {
    /// Keep every track.
    Keep,
    /// Exclude the candidate with this label.
    Exclude(String),
}

/// Decides which elective track, if any, to leave out of the average.
pub trait TrackSelector {
    /// Called at most once, with the candidates in transcript order.
    fn select(&mut self, candidates: &[TrackCandidate]) -> TrackChoice;
}

impl<F> TrackSelector for F
where
    F: FnMut(&[TrackCandidate]) -> TrackChoice,
{
    fn select(&mut self, candidates: &[TrackCandidate]) -> TrackChoice {
        self(candidates)
    }
}

/// Selector that never excludes a track.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAllTracks;

impl TrackSelector for KeepAllTracks {
    fn select(&mut self, _candidates: &[TrackCandidate]) -> TrackChoice {
        TrackChoice::Keep
    }
}

/// Selector that always excludes the track with the given label.
#[derive(Debug, Clone)]
pub struct ExcludeTrack(pub String);

impl TrackSelector for ExcludeTrack {
    fn select(&mut self, _candidates: &[TrackCandidate]) -> TrackChoice {
        TrackChoice::Exclude(self.0.clone())
    }
}

/// Turn a typed answer into a choice.
///
/// A candidate label (surrounding whitespace ignored) excludes that track.
/// `E` / `exit` in any case, an empty answer and anything unrecognised keep
/// every track.
pub fn interpret_choice(input: &str, candidates: &[TrackCandidate]) -> TrackChoice {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("e") || input.eq_ignore_ascii_case("exit") {
        return TrackChoice::Keep;
    }
    match candidates.iter().find(|c| c.label == input) {
        Some(c) => TrackChoice::Exclude(c.label.clone()),
        None => {
            warn!(input, "Not a track label, keeping all tracks");
            TrackChoice::Keep
        }
    }
}

/// Candidate tracks on the transcript, in transcript order.
pub fn track_candidates(transcript: &Transcript, rule: &TrackRule) -> Vec<TrackCandidate> {
    transcript
        .areas()
        .iter()
        .filter_map(|area| {
            let marker = rule.markers.iter().find(|m| area.name().contains(m.as_str()))?;
            Some(TrackCandidate {
                label: marker.trim_end_matches('.').trim().to_string(),
                name: area.name().to_string(),
                total_lp: area.nominal_lp(),
                ceiling: area.lp(),
                average: area.nominal_average(),
            })
        })
        .collect()
}

/// Ask `selector` which track to drop and zero that area's counted credit.
///
/// The selector is only consulted when exactly `rule.candidates` tracks are
/// present. Returns the name of the excluded area, if any. An unknown label
/// keeps every track.
pub fn apply_track_selection(
    transcript: &mut Transcript,
    rule: &TrackRule,
    selector: &mut dyn TrackSelector,
) -> Option<String> {
    let candidates = track_candidates(transcript, rule);
    if candidates.len() != rule.candidates {
        info!(
            found = candidates.len(),
            required = rule.candidates,
            "Track exclusion not applicable"
        );
        return None;
    }

    let label = match selector.select(&candidates) {
        TrackChoice::Keep => {
            info!("No elective track excluded");
            return None;
        }
        TrackChoice::Exclude(label) => label,
    };

    let Some(candidate) = candidates.iter().find(|c| c.label == label.trim()) else {
        warn!(label = %label, "Unknown track label, no track excluded");
        return None;
    };

    let area = transcript.get_mut(&candidate.name)?;
    area.exclude();
    info!(area = %candidate.name, "Excluded elective track");
    Some(candidate.name.clone())
}
