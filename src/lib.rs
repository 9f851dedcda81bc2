//! # transcript-gpa
//!
//! Compute a credit-weighted grade average from a university transcript.
//!
//! A transcript lists subjects grouped under area headers. Each area of the
//! curriculum counts only up to a fixed number of credit points (LP); credit
//! beyond that ceiling is discarded from the worst-graded subjects first, so
//! the average rewards the best results inside every area.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / text
//!  │
//!  ├─ 1. Input      resolve the file and sniff `%PDF`
//!  ├─ 2. Extract    pdfium text layer, page by page, then cleanup
//!  ├─ 3. Parse      area headers + `CODE NAME… LP GRADE` lines
//!  ├─ 4. Tracks     optionally exclude one of three elective tracks
//!  ├─ 5. Normalize  cap every area at its LP ceiling
//!  ├─ 6. Average    Σ(lp·grade) / Σ lp, plus a thesis projection
//!  └─ 7. Report     CSV or JSON rows per area and subject
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transcript_gpa::{evaluate_text, Curriculum, KeepAllTracks};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let text = std::fs::read_to_string("transcript.txt")?;
//!     let eval = evaluate_text(&text, &Curriculum::default(), &mut KeepAllTracks)?;
//!     match eval.average() {
//!         Some(avg) => println!("Average: {avg:.5}"),
//!         None => eprintln!("no graded credit"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `transcript-gpa` binary (clap + anyhow + tracing-subscriber + indicatif + tokio) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! transcript-gpa = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod area;
pub mod average;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod subject;
pub mod tracks;
pub mod transcript;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use area::Area;
pub use average::{calculate_average, calculate_average_with_addition, GradeTotals};
pub use config::{AreaRule, Curriculum, CurriculumBuilder, ThesisProjection, TrackRule};
pub use error::{LedgerError, SkipReason};
pub use evaluate::{evaluate_file, evaluate_lines, evaluate_text, Evaluation, Projection};
pub use parser::{
    classify_line, format_subject_line, format_transcript, parse_lines, parse_subject_line,
    parse_text, LineKind, ParseOutcome, SkippedLine,
};
pub use pipeline::extract::{extract_text, ExtractOptions};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{
    write_report, AreaRow, AreaSection, CsvRenderer, JsonRenderer, Report, ReportFormat,
    ReportRenderer, SubjectRow, Summary,
};
pub use subject::Subject;
pub use tracks::{
    apply_track_selection, interpret_choice, track_candidates, ExcludeTrack, KeepAllTracks,
    TrackCandidate, TrackChoice, TrackSelector,
};
pub use transcript::Transcript;
