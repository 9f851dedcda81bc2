//! Line classifier and subject-line grammar.
//!
//! Extracted transcript text has no reliable structure, so the parser works
//! line by line with a cursor on the most recent area header:
//!
//! ```text
//! Informatik-Grundlagen            ← area header (exact match, trimmed)
//! INF101 Intro to CS 8 1,7         ← subject: CODE NAME… LP GRADE
//! MTH202 Linear Algebra 6 --       ← subject without grade
//! Seite 1 von 3                    ← ignored
//! ```
//!
//! Lines that cannot be used are not errors: they come back as
//! [`SkippedLine`]s tagged with a [`SkipReason`]. Only a subject line whose
//! credit or grade field is malformed aborts the parse.

use crate::area::Area;
use crate::config::Curriculum;
use crate::error::{LedgerError, SkipReason};
use crate::subject::Subject;
use crate::transcript::Transcript;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// Marker used in place of a grade for ungraded or in-progress subjects.
pub const NO_GRADE: &str = "--";

static RE_GRADE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").unwrap());

/// What a single line looks like to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// The trimmed line is a configured area header.
    AreaHeader { name: &'a str, lp: u32 },
    /// The line, as given, starts with a configured subject prefix.
    Subject,
    /// Anything else.
    Other,
}

/// A line that did not contribute to the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number in the input.
    pub line_no: usize,
    pub line: String,
    pub reason: SkipReason,
}

/// Result of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub transcript: Transcript,
    pub skipped: Vec<SkippedLine>,
}

impl ParseOutcome {
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Classify one line against the curriculum.
///
/// Headers are matched after trimming. Subject prefixes must start the line
/// itself: an indented `" INF…"` line is not a subject.
pub fn classify_line<'a>(line: &str, curriculum: &'a Curriculum) -> LineKind<'a> {
    let trimmed = line.trim();
    if let Some(rule) = curriculum.areas.iter().find(|a| a.name == trimmed) {
        return LineKind::AreaHeader {
            name: &rule.name,
            lp: rule.lp,
        };
    }
    if curriculum.is_subject_code(line) {
        return LineKind::Subject;
    }
    LineKind::Other
}

/// Parse extracted text into a transcript.
pub fn parse_text(text: &str, curriculum: &Curriculum) -> Result<ParseOutcome, LedgerError> {
    parse_lines(text.lines(), curriculum)
}

/// Parse a sequence of lines into a transcript.
///
/// # Errors
/// [`LedgerError::Grammar`] for the first subject line whose fields cannot be
/// read. No partial transcript is returned in that case.
pub fn parse_lines<I, S>(lines: I, curriculum: &Curriculum) -> Result<ParseOutcome, LedgerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ParseOutcome::default();
    let mut current: Option<usize> = None;

    for (i, line) in lines.into_iter().enumerate() {
        let line_no = i + 1;
        let line = line.as_ref();

        match classify_line(line, curriculum) {
            LineKind::AreaHeader { name, lp } => {
                let idx = outcome.transcript.insert(Area::new(name, lp));
                debug!(line_no, area = name, lp, "Area header");
                current = Some(idx);
            }
            LineKind::Subject => match current.and_then(|idx| outcome.transcript.area_at_mut(idx)) {
                Some(area) => {
                    let subject = parse_subject_line(line, area.name(), line_no)?;
                    trace!(line_no, subject = %subject, "Subject");
                    area.push_subject(subject);
                }
                None => {
                    warn!(line_no, line, "Subject line before any area header, skipped");
                    outcome.skipped.push(SkippedLine {
                        line_no,
                        line: line.to_string(),
                        reason: SkipReason::OrphanSubject,
                    });
                }
            },
            LineKind::Other => {
                trace!(line_no, line, "Ignored line");
                outcome.skipped.push(SkippedLine {
                    line_no,
                    line: line.to_string(),
                    reason: SkipReason::Unrecognized,
                });
            }
        }
    }

    info!(
        areas = outcome.transcript.len(),
        subjects = outcome.transcript.subjects().count(),
        orphans = outcome.skipped_count(SkipReason::OrphanSubject),
        "Parsed transcript"
    );
    Ok(outcome)
}

/// Parse `CODE NAME… LP GRADE` into a [`Subject`] owned by `area`.
pub fn parse_subject_line(line: &str, area: &str, line_no: usize) -> Result<Subject, LedgerError> {
    let grammar = |token: &str, detail: &str| LedgerError::Grammar {
        line_no,
        line: line.trim().to_string(),
        token: token.to_string(),
        detail: detail.to_string(),
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(grammar(
            line.trim(),
            "expected at least a code, credit points and a grade",
        ));
    }

    let grade_token = tokens[tokens.len() - 1];
    let lp_token = tokens[tokens.len() - 2];

    let lp: u32 = lp_token
        .parse()
        .map_err(|_| grammar(lp_token, "credit points are not a whole number"))?;
    let grade = parse_grade(grade_token)
        .ok_or_else(|| grammar(grade_token, "grade is neither '--' nor a decimal"))?;

    let short = tokens[0];
    let name = tokens[1..tokens.len() - 2].join(" ");
    Ok(Subject::new(area, short, name, lp, grade))
}

/// `--` → `Some(None)`, `1,7` → `Some(Some(1.7))`, anything else → `None`.
fn parse_grade(token: &str) -> Option<Option<f64>> {
    if token == NO_GRADE {
        return Some(None);
    }
    if !RE_GRADE.is_match(token) {
        return None;
    }
    token.replace(',', ".").parse::<f64>().ok().map(Some)
}

/// Render a subject back into the line form the parser reads.
pub fn format_subject_line(subject: &Subject) -> String {
    let grade = match subject.grade {
        Some(g) => format!("{g}").replace('.', ","),
        None => NO_GRADE.to_string(),
    };
    let mut parts = vec![subject.short.as_str()];
    if !subject.name.is_empty() {
        parts.push(subject.name.as_str());
    }
    format!("{} {} {}", parts.join(" "), subject.lp(), grade)
}

/// Render a whole transcript: each area header followed by its subject lines.
pub fn format_transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    for area in transcript {
        out.push_str(area.name());
        out.push('\n');
        for subject in area.subjects() {
            out.push_str(&format_subject_line(subject));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Curriculum {
        Curriculum::default()
    }

    #[test]
    fn parses_header_and_two_subjects() {
        let lines = [
            "Informatik-Grundlagen",
            "INF101 Intro to CS 8 1,7",
            "MTH202 Linear Algebra 6 --",
        ];
        let outcome = parse_lines(lines, &standard()).unwrap();
        let t = &outcome.transcript;
        assert_eq!(t.len(), 1);
        let area = t.get("Informatik-Grundlagen").unwrap();
        assert_eq!(area.lp(), 46);
        let subjects = area.subjects();
        assert_eq!(subjects.len(), 2);

        assert_eq!(subjects[0].short, "INF101");
        assert_eq!(subjects[0].name, "Intro to CS");
        assert_eq!(subjects[0].lp(), 8);
        assert_eq!(subjects[0].grade, Some(1.7));

        assert_eq!(subjects[1].short, "MTH202");
        assert_eq!(subjects[1].name, "Linear Algebra");
        assert_eq!(subjects[1].grade, None);
        assert_eq!(subjects[1].lp(), 6);
        assert_eq!(subjects[1].lp_evaluate(), 6);
        assert_eq!(subjects[1].area, "Informatik-Grundlagen");
    }

    #[test]
    fn malformed_grade_aborts() {
        let lines = ["Informatik-Grundlagen", "INF101 Intro 8 abc"];
        let err = parse_lines(lines, &standard()).unwrap_err();
        match err {
            LedgerError::Grammar { line_no, token, .. } => {
                assert_eq!(line_no, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("expected Grammar, got {other:?}"),
        }
    }

    #[test]
    fn malformed_credit_aborts() {
        let err = parse_lines(["Bachelorarbeit", "INF900 Thesis x 2,0"], &standard()).unwrap_err();
        assert!(matches!(err, LedgerError::Grammar { ref token, .. } if token == "x"));
    }

    #[test]
    fn too_few_tokens_aborts() {
        let err = parse_lines(["Bachelorarbeit", "INF900 2,0"], &standard()).unwrap_err();
        assert!(matches!(err, LedgerError::Grammar { .. }));
    }

    #[test]
    fn orphan_subject_is_skipped() {
        let lines = [
            "INF100 Too Early 5 1,0",
            "Mathematische Grundlagen",
            "MTH1 Analysis 9 2,3",
        ];
        let outcome = parse_lines(lines, &standard()).unwrap();
        assert_eq!(outcome.skipped_count(SkipReason::OrphanSubject), 1);
        assert_eq!(outcome.skipped[0].line_no, 1);
        assert_eq!(outcome.transcript.subjects().count(), 1);
    }

    #[test]
    fn noise_lines_are_counted() {
        let lines = [
            "Leistungsübersicht",
            "",
            "Physikalische Grundlagen",
            "Seite 1 von 2",
            "PHM1 Physik I 8 1,3",
        ];
        let outcome = parse_lines(lines, &standard()).unwrap();
        assert_eq!(outcome.skipped_count(SkipReason::Unrecognized), 3);
        assert_eq!(outcome.skipped_count(SkipReason::OrphanSubject), 0);
    }

    #[test]
    fn header_matching_trims_whitespace() {
        let outcome =
            parse_lines(["  Bachelorarbeit \r", "INF999 Thesis 12 1,0"], &standard()).unwrap();
        assert_eq!(outcome.transcript.get("Bachelorarbeit").unwrap().subjects().len(), 1);
    }

    #[test]
    fn repeated_header_continues_existing_area() {
        let lines = [
            "Mathematische Grundlagen",
            "MTH1 Analysis I 9 2,3",
            "Seite 2",
            "Mathematische Grundlagen",
            "MTH2 Analysis II 9 1,7",
        ];
        let outcome = parse_lines(lines, &standard()).unwrap();
        assert_eq!(outcome.transcript.len(), 1);
        assert_eq!(
            outcome.transcript.get("Mathematische Grundlagen").unwrap().subjects().len(),
            2
        );
    }

    #[test]
    fn grade_accepts_dot_and_whole_numbers() {
        assert_eq!(parse_grade("1.3"), Some(Some(1.3)));
        assert_eq!(parse_grade("4"), Some(Some(4.0)));
        assert_eq!(parse_grade("--"), Some(None));
        assert_eq!(parse_grade("-1"), None);
        assert_eq!(parse_grade("1,"), None);
        assert_eq!(parse_grade("nan"), None);
    }

    #[test]
    fn empty_input_gives_empty_transcript() {
        let outcome = parse_text("", &standard()).unwrap();
        assert!(outcome.transcript.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn classify() {
        let c = standard();
        assert!(matches!(
            classify_line("Bachelorarbeit", &c),
            LineKind::AreaHeader { lp: 12, .. }
        ));
        assert_eq!(classify_line("INF1 X 5 --", &c), LineKind::Subject);
        assert_eq!(classify_line("Note", &c), LineKind::Other);
    }

    #[test]
    fn indented_subject_line_is_not_a_subject() {
        let c = standard();
        assert_eq!(classify_line(" INF1 X 5 1,0", &c), LineKind::Other);
        assert_eq!(classify_line("\tMTH1 X 5 1,0", &c), LineKind::Other);

        let outcome = parse_lines(["Bachelorarbeit", "  INF999 Thesis 12 1,0"], &c).unwrap();
        assert!(outcome.transcript.get("Bachelorarbeit").unwrap().subjects().is_empty());
        assert_eq!(outcome.skipped_count(SkipReason::Unrecognized), 1);
    }

    #[test]
    fn subject_without_name() {
        let s = parse_subject_line("INF7 5 2,0", "A", 1).unwrap();
        assert_eq!(s.name, "");
        assert_eq!(format_subject_line(&s), "INF7 5 2");
    }

    #[test]
    fn format_then_reparse_preserves_subjects() {
        let c = Curriculum::builder()
            .clear_areas()
            .area("Core", 40)
            .area("Electives", 20)
            .prefixes(["CS", "MA"])
            .build()
            .unwrap();

        let mut original = Transcript::new();
        let specs: [(&str, &[(&str, &str, u32, Option<f64>)]); 2] = [
            (
                "Core",
                &[
                    ("CS101", "Programming  I", 8, Some(1.3)),
                    ("CS102", "Data Structures", 6, Some(2.0)),
                    ("MA100", "Discrete Math", 5, None),
                ],
            ),
            (
                "Electives",
                &[
                    ("CS300", "Compilers", 6, Some(3.7)),
                    ("MA310", "Numerics 2", 4, Some(1.0)),
                ],
            ),
        ];
        for (area_name, subjects) in specs {
            let lp = c.ceiling(area_name).unwrap();
            let idx = original.insert(Area::new(area_name, lp));
            let area = original.area_at_mut(idx).unwrap();
            for (short, name, lp, grade) in subjects {
                // Names are normalised to single spaces on the way in.
                let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
                area.push_subject(Subject::new(area_name, *short, name, *lp, *grade));
            }
        }

        let text = format_transcript(&original);
        let reparsed = parse_text(&text, &c).unwrap().transcript;

        let tuples = |t: &Transcript| -> Vec<(String, String, u32, Option<f64>)> {
            t.subjects()
                .map(|s| (s.short.clone(), s.name.clone(), s.lp(), s.grade))
                .collect()
        };
        assert_eq!(tuples(&original), tuples(&reparsed));
        assert_eq!(reparsed.areas().len(), 2);
    }
}
