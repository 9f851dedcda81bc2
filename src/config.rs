//! Curriculum configuration: area ceilings, subject-code prefixes, elective
//! track rule and thesis projection.
//!
//! All institution-specific tables live in one [`Curriculum`] value that is
//! passed into the parser and calculator at call time. Build one with
//! [`Curriculum::builder()`], load one from JSON with
//! [`Curriculum::from_json_file`], or start from [`Curriculum::default()`],
//! which carries the standard bachelor table.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of the area-ceiling table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRule {
    /// Exact header text as it appears on its own line in the transcript.
    pub name: String,
    /// Credit points the area may contribute at most.
    pub lp: u32,
}

impl AreaRule {
    pub fn new(name: impl Into<String>, lp: u32) -> Self {
        Self {
            name: name.into(),
            lp,
        }
    }
}

/// Which areas are mutually exclusive elective tracks.
///
/// Areas whose name contains one of `markers` are candidates. The selector is
/// only consulted when exactly `candidates` of them are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRule {
    /// Ordinal substrings identifying a track, e.g. `"2."`.
    pub markers: Vec<String>,
    /// Number of candidate tracks that must be present before one may be dropped.
    pub candidates: usize,
}

impl Default for TrackRule {
    fn default() -> Self {
        Self {
            markers: vec!["2.".into(), "3.".into(), "4.".into()],
            candidates: 3,
        }
    }
}

/// A hypothetical final unit used for "what-if" projections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThesisProjection {
    /// Credit points of the thesis. Default: 12.
    pub lp: u32,
    /// Assumed thesis grade. Default: 2.3.
    pub grade: f64,
}

impl Default for ThesisProjection {
    fn default() -> Self {
        Self { lp: 12, grade: 2.3 }
    }
}

/// Configuration for parsing and evaluating a transcript.
///
/// # Example
/// ```rust
/// use transcript_gpa::Curriculum;
///
/// let curriculum = Curriculum::builder()
///     .clear_areas()
///     .area("Mathematical Foundations", 30)
///     .prefixes(["MTH"])
///     .build()
///     .unwrap();
/// assert_eq!(curriculum.ceiling("Mathematical Foundations"), Some(30));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    /// Area header → credit ceiling.
    pub areas: Vec<AreaRule>,

    /// Subject short-code prefixes; a line starting with one is a subject line.
    pub prefixes: Vec<String>,

    /// Elective track rule. Default: markers `2.`, `3.`, `4.`, three candidates.
    #[serde(default)]
    pub tracks: TrackRule,

    /// Thesis projection printed next to the average. Default: 12 LP at 2.3.
    #[serde(default)]
    pub thesis: ThesisProjection,
}

impl Default for Curriculum {
    fn default() -> Self {
        Self {
            areas: vec![
                AreaRule::new("Informatik-Grundlagen", 46),
                AreaRule::new("Ingenieurtechnische Grundlagen", 35),
                AreaRule::new("Mathematische Grundlagen", 30),
                AreaRule::new("Physikalische Grundlagen", 13),
                AreaRule::new("1. Vertiefungsbereich Software and Systems Engineering", 16),
                AreaRule::new(
                    "2. Vertiefungsbereich Ressourceneffizienz und Materialwissenschaften",
                    12,
                ),
                AreaRule::new("3. Vertiefungsbereich Mechatronik und Robotik (12 LP)", 12),
                AreaRule::new(
                    "4. Vertiefungsbereich Technische Informatik, Adaptive Systeme",
                    12,
                ),
                AreaRule::new("Bachelorarbeit", 12),
            ],
            prefixes: vec!["INF".into(), "MTH".into(), "PHM".into()],
            tracks: TrackRule::default(),
            thesis: ThesisProjection::default(),
        }
    }
}

impl Curriculum {
    /// Create a new builder seeded with the default curriculum.
    pub fn builder() -> CurriculumBuilder {
        CurriculumBuilder {
            curriculum: Self::default(),
        }
    }

    /// Reopen a (possibly file-loaded) curriculum for further overrides.
    pub fn into_builder(self) -> CurriculumBuilder {
        CurriculumBuilder { curriculum: self }
    }

    /// Ceiling for an exact area header, if the header is known.
    pub fn ceiling(&self, header: &str) -> Option<u32> {
        self.areas.iter().find(|a| a.name == header).map(|a| a.lp)
    }

    /// True when `line` starts with one of the configured subject prefixes.
    pub fn is_subject_code(&self, line: &str) -> bool {
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    /// Load and validate a curriculum from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| LedgerError::ConfigReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_json_str(&raw).map_err(|e| match e {
            LedgerError::InvalidConfig(detail) => LedgerError::ConfigReadFailed {
                path: path.to_path_buf(),
                detail,
            },
            other => other,
        })
    }

    /// Parse and validate a curriculum from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, LedgerError> {
        let curriculum: Curriculum =
            serde_json::from_str(raw).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.areas.is_empty() {
            return Err(LedgerError::InvalidConfig(
                "at least one area is required".into(),
            ));
        }
        if let Some(rule) = self.areas.iter().find(|a| a.name.trim().is_empty()) {
            return Err(LedgerError::InvalidConfig(format!(
                "area names must not be empty (ceiling {})",
                rule.lp
            )));
        }
        for (i, rule) in self.areas.iter().enumerate() {
            if self.areas[..i].iter().any(|a| a.name == rule.name) {
                return Err(LedgerError::InvalidConfig(format!(
                    "area '{}' is listed twice",
                    rule.name
                )));
            }
        }
        if self.prefixes.is_empty() || self.prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(LedgerError::InvalidConfig(
                "at least one non-empty subject prefix is required".into(),
            ));
        }
        if self.tracks.candidates < 2 {
            return Err(LedgerError::InvalidConfig(format!(
                "track rule needs at least 2 candidates, got {}",
                self.tracks.candidates
            )));
        }
        if !self.thesis.grade.is_finite() || self.thesis.grade <= 0.0 {
            return Err(LedgerError::InvalidConfig(format!(
                "thesis grade must be a positive number, got {}",
                self.thesis.grade
            )));
        }
        Ok(())
    }
}

/// Builder for [`Curriculum`].
#[derive(Debug)]
pub struct CurriculumBuilder {
    curriculum: Curriculum,
}

impl CurriculumBuilder {
    /// Drop the default area table before adding custom areas.
    pub fn clear_areas(mut self) -> Self {
        self.curriculum.areas.clear();
        self
    }

    /// Add an area, or replace the ceiling of an area with the same name.
    pub fn area(mut self, name: impl Into<String>, lp: u32) -> Self {
        let name = name.into();
        match self.curriculum.areas.iter_mut().find(|a| a.name == name) {
            Some(rule) => rule.lp = lp,
            None => self.curriculum.areas.push(AreaRule { name, lp }),
        }
        self
    }

    pub fn prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.curriculum.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn tracks(mut self, rule: TrackRule) -> Self {
        self.curriculum.tracks = rule;
        self
    }

    pub fn thesis_lp(mut self, lp: u32) -> Self {
        self.curriculum.thesis.lp = lp;
        self
    }

    pub fn thesis_grade(mut self, grade: f64) -> Self {
        self.curriculum.thesis.grade = grade;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<Curriculum, LedgerError> {
        self.curriculum.validate()?;
        Ok(self.curriculum)
    }
}
