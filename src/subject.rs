//! A single course record on the transcript.

use serde::Serialize;
use std::fmt;

/// One graded or ungraded course inside an [`crate::area::Area`].
///
/// `lp` is fixed at construction. `lp_evaluate` starts equal to it and is
/// only ever lowered by the owning area, so it stays within `0..=lp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    /// Name of the owning area.
    pub area: String,
    /// Short code, e.g. `INF101`.
    pub short: String,
    /// Display name.
    pub name: String,
    /// Nominal credit points.
    pub(crate) lp: u32,
    /// Credit points counted toward the weighted average.
    pub(crate) lp_evaluate: u32,
    /// Numeric grade; `None` means not graded yet or an ungraded pass.
    pub grade: Option<f64>,
}

impl Subject {
    pub fn new(
        area: impl Into<String>,
        short: impl Into<String>,
        name: impl Into<String>,
        lp: u32,
        grade: Option<f64>,
    ) -> Self {
        Self {
            area: area.into(),
            short: short.into(),
            name: name.into(),
            lp,
            lp_evaluate: lp,
            grade,
        }
    }

    /// Nominal credit points.
    pub fn lp(&self) -> u32 {
        self.lp
    }

    /// Credit points currently counted toward the average.
    pub fn lp_evaluate(&self) -> u32 {
        self.lp_evaluate
    }

    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }

    /// `lp_evaluate * grade` for graded subjects.
    pub fn weighted_grade(&self) -> Option<f64> {
        self.grade.map(|g| f64::from(self.lp_evaluate) * g)
    }

    /// Lower the counted credit by up to `amount`; returns what was removed.
    pub(crate) fn discard_lp(&mut self, amount: u64) -> u32 {
        let removed = self.lp_evaluate.min(u32::try_from(amount).unwrap_or(u32::MAX));
        self.lp_evaluate -= removed;
        removed
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, LP: {}/{}, Grade: ",
            self.short, self.name, self.lp_evaluate, self.lp
        )?;
        match self.grade {
            Some(g) => write!(f, "{g}"),
            None => f.write_str("None"),
        }
    }
}
