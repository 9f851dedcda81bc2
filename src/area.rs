//! Study areas and the credit-ceiling normalization.
//!
//! An [`Area`] owns its subjects outright. Outside code only ever sees them
//! through `&[Subject]`; the counted credit of a subject changes through
//! exactly two operations:
//!
//! - [`Area::normalize_lp`] — trims graded credit down to the ceiling, worst
//!   grades first;
//! - [`Area::exclude`] — drops the whole area from the average (elective
//!   track exclusion).

use crate::subject::Subject;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A curriculum category with a credit ceiling and its subjects in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    name: String,
    lp: u32,
    subjects: Vec<Subject>,
}

impl Area {
    pub fn new(name: impl Into<String>, lp: u32) -> Self {
        Self {
            name: name.into(),
            lp,
            subjects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required credit points, which is also the most the area may count.
    pub fn lp(&self) -> u32 {
        self.lp
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Append a subject, re-homing it to this area.
    pub fn push_subject(&mut self, mut subject: Subject) {
        if subject.area != self.name {
            subject.area = self.name.clone();
        }
        self.subjects.push(subject);
    }

    fn graded(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().filter(|s| s.is_graded())
    }

    /// Counted credit of all graded subjects.
    ///
    /// Summed as `u64`: a single subject may carry any `u32` credit value.
    pub fn accepted_lp(&self) -> u64 {
        self.graded().map(|s| u64::from(s.lp_evaluate())).sum()
    }

    /// Sum of `lp_evaluate * grade` over graded subjects.
    pub fn weighted_sum(&self) -> f64 {
        self.graded().filter_map(Subject::weighted_grade).sum()
    }

    /// Credit still missing to reach the ceiling.
    pub fn missing_lp(&self) -> u64 {
        u64::from(self.lp).saturating_sub(self.accepted_lp())
    }

    /// Weighted average of the counted credit, `None` when nothing counts.
    pub fn average(&self) -> Option<f64> {
        match self.accepted_lp() {
            0 => None,
            lp => Some(self.weighted_sum() / lp as f64),
        }
    }

    /// Nominal credit of graded subjects, ignoring any trimming.
    pub fn nominal_lp(&self) -> u64 {
        self.graded().map(|s| u64::from(s.lp())).sum()
    }

    /// Average over nominal credit, ignoring any trimming.
    pub fn nominal_average(&self) -> Option<f64> {
        let lp = self.nominal_lp();
        if lp == 0 {
            return None;
        }
        let weighted: f64 = self
            .graded()
            .filter_map(|s| s.grade.map(|g| f64::from(s.lp()) * g))
            .sum();
        Some(weighted / lp as f64)
    }

    /// Enforce the credit ceiling by discarding credit from the worst grades first.
    ///
    /// Graded subjects are walked from the numerically largest grade down;
    /// equal grades keep document order, so the first-listed one loses credit
    /// first. Each subject is zeroed while the remaining excess exceeds its
    /// counted credit; the subject that absorbs the rest keeps partial credit
    /// and the walk stops. Ungraded subjects are never touched.
    ///
    /// Returns the number of credit points removed (0 when already within the
    /// ceiling, so repeated calls are no-ops).
    pub fn normalize_lp(&mut self) -> u64 {
        let ceiling = u64::from(self.lp);
        let total = self.accepted_lp();
        if total <= ceiling {
            return 0;
        }
        let excess = total - ceiling;

        let mut order: Vec<usize> = (0..self.subjects.len())
            .filter(|&i| self.subjects[i].is_graded())
            .collect();
        // Stable: equal grades stay in insertion order.
        order.sort_by(|&a, &b| {
            let ga = self.subjects[a].grade.unwrap_or_default();
            let gb = self.subjects[b].grade.unwrap_or_default();
            gb.total_cmp(&ga)
        });

        let mut remaining = excess;
        for idx in order {
            let subject = &mut self.subjects[idx];
            let removed = subject.discard_lp(remaining);
            debug!(
                area = %self.name,
                subject = %subject.short,
                removed,
                kept = subject.lp_evaluate(),
                "Trimmed credit"
            );
            remaining -= u64::from(removed);
            if remaining == 0 {
                break;
            }
        }

        excess - remaining
    }

    /// Stop the whole area from counting by zeroing every subject's counted credit.
    pub fn exclude(&mut self) {
        for subject in &mut self.subjects {
            let lp = subject.lp();
            subject.discard_lp(u64::from(lp));
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} LP", self.name, self.lp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_with(ceiling: u32, subjects: &[(&str, u32, Option<f64>)]) -> Area {
        let mut area = Area::new("Test", ceiling);
        for (short, lp, grade) in subjects {
            area.push_subject(Subject::new("Test", *short, "Course", *lp, *grade));
        }
        area
    }

    fn counted(area: &Area) -> Vec<u32> {
        area.subjects().iter().map(Subject::lp_evaluate).collect()
    }

    #[test]
    fn trims_worst_grade_then_partial() {
        let mut area = area_with(
            15,
            &[
                ("A", 10, Some(1.0)),
                ("B", 10, Some(2.0)),
                ("C", 10, Some(3.0)),
            ],
        );
        assert_eq!(area.normalize_lp(), 15);
        assert_eq!(counted(&area), vec![10, 5, 0]);
        assert_eq!(area.accepted_lp(), 15);
    }

    #[test]
    fn within_ceiling_is_noop() {
        let mut area = area_with(30, &[("A", 10, Some(1.3)), ("B", 10, Some(4.0))]);
        assert_eq!(area.normalize_lp(), 0);
        assert_eq!(counted(&area), vec![10, 10]);
    }

    #[test]
    fn exact_ceiling_is_noop() {
        let mut area = area_with(20, &[("A", 10, Some(1.3)), ("B", 10, Some(4.0))]);
        assert_eq!(area.normalize_lp(), 0);
        assert_eq!(area.accepted_lp(), 20);
    }

    #[test]
    fn idempotent() {
        let mut area = area_with(12, &[("A", 8, Some(2.7)), ("B", 8, Some(1.0))]);
        area.normalize_lp();
        let first = counted(&area);
        assert_eq!(area.normalize_lp(), 0);
        assert_eq!(counted(&area), first);
        assert_eq!(first, vec![4, 8]);
    }

    #[test]
    fn ties_discard_first_listed() {
        let mut area = area_with(
            10,
            &[("A", 5, Some(2.0)), ("B", 5, Some(2.0)), ("C", 5, Some(2.0))],
        );
        area.normalize_lp();
        assert_eq!(counted(&area), vec![0, 5, 5]);
    }

    #[test]
    fn ungraded_subjects_untouched() {
        let mut area = area_with(
            10,
            &[("A", 8, None), ("B", 8, Some(1.7)), ("C", 8, Some(3.3))],
        );
        area.normalize_lp();
        assert_eq!(counted(&area), vec![8, 8, 2]);
        assert_eq!(area.accepted_lp(), 10);
    }

    #[test]
    fn removal_equal_to_subject_credit_zeroes_it() {
        let mut area = area_with(10, &[("A", 10, Some(1.0)), ("B", 5, Some(3.0))]);
        assert_eq!(area.normalize_lp(), 5);
        assert_eq!(counted(&area), vec![10, 0]);
    }

    #[test]
    fn accepted_equals_min_of_ceiling_and_graded_credit() {
        let cases: Vec<(u32, Vec<(&str, u32, Option<f64>)>)> = vec![
            (46, vec![("A", 8, Some(1.3)), ("B", 6, Some(2.0)), ("C", 4, None)]),
            (13, vec![("A", 8, Some(1.3)), ("B", 6, Some(2.0)), ("C", 5, Some(4.0))]),
            (0, vec![("A", 8, Some(1.3))]),
            (7, vec![("A", 3, Some(1.3)), ("B", 3, Some(1.3)), ("C", 3, Some(1.0))]),
        ];
        for (ceiling, subjects) in &cases {
            let mut area = area_with(*ceiling, subjects);
            let graded: u32 = subjects
                .iter()
                .filter(|(_, _, g)| g.is_some())
                .map(|(_, lp, _)| lp)
                .sum();
            let before = counted(&area);
            area.normalize_lp();
            assert_eq!(area.accepted_lp(), u64::from(graded.min(*ceiling)));
            for (b, a) in before.iter().zip(counted(&area)) {
                assert!(a <= *b, "normalization increased credit");
            }
        }
    }

    #[test]
    fn aggregates() {
        let area = area_with(20, &[("A", 10, Some(1.0)), ("B", 5, Some(2.5)), ("C", 3, None)]);
        assert_eq!(area.accepted_lp(), 15);
        assert!((area.weighted_sum() - 22.5).abs() < 1e-9);
        assert_eq!(area.missing_lp(), 5);
        assert!((area.average().unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn average_absent_without_credit() {
        let area = area_with(10, &[("A", 5, None)]);
        assert_eq!(area.average(), None);
        assert_eq!(area.nominal_average(), None);
    }

    #[test]
    fn nominal_average_ignores_trimming() {
        let mut area = area_with(10, &[("A", 10, Some(1.0)), ("B", 10, Some(3.0))]);
        area.normalize_lp();
        assert_eq!(area.accepted_lp(), 10);
        assert_eq!(area.nominal_lp(), 20);
        assert!((area.nominal_average().unwrap() - 2.0).abs() < 1e-9);
        assert!((area.average().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn exclude_zeroes_everything() {
        let mut area = area_with(20, &[("A", 10, Some(1.0)), ("B", 5, None)]);
        area.exclude();
        assert_eq!(counted(&area), vec![0, 0]);
        assert_eq!(area.accepted_lp(), 0);
        assert_eq!(area.normalize_lp(), 0);
    }

    #[test]
    fn push_subject_rehomes_area_name() {
        let mut area = Area::new("Real", 5);
        area.push_subject(Subject::new("Other", "INF1", "X", 5, None));
        assert_eq!(area.subjects()[0].area, "Real");
    }

    #[test]
    fn credit_sums_do_not_overflow() {
        let mut area = area_with(46, &[("A", u32::MAX, Some(1.0)), ("B", 1, Some(2.0))]);
        assert_eq!(area.nominal_lp(), u64::from(u32::MAX) + 1);
        assert_eq!(area.normalize_lp(), u64::from(u32::MAX) + 1 - 46);
        // The 2,0 subject goes first, then the 1,0 subject absorbs the rest.
        assert_eq!(counted(&area), vec![46, 0]);
        assert_eq!(area.accepted_lp(), 46);
        assert_eq!(area.missing_lp(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(Area::new("Bachelorarbeit", 12).to_string(), "Bachelorarbeit, 12 LP");
    }
}
