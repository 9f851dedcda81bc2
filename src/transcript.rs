//! The parsed transcript: areas keyed by name in first-appearance order.

use crate::area::Area;
use crate::subject::Subject;
use serde::Serialize;

/// Insertion-ordered mapping from area name to [`Area`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    areas: Vec<Area>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `area` unless an area with the same name exists.
    ///
    /// Returns the index of the area under that name.
    pub fn insert(&mut self, area: Area) -> usize {
        match self.position(area.name()) {
            Some(idx) => idx,
            None => {
                self.areas.push(area);
                self.areas.len() - 1
            }
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.areas.iter().position(|a| a.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.name() == name)
    }

    pub(crate) fn area_at_mut(&mut self, idx: usize) -> Option<&mut Area> {
        self.areas.get_mut(idx)
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub(crate) fn areas_mut(&mut self) -> impl Iterator<Item = &mut Area> {
        self.areas.iter_mut()
    }

    /// All subjects in document order.
    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.areas.iter().flat_map(|a| a.subjects().iter())
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Area;
    type IntoIter = std::slice::Iter<'a, Area>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_appearance_order() {
        let mut t = Transcript::new();
        assert_eq!(t.insert(Area::new("B", 10)), 0);
        assert_eq!(t.insert(Area::new("A", 5)), 1);
        assert_eq!(t.insert(Area::new("B", 99)), 0);
        let names: Vec<_> = t.areas().iter().map(Area::name).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(t.get("B").map(Area::lp), Some(10));
    }

    #[test]
    fn subjects_flatten_in_order() {
        let mut t = Transcript::new();
        let a = t.insert(Area::new("A", 10));
        let b = t.insert(Area::new("B", 10));
        t.area_at_mut(b)
            .unwrap()
            .push_subject(Subject::new("B", "INF2", "Second", 5, None));
        t.area_at_mut(a)
            .unwrap()
            .push_subject(Subject::new("A", "INF1", "First", 5, None));
        let codes: Vec<_> = t.subjects().map(|s| s.short.as_str()).collect();
        assert_eq!(codes, vec!["INF1", "INF2"]);
    }

    #[test]
    fn empty_transcript() {
        let t = Transcript::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert!(t.get("A").is_none());
    }
}
