//! ``src/model/selection.rs``
//! ============================================================================
//! # `SelectionSet`: checked rows awaiting a bulk action
//!
//! Keyed by item id. `set_all` only ever touches the ids it is given, so the
//! "select all visible" checkbox can never reach rows outside the visible
//! window.

use ahash::AHashSet;
use smallvec::SmallVec;

use crate::model::list_item::ItemId;

/// Ids whose membership flipped during a `set_all` call.
pub type Changed = SmallVec<[ItemId; 16]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: AHashSet<ItemId>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(ItemId::new(id));
            true
        }
    }

    /// Check or uncheck every id in `ids`. Returns the ids whose membership
    /// actually changed, which `restore` can undo exactly.
    pub fn set_all<'a, I>(&mut self, ids: I, checked: bool) -> Changed
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut changed = Changed::new();
        for id in ids {
            let flipped = if checked {
                self.ids.insert(ItemId::new(id))
            } else {
                self.ids.remove(id)
            };
            if flipped {
                changed.push(ItemId::new(id));
            }
        }
        changed
    }

    /// Undo a `set_all(.., checked)` given the ids it reported as changed.
    pub fn restore(&mut self, changed: &Changed, checked: bool) {
        for id in changed {
            if checked {
                self.ids.remove(id.as_str());
            } else {
                self.ids.insert(id.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// True when every id in `ids` is selected and there is at least one.
    #[must_use]
    pub fn covers<'a, I>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for id in ids {
            if !self.has(id) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Drop ids for which `keep` is false. Returns how many were pruned.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id.as_str()));
        before - self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(ids: &[&str]) -> SelectionSet {
        let mut set = SelectionSet::new();
        set.set_all(ids.iter().copied(), true);
        set
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut set = selection(&["R1"]);
        let before = set.clone();

        assert!(!set.toggle("R1"));
        assert!(set.toggle("R1"));
        assert_eq!(set, before);

        assert!(set.toggle("R2"));
        assert!(!set.toggle("R2"));
        assert_eq!(set, before);
    }

    #[test]
    fn test_set_all_round_trip_on_disjoint_ids() {
        let mut set = selection(&["X1", "X2"]);
        let before = set.clone();
        let page = ["R1", "R2", "R3"];

        set.set_all(page.iter().copied(), true);
        assert_eq!(set.len(), 5);
        set.set_all(page.iter().copied(), false);

        assert_eq!(set, before);
    }

    #[test]
    fn test_restore_undoes_exactly_with_overlap() {
        let mut set = selection(&["R1", "X9"]);
        let before = set.clone();
        let page = ["R1", "R2"];

        let changed = set.set_all(page.iter().copied(), true);
        assert_eq!(changed.as_slice(), &[ItemId::new("R2")]);
        set.restore(&changed, true);
        assert_eq!(set, before);

        let changed = set.set_all(page.iter().copied(), false);
        set.restore(&changed, false);
        assert_eq!(set, before);
    }

    #[test]
    fn test_set_all_never_touches_other_ids() {
        let mut set = SelectionSet::new();
        let visible = ["E3", "E7", "E11"];

        set.set_all(visible.iter().copied(), true);

        assert_eq!(set.len(), 3);
        assert!(visible.iter().all(|id| set.has(id)));
        assert!(!set.has("E1"));
        assert!(set.covers(visible.iter().copied()));
        assert!(!set.covers(std::iter::empty()));
    }

    #[test]
    fn test_retain_prunes_stale_ids() {
        let mut set = selection(&["R1", "R2", "R3"]);
        let pruned = set.retain(|id| id != "R2");

        assert_eq!(pruned, 1);
        assert!(!set.has("R2"));
        assert_eq!(set.len(), 2);

        set.clear();
        assert!(set.is_empty());
    }
}
