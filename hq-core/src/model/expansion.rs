//! Row expansion and detail-panel state.
//!
//! Whether expanding a row collapses its siblings is a per-screen
//! configuration choice (`ExpansionPolicy`), never inferred from wiring.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::model::list_item::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionPolicy {
    /// At most one row expanded at a time.
    #[default]
    Single,

    /// Rows expand independently.
    Independent,
}

impl ExpansionPolicy {
    #[must_use]
    pub const fn from_single_flag(single_expansion: bool) -> Self {
        if single_expansion { Self::Single } else { Self::Independent }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    policy: ExpansionPolicy,
    expanded: AHashSet<ItemId>,

    /// Row opened in the side panel; always exclusive.
    detail: Option<ItemId>,
}

impl ExpansionState {
    #[must_use]
    pub fn new(policy: ExpansionPolicy) -> Self {
        Self {
            policy,
            expanded: AHashSet::new(),
            detail: None,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> ExpansionPolicy {
        self.policy
    }

    /// Flip inline expansion of `id`; returns whether it is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            return false;
        }

        if self.policy == ExpansionPolicy::Single {
            self.expanded.clear();
        }
        self.expanded.insert(ItemId::new(id));
        true
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn open_detail(&mut self, id: &str) {
        self.detail = Some(ItemId::new(id));
    }

    pub fn close_detail(&mut self) -> Option<ItemId> {
        self.detail.take()
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Forget rows for which `keep` is false (removed or filtered out).
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.expanded.retain(|id| keep(id.as_str()));
        if self.detail.as_deref().is_some_and(|id| !keep(id)) {
            self.detail = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_policy_collapses_siblings() {
        let mut state = ExpansionState::new(ExpansionPolicy::Single);

        assert!(state.toggle("R1"));
        assert!(state.toggle("R2"));
        assert!(!state.is_expanded("R1"));
        assert!(state.is_expanded("R2"));
        assert_eq!(state.expanded_count(), 1);

        assert!(!state.toggle("R2"));
        assert_eq!(state.expanded_count(), 0);
    }

    #[test]
    fn test_independent_policy_keeps_siblings() {
        let mut state = ExpansionState::new(ExpansionPolicy::from_single_flag(false));

        state.toggle("R1");
        state.toggle("R2");
        assert!(state.is_expanded("R1") && state.is_expanded("R2"));

        state.collapse_all();
        assert_eq!(state.expanded_count(), 0);
    }

    #[test]
    fn test_retain_drops_detail_of_pruned_row() {
        let mut state = ExpansionState::new(ExpansionPolicy::Independent);
        state.toggle("R1");
        state.open_detail("R2");

        state.retain(|id| id == "R1");

        assert!(state.is_expanded("R1"));
        assert_eq!(state.detail(), None);
    }
}
