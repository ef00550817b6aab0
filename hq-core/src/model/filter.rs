//! ``src/model/filter.rs``
//! ============================================================================
//! # Filter predicate evaluation
//!
//! Pure functions mapping `(items, filter state)` to the visible subset.
//! Nothing here holds state between calls: the same inputs always produce
//! the same output, and feeding the output back in yields it unchanged.

use std::cmp::Ordering;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::model::list_item::{ItemStatus, ListItem};

/// Status tab. `All` bypasses the status predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabFilter<S> {
    All,
    Status(S),
}

impl<S: ItemStatus> TabFilter<S> {
    /// Tabs in display order: `All` followed by every status.
    #[must_use]
    pub fn tabs() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(S::ALL.iter().copied().map(Self::Status))
            .collect()
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Status(status) => status.label(),
        }
    }

    #[must_use]
    pub fn matches(self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Status(wanted) => wanted == status,
        }
    }
}

impl<S> Default for TabFilter<S> {
    fn default() -> Self {
        Self::All
    }
}

/// Exact-value filter on one display field (a dropdown in the web screens).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownFilter {
    pub field: CompactString,
    pub value: String,
}

impl DropdownFilter {
    #[must_use]
    pub fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: CompactString::new(field),
            value: value.into(),
        }
    }

    fn matches<S: ItemStatus>(&self, item: &ListItem<S>) -> bool {
        item.field(&self.field)
            .is_some_and(|actual| actual.trim().eq_ignore_ascii_case(self.value.trim()))
    }
}

/// Complete filter state of one list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<S> {
    pub tab: TabFilter<S>,
    pub search: String,
    pub dropdowns: SmallVec<[DropdownFilter; 2]>,
}

impl<S> Default for FilterState<S> {
    fn default() -> Self {
        Self {
            tab: TabFilter::All,
            search: String::new(),
            dropdowns: SmallVec::new(),
        }
    }
}

impl<S: ItemStatus> FilterState<S> {
    /// Replace the filter on `field`; `None` removes it.
    pub fn set_dropdown(&mut self, field: &str, value: Option<String>) {
        self.dropdowns.retain(|dropdown| dropdown.field != field);
        if let Some(value) = value {
            self.dropdowns.push(DropdownFilter::new(field, value));
        }
    }

    #[must_use]
    pub fn dropdown(&self, field: &str) -> Option<&str> {
        self.dropdowns
            .iter()
            .find(|dropdown| dropdown.field == field)
            .map(|dropdown| dropdown.value.as_str())
    }
}

/// Fields consulted by the free-text search, in addition to the item id.
pub type SearchFields = &'static [&'static str];

/// Optional secondary ordering of the visible subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    /// Order by `ItemStatus::priority` ascending.
    pub status_priority: bool,

    /// Then by this field descending (ISO dates compare lexically).
    pub recency_field: Option<&'static str>,
}

impl SortSpec {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            status_priority: false,
            recency_field: None,
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        !self.status_priority && self.recency_field.is_none()
    }

    fn compare<S: ItemStatus>(&self, a: &ListItem<S>, b: &ListItem<S>) -> Ordering {
        let by_status: Ordering = if self.status_priority {
            a.status.priority().cmp(&b.status.priority())
        } else {
            Ordering::Equal
        };

        by_status.then_with(|| match self.recency_field {
            Some(field) => b.field(field).cmp(&a.field(field)),
            None => Ordering::Equal,
        })
    }
}

/// Case-insensitive substring match of `query` against the id and `fields`.
/// A blank query matches everything.
#[must_use]
pub fn matches_search<S: ItemStatus>(item: &ListItem<S>, query: &str, fields: SearchFields) -> bool {
    let needle: String = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    item.id.to_lowercase().contains(&needle)
        || fields.iter().any(|field| {
            item.field(field)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
}

/// True when `item` passes every predicate of `filter`.
#[must_use]
pub fn matches<S: ItemStatus>(item: &ListItem<S>, filter: &FilterState<S>, fields: SearchFields) -> bool {
    filter.tab.matches(item.status)
        && filter.dropdowns.iter().all(|dropdown| dropdown.matches(item))
        && matches_search(item, &filter.search, fields)
}

/// Positions in `items` of the entries satisfying `filter`, in display order.
///
/// Input order is preserved unless `sort` asks for a secondary ordering; the
/// sort is stable, so ties keep input order as well.
#[must_use]
pub fn filter_indices<S: ItemStatus>(
    items: &[ListItem<S>],
    filter: &FilterState<S>,
    fields: SearchFields,
    sort: SortSpec,
) -> Vec<usize> {
    let mut visible: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches(item, filter, fields))
        .map(|(idx, _)| idx)
        .collect();

    if !sort.is_none() {
        visible.sort_by(|&a, &b| sort.compare(&items[a], &items[b]));
    }

    visible
}

/// Ordered subset of `items` satisfying `filter`.
#[must_use]
pub fn filter_items<'a, S: ItemStatus>(
    items: &'a [ListItem<S>],
    filter: &FilterState<S>,
    fields: SearchFields,
    sort: SortSpec,
) -> Vec<&'a ListItem<S>> {
    filter_indices(items, filter, fields, sort)
        .into_iter()
        .map(|idx| &items[idx])
        .collect()
}

/// Count per tab under the current search and dropdown filters, ignoring the
/// tab predicate itself.
#[must_use]
pub fn tab_counts<S: ItemStatus>(
    items: &[ListItem<S>],
    filter: &FilterState<S>,
    fields: SearchFields,
) -> Vec<(TabFilter<S>, usize)> {
    let untabbed = FilterState {
        tab: TabFilter::All,
        ..filter.clone()
    };
    let candidates: Vec<&ListItem<S>> = items
        .iter()
        .filter(|item| matches(item, &untabbed, fields))
        .collect();

    TabFilter::tabs()
        .into_iter()
        .map(|tab| {
            let count = candidates.iter().filter(|item| tab.matches(item.status)).count();
            (tab, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::RequestStatus;

    const FIELDS: SearchFields = &["name", "email"];

    fn people() -> Vec<ListItem<RequestStatus>> {
        vec![
            ListItem::new("R1", RequestStatus::Approved)
                .with_field("name", "Sarah Chen")
                .with_field("email", "sarah.chen@flexi.io")
                .with_field("department", "Engineering")
                .with_field("date", "2026-10-01"),
            ListItem::new("R2", RequestStatus::Pending)
                .with_field("name", "James Wilson")
                .with_field("email", "jwilson@flexi.io")
                .with_field("department", "Sales")
                .with_field("date", "2026-10-03"),
            ListItem::new("R3", RequestStatus::Pending)
                .with_field("name", "Priya Nair")
                .with_field("email", "priya@flexi.io")
                .with_field("department", "engineering")
                .with_field("date", "2026-10-05"),
        ]
    }

    fn ids<S: ItemStatus>(items: &[&ListItem<S>]) -> Vec<String> {
        items.iter().map(|item| item.id.to_string()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_and_blank_matches_all() {
        let items = vec![
            ListItem::new("E1", RequestStatus::Pending).with_field("name", "Sarah Chen"),
            ListItem::new("E2", RequestStatus::Pending).with_field("name", "James Wilson"),
        ];
        let mut filter = FilterState::default();

        filter.search = "sarah".into();
        let visible = filter_items(&items, &filter, FIELDS, SortSpec::none());
        assert_eq!(ids(&visible), vec!["E1"]);

        filter.search = "SARAH".into();
        assert_eq!(filter_items(&items, &filter, FIELDS, SortSpec::none()).len(), 1);

        filter.search = String::new();
        assert_eq!(filter_items(&items, &filter, FIELDS, SortSpec::none()).len(), 2);

        filter.search = "   ".into();
        assert_eq!(filter_items(&items, &filter, FIELDS, SortSpec::none()).len(), 2);
    }

    #[test]
    fn test_search_covers_id_and_listed_fields_only() {
        let items = people();
        let mut filter = FilterState::default();

        filter.search = "r2".into();
        assert_eq!(ids(&filter_items(&items, &filter, FIELDS, SortSpec::none())), vec!["R2"]);

        // department is not a search field
        filter.search = "sales".into();
        assert!(filter_items(&items, &filter, FIELDS, SortSpec::none()).is_empty());
    }

    #[test]
    fn test_tab_and_dropdown_predicates_combine() {
        let items = people();
        let mut filter = FilterState {
            tab: TabFilter::Status(RequestStatus::Pending),
            ..FilterState::default()
        };
        assert_eq!(ids(&filter_items(&items, &filter, FIELDS, SortSpec::none())), vec!["R2", "R3"]);

        filter.set_dropdown("department", Some("Engineering".into()));
        assert_eq!(ids(&filter_items(&items, &filter, FIELDS, SortSpec::none())), vec!["R3"]);

        filter.tab = TabFilter::All;
        assert_eq!(ids(&filter_items(&items, &filter, FIELDS, SortSpec::none())), vec!["R1", "R3"]);

        filter.set_dropdown("department", None);
        assert_eq!(filter_items(&items, &filter, FIELDS, SortSpec::none()).len(), 3);

        filter.set_dropdown("team", Some("Ops".into()));
        assert!(filter_items(&items, &filter, FIELDS, SortSpec::none()).is_empty());
    }

    #[test]
    fn test_output_is_ordered_subset_and_idempotent() {
        let items = people();
        let filter = FilterState {
            search: "flexi".into(),
            tab: TabFilter::Status(RequestStatus::Pending),
            ..FilterState::default()
        };

        let first: Vec<ListItem<RequestStatus>> = filter_items(&items, &filter, FIELDS, SortSpec::none())
            .into_iter()
            .cloned()
            .collect();
        let second = filter_items(&first, &filter, FIELDS, SortSpec::none());

        assert_eq!(ids(&second), first.iter().map(|i| i.id.to_string()).collect::<Vec<_>>());
        assert_eq!(ids(&second), vec!["R2", "R3"]);
    }

    #[test]
    fn test_status_priority_then_recency_sort() {
        let items = people();
        let sort = SortSpec {
            status_priority: true,
            recency_field: Some("date"),
        };
        let visible = filter_items(&items, &FilterState::default(), FIELDS, sort);

        // pending first, newest first within a status
        assert_eq!(ids(&visible), vec!["R3", "R2", "R1"]);
    }

    #[test]
    fn test_tab_counts_ignore_tab_predicate() {
        let items = people();
        let filter = FilterState {
            tab: TabFilter::Status(RequestStatus::Rejected),
            ..FilterState::default()
        };
        let counts = tab_counts(&items, &filter, FIELDS);

        assert_eq!(
            counts,
            vec![
                (TabFilter::All, 3),
                (TabFilter::Status(RequestStatus::Pending), 2),
                (TabFilter::Status(RequestStatus::Approved), 1),
                (TabFilter::Status(RequestStatus::Rejected), 0),
            ]
        );
    }
}
