//! ``src/model/list_state.rs``
//! ============================================================================
//! # `ListController`: per-screen list state
//!
//! Owns the item collection of one screen together with its filter state,
//! selection set, row expansion, cursor and page. Every mutation of items or
//! filters goes through `refresh`, which recomputes the visible subset and
//! prunes selection and expansion down to it, so the selection is always a
//! subset of the filtered ids.
//!
//! Bulk transitions are a pure map over the collection; they cannot fail
//! half way. When the change is pushed to a backend afterwards, the returned
//! `BulkReceipt` lets `reconcile` revert exactly the items the backend
//! rejected.

use std::io::Write;

use ahash::AHashSet;
use tracing::{debug, info};

use crate::{
    error::AppError,
    export,
    model::{
        expansion::ExpansionState,
        filter::{self, FilterState, TabFilter},
        list_item::{ItemId, ItemStatus, ListItem},
        screen_spec::ScreenSpec,
        selection::{Changed, SelectionSet},
    },
};

/// Bulk-action lifecycle of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPhase {
    /// No selection.
    Idle,

    /// Selection non-empty, nothing in flight.
    Selecting,

    /// A transition is being pushed to the backend.
    Committing,
}

/// Record of one bulk transition: the new status and what each touched item
/// held before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReceipt<S> {
    pub status: S,
    pub previous: Vec<(ItemId, S)>,
}

impl<S: ItemStatus> BulkReceipt<S> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.previous.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.previous.iter().map(|(id, _)| id)
    }
}

#[derive(Debug, Clone)]
pub struct ListController<S: ItemStatus> {
    spec: ScreenSpec<S>,
    items: Vec<ListItem<S>>,
    filter: FilterState<S>,
    selection: SelectionSet,
    expansion: ExpansionState,

    /// Positions in `items` of the filtered, ordered subset.
    visible: Vec<usize>,

    page: usize,

    /// Cursor row within the current page.
    cursor: usize,

    /// Number of backend pushes in flight.
    in_flight: usize,
}

impl<S: ItemStatus> ListController<S> {
    /// Seed a controller. Fails on duplicate ids.
    pub fn new(spec: ScreenSpec<S>, items: Vec<ListItem<S>>) -> Result<Self, AppError> {
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(AppError::duplicate_id(spec.title(), item.id.as_str()));
            }
        }

        let expansion = ExpansionState::new(spec.expansion);
        let mut controller = Self {
            spec,
            items,
            filter: FilterState::default(),
            selection: SelectionSet::new(),
            expansion,
            visible: Vec::new(),
            page: 0,
            cursor: 0,
            in_flight: 0,
        };
        controller.refresh();

        info!(
            marker = "LIST_SEEDED",
            operation_type = "list_state",
            screen = controller.spec.title(),
            items = controller.items.len(),
            "seeded list controller"
        );

        Ok(controller)
    }

    #[must_use]
    pub const fn spec(&self) -> &ScreenSpec<S> {
        &self.spec
    }

    #[must_use]
    pub fn items(&self) -> &[ListItem<S>] {
        &self.items
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterState<S> {
        &self.filter
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub const fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ListItem<S>> {
        self.items.iter().find(|item| item.id == id)
    }

    /* ----------------------------- visible set ----------------------------- */

    /// Filtered subset in display order.
    pub fn visible(&self) -> impl Iterator<Item = &ListItem<S>> {
        self.visible.iter().map(|&idx| &self.items[idx])
    }

    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.visible.len().div_ceil(self.spec.page_size).max(1)
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn page_range(&self) -> std::ops::Range<usize> {
        let start = (self.page * self.spec.page_size).min(self.visible.len());
        let end = (start + self.spec.page_size).min(self.visible.len());
        start..end
    }

    /// Rows of the current page.
    pub fn page_items(&self) -> impl Iterator<Item = &ListItem<S>> {
        self.visible[self.page_range()]
            .iter()
            .map(|&idx| &self.items[idx])
    }

    /// Ids of the current page; the window "select all visible" acts on.
    #[must_use]
    pub fn page_ids(&self) -> Vec<&str> {
        self.page_items().map(|item| item.id.as_str()).collect()
    }

    #[must_use]
    pub fn cursor_item(&self) -> Option<&ListItem<S>> {
        self.page_items().nth(self.cursor)
    }

    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible().any(|item| item.id == id)
    }

    /// Recompute the visible subset, prune selection and expansion to it and
    /// clamp page and cursor.
    fn refresh(&mut self) {
        self.visible = filter::filter_indices(
            &self.items,
            &self.filter,
            self.spec.search_fields,
            self.spec.sort,
        );

        let visible_ids: AHashSet<&str> = self
            .visible
            .iter()
            .map(|&idx| self.items[idx].id.as_str())
            .collect();

        let pruned = self.selection.retain(|id| visible_ids.contains(id));
        self.expansion.retain(|id| visible_ids.contains(id));

        if pruned > 0 {
            debug!(
                marker = "SELECTION_PRUNED",
                operation_type = "list_state",
                screen = self.spec.title(),
                pruned,
                "dropped selected ids no longer visible"
            );
        }

        self.page = self.page.min(self.page_count() - 1);
        let rows = self.page_range().len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
    }

    /* ------------------------------- filters ------------------------------- */

    pub fn set_tab(&mut self, tab: TabFilter<S>) {
        if self.filter.tab != tab {
            self.filter.tab = tab;
            self.page = 0;
            self.cursor = 0;
            self.refresh();
        }
    }

    /// Cycle through `All` and every status; `forward == false` goes back.
    pub fn cycle_tab(&mut self, forward: bool) {
        let tabs = TabFilter::<S>::tabs();
        let current = tabs.iter().position(|tab| *tab == self.filter.tab).unwrap_or(0);
        let next = if forward {
            (current + 1) % tabs.len()
        } else {
            (current + tabs.len() - 1) % tabs.len()
        };
        self.set_tab(tabs[next]);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filter.search = query.into();
        self.page = 0;
        self.cursor = 0;
        self.refresh();
    }

    pub fn push_search(&mut self, ch: char) {
        let mut query = std::mem::take(&mut self.filter.search);
        query.push(ch);
        self.set_search(query);
    }

    pub fn pop_search(&mut self) {
        let mut query = std::mem::take(&mut self.filter.search);
        query.pop();
        self.set_search(query);
    }

    /// Set or clear the dropdown filter on a declared dropdown field.
    pub fn set_dropdown(&mut self, field: &str, value: Option<String>) -> Result<(), AppError> {
        if !self.spec.has_dropdown(field) {
            return Err(AppError::invalid_input(
                field,
                format!("not a filter field of {}", self.spec.title()),
            ));
        }

        self.filter.set_dropdown(field, value);
        self.page = 0;
        self.cursor = 0;
        self.refresh();
        Ok(())
    }

    /// Distinct values of `field` across the whole collection, sorted.
    #[must_use]
    pub fn dropdown_options(&self, field: &str) -> Vec<String> {
        let mut options: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| item.field(field))
            .map(str::to_string)
            .collect();
        options.sort_unstable();
        options.dedup();
        options
    }

    /// Advance the dropdown on `field` to its next option; past the last
    /// option the filter is cleared.
    pub fn cycle_dropdown(&mut self, field: &str) -> Result<Option<String>, AppError> {
        let options = self.dropdown_options(field);
        let next: Option<String> = match self.filter.dropdown(field) {
            None => options.first().cloned(),
            Some(current) => options
                .iter()
                .position(|option| option == current)
                .and_then(|idx| options.get(idx + 1))
                .cloned(),
        };
        self.set_dropdown(field, next.clone())?;
        Ok(next)
    }

    /* ---------------------------- cursor / pages --------------------------- */

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.page > 0 {
            self.page -= 1;
            self.cursor = self.page_range().len().saturating_sub(1);
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.page_range().len() {
            self.cursor += 1;
        } else if self.page + 1 < self.page_count() {
            self.page += 1;
            self.cursor = 0;
        }
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.cursor = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.cursor = 0;
        }
    }

    /* ------------------------------ selection ------------------------------ */

    /// Toggle one visible row. Ids outside the filtered set are rejected so
    /// the selection never holds rows the user cannot see.
    pub fn toggle(&mut self, id: &str) -> Result<bool, AppError> {
        if !self.is_visible(id) {
            return Err(AppError::UnknownItem(id.to_string()));
        }
        Ok(self.selection.toggle(id))
    }

    pub fn toggle_cursor(&mut self) -> Option<bool> {
        let id = self.cursor_item()?.id.clone();
        Some(self.selection.toggle(&id))
    }

    /// Check or uncheck every row of the current page and nothing else.
    pub fn select_page(&mut self, checked: bool) -> Changed {
        let ids: Vec<ItemId> = self.page_items().map(|item| item.id.clone()).collect();
        self.selection
            .set_all(ids.iter().map(ItemId::as_str), checked)
    }

    /// The "select all visible" checkbox: unchecks the page when every row
    /// on it is already selected, checks it otherwise.
    pub fn toggle_page(&mut self) -> Changed {
        let all_checked = {
            let ids = self.page_ids();
            self.selection.covers(ids)
        };
        self.select_page(!all_checked)
    }

    #[must_use]
    pub fn page_fully_selected(&self) -> bool {
        self.selection.covers(self.page_ids())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /* ------------------------------ expansion ------------------------------ */

    pub fn toggle_expand(&mut self, id: &str) -> Result<bool, AppError> {
        if !self.is_visible(id) {
            return Err(AppError::UnknownItem(id.to_string()));
        }
        Ok(self.expansion.toggle(id))
    }

    pub fn toggle_expand_cursor(&mut self) -> Option<bool> {
        let id = self.cursor_item()?.id.clone();
        Some(self.expansion.toggle(&id))
    }

    pub fn open_detail_cursor(&mut self) -> Option<&ListItem<S>> {
        let id = self.cursor_item()?.id.clone();
        self.expansion.open_detail(&id);
        self.get(&id)
    }

    pub fn close_detail(&mut self) {
        self.expansion.close_detail();
    }

    #[must_use]
    pub fn detail_item(&self) -> Option<&ListItem<S>> {
        self.expansion.detail().and_then(|id| self.get(id))
    }

    /* ---------------------------- bulk transition -------------------------- */

    #[must_use]
    pub fn phase(&self) -> BulkPhase {
        if self.in_flight > 0 {
            BulkPhase::Committing
        } else if self.selection.is_empty() {
            BulkPhase::Idle
        } else {
            BulkPhase::Selecting
        }
    }

    /// Replace the status of every selected item with `status`, leave all
    /// other items untouched, then clear the selection.
    pub fn apply_status(&mut self, status: S) -> BulkReceipt<S> {
        let mut previous: Vec<(ItemId, S)> = Vec::with_capacity(self.selection.len());
        let selection = &self.selection;

        self.items = std::mem::take(&mut self.items)
            .into_iter()
            .map(|mut item| {
                if selection.has(&item.id) {
                    previous.push((item.id.clone(), item.status));
                    item.status = status;
                }
                item
            })
            .collect();

        self.selection.clear();
        self.refresh();

        info!(
            marker = "BULK_TRANSITION",
            operation_type = "list_state",
            screen = self.spec.title(),
            status = status.code(),
            count = previous.len(),
            "applied bulk status transition"
        );

        BulkReceipt { status, previous }
    }

    /// Status bound to `key`, applied to the selection. `None` when the key
    /// is unbound or nothing is selected.
    pub fn apply_shortcut(&mut self, key: char) -> Option<BulkReceipt<S>> {
        if self.selection.is_empty() {
            return None;
        }
        let status = self.spec.shortcuts.status_for(key)?;
        Some(self.apply_status(status))
    }

    pub const fn begin_commit(&mut self) {
        self.in_flight += 1;
    }

    pub const fn end_commit(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Revert items the backend rejected. An item is only reverted while it
    /// still carries the receipt's status; a later local edit wins.
    pub fn reconcile(&mut self, receipt: &BulkReceipt<S>, failed: &[ItemId]) -> usize {
        let mut reverted = 0;
        for (id, before) in &receipt.previous {
            if !failed.contains(id) {
                continue;
            }
            if let Some(item) = self.items.iter_mut().find(|item| item.id == *id)
                && item.status == receipt.status
            {
                item.status = *before;
                reverted += 1;
            }
        }

        if reverted > 0 {
            self.refresh();
        }
        reverted
    }

    /* --------------------------- edits and deletes ------------------------- */

    /// Replace one display field of `id`, returning the previous value.
    pub fn update_field(
        &mut self,
        id: &str,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, AppError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::UnknownItem(id.to_string()))?;

        let previous = item.set_field(field, value);
        self.refresh();
        Ok(previous)
    }

    pub fn insert(&mut self, item: ListItem<S>) -> Result<(), AppError> {
        if self.get(&item.id).is_some() {
            return Err(AppError::duplicate_id(self.spec.title(), item.id.as_str()));
        }
        self.items.push(item);
        self.refresh();
        Ok(())
    }

    /// Remove every item whose id is in `ids`; returns the removed items.
    pub fn remove<'a, I>(&mut self, ids: I) -> Vec<ListItem<S>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let doomed: AHashSet<&str> = ids.into_iter().collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| doomed.contains(item.id.as_str()));

        self.items = kept;
        self.refresh();

        info!(
            marker = "ITEMS_REMOVED",
            operation_type = "list_state",
            screen = self.spec.title(),
            count = removed.len(),
            "removed items"
        );
        removed
    }

    pub fn remove_selected(&mut self) -> Vec<ListItem<S>> {
        let ids: Vec<ItemId> = self.selection.ids().cloned().collect();
        self.remove(ids.iter().map(ItemId::as_str))
    }

    /* -------------------------------- export ------------------------------- */

    /// Write every filtered row (all pages) as CSV; returns the row count.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, AppError> {
        export::write_csv(writer, self.spec.columns, self.visible())
    }
}
