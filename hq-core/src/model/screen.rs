//! ``src/model/screen.rs``
//! ============================================================================
//! # `Screen`: status-erased list screen
//!
//! The front-end holds screens of different status types side by side, so it
//! talks to them through this object-safe trait. Reads return owned view
//! structs ready for rendering; writes go through [`ListCommand`].

use std::io::Write;

use crate::{
    error::AppError,
    model::{
        filter::{self, TabFilter},
        list_item::{ItemId, ItemStatus, ListItem},
        list_state::{BulkPhase, ListController},
        screen_spec::{Column, ScreenId},
    },
    tasks::sync_task::{SyncBatch, SyncReport},
};

/// Everything the keyboard can ask a list to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    CursorUp,
    CursorDown,
    NextPage,
    PrevPage,
    NextTab,
    PrevTab,
    PushSearch(char),
    PopSearch,
    SetSearch(String),
    ClearSearch,

    /// Advance the n-th dropdown filter of the screen.
    CycleDropdown(usize),
    ClearDropdowns,
    ToggleCursor,
    TogglePage,
    ClearSelection,
    ToggleExpand,
    OpenDetail,
    CloseDetail,

    /// Bulk transition bound to a shortcut letter.
    Shortcut(char),
    DeleteSelected,
    EditField {
        id: ItemId,
        field: String,
        value: String,
    },
}

/// What a command did, as far as the caller needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    Unchanged,
    Changed,

    /// Local transition applied; push this batch to the backend.
    Transitioned(SyncBatch),
    Removed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownView {
    pub field: &'static str,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: ItemId,
    pub status_code: &'static str,
    pub status_label: &'static str,

    /// One cell per screen column; missing fields render empty.
    pub cells: Vec<String>,
    pub selected: bool,
    pub expanded: bool,
    pub at_cursor: bool,

    /// Fields not shown as columns, for the expanded row.
    pub extra: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub page_count: usize,
    pub visible: usize,
    pub total: usize,
    pub selected: usize,
    pub page_fully_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: ItemId,
    pub status_code: &'static str,
    pub status_label: &'static str,
    pub fields: Vec<(String, String)>,
}

pub trait Screen: Send {
    fn id(&self) -> ScreenId;

    fn title(&self) -> &'static str {
        self.id().title()
    }

    fn columns(&self) -> &'static [Column];
    fn tabs(&self) -> Vec<TabView>;
    fn search(&self) -> &str;
    fn dropdowns(&self) -> Vec<DropdownView>;
    fn page_rows(&self) -> Vec<RowView>;
    fn page_info(&self) -> PageInfo;
    fn phase(&self) -> BulkPhase;

    /// Bound letters with the status label each applies.
    fn shortcuts(&self) -> Vec<(char, &'static str)>;

    fn has_shortcut(&self, key: char) -> bool;
    fn detail(&self) -> Option<DetailView>;

    fn selection_len(&self) -> usize {
        self.page_info().selected
    }

    fn apply(&mut self, command: ListCommand) -> Result<ListOutcome, AppError>;

    /// Fold a backend report back in; returns how many items were reverted.
    fn reconcile(&mut self, report: &SyncReport) -> Result<usize, AppError>;

    /// All filtered rows as CSV.
    fn export_csv(&self, writer: &mut dyn Write) -> Result<usize, AppError>;
}

fn extra_fields<S: ItemStatus>(item: &ListItem<S>, columns: &[Column]) -> Vec<(String, String)> {
    item.fields
        .iter()
        .filter(|(name, _)| !columns.iter().any(|col| col.field == name.as_str()))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

impl<S: ItemStatus> Screen for ListController<S> {
    fn id(&self) -> ScreenId {
        self.spec().id
    }

    fn columns(&self) -> &'static [Column] {
        self.spec().columns
    }

    fn tabs(&self) -> Vec<TabView> {
        let active: TabFilter<S> = self.filter().tab;
        filter::tab_counts(self.items(), self.filter(), self.spec().search_fields)
            .into_iter()
            .map(|(tab, count)| TabView {
                label: tab.label(),
                count,
                active: tab == active,
            })
            .collect()
    }

    fn search(&self) -> &str {
        &self.filter().search
    }

    fn dropdowns(&self) -> Vec<DropdownView> {
        self.spec()
            .dropdown_fields
            .iter()
            .map(|&field| DropdownView {
                field,
                value: self.filter().dropdown(field).map(str::to_string),
            })
            .collect()
    }

    fn page_rows(&self) -> Vec<RowView> {
        let columns = self.spec().columns;
        let cursor = self.cursor();

        self.page_items()
            .enumerate()
            .map(|(row, item)| {
                let expanded = self.expansion().is_expanded(&item.id);
                RowView {
                    id: item.id.clone(),
                    status_code: item.status.code(),
                    status_label: item.status.label(),
                    cells: columns
                        .iter()
                        .map(|col| item.field(col.field).unwrap_or_default().to_string())
                        .collect(),
                    selected: self.selection().has(&item.id),
                    expanded,
                    at_cursor: row == cursor,
                    extra: if expanded {
                        extra_fields(item, columns)
                    } else {
                        Vec::new()
                    },
                }
            })
            .collect()
    }

    fn page_info(&self) -> PageInfo {
        PageInfo {
            page: self.page(),
            page_count: self.page_count(),
            visible: self.visible_len(),
            total: self.items().len(),
            selected: self.selection().len(),
            page_fully_selected: self.page_fully_selected(),
        }
    }

    fn phase(&self) -> BulkPhase {
        ListController::phase(self)
    }

    fn shortcuts(&self) -> Vec<(char, &'static str)> {
        self.spec()
            .shortcuts
            .iter()
            .map(|(key, status)| (key, status.label()))
            .collect()
    }

    fn has_shortcut(&self, key: char) -> bool {
        self.spec().shortcuts.status_for(key).is_some()
    }

    fn detail(&self) -> Option<DetailView> {
        self.detail_item().map(|item| DetailView {
            id: item.id.clone(),
            status_code: item.status.code(),
            status_label: item.status.label(),
            fields: item
                .fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        })
    }

    fn apply(&mut self, command: ListCommand) -> Result<ListOutcome, AppError> {
        let outcome = match command {
            ListCommand::CursorUp => {
                self.cursor_up();
                ListOutcome::Changed
            }
            ListCommand::CursorDown => {
                self.cursor_down();
                ListOutcome::Changed
            }
            ListCommand::NextPage => {
                self.next_page();
                ListOutcome::Changed
            }
            ListCommand::PrevPage => {
                self.prev_page();
                ListOutcome::Changed
            }
            ListCommand::NextTab => {
                self.cycle_tab(true);
                ListOutcome::Changed
            }
            ListCommand::PrevTab => {
                self.cycle_tab(false);
                ListOutcome::Changed
            }
            ListCommand::PushSearch(ch) => {
                self.push_search(ch);
                ListOutcome::Changed
            }
            ListCommand::PopSearch => {
                self.pop_search();
                ListOutcome::Changed
            }
            ListCommand::SetSearch(query) => {
                self.set_search(query);
                ListOutcome::Changed
            }
            ListCommand::ClearSearch => {
                if self.filter().search.is_empty() {
                    ListOutcome::Unchanged
                } else {
                    self.set_search(String::new());
                    ListOutcome::Changed
                }
            }
            ListCommand::CycleDropdown(index) => {
                let Some(&field) = self.spec().dropdown_fields.get(index) else {
                    return Ok(ListOutcome::Unchanged);
                };
                self.cycle_dropdown(field)?;
                ListOutcome::Changed
            }
            ListCommand::ClearDropdowns => {
                let fields = self.spec().dropdown_fields;
                for &field in fields {
                    self.set_dropdown(field, None)?;
                }
                ListOutcome::Changed
            }
            ListCommand::ToggleCursor => match self.toggle_cursor() {
                Some(_) => ListOutcome::Changed,
                None => ListOutcome::Unchanged,
            },
            ListCommand::TogglePage => {
                if self.toggle_page().is_empty() {
                    ListOutcome::Unchanged
                } else {
                    ListOutcome::Changed
                }
            }
            ListCommand::ClearSelection => {
                self.clear_selection();
                ListOutcome::Changed
            }
            ListCommand::ToggleExpand => match self.toggle_expand_cursor() {
                Some(_) => ListOutcome::Changed,
                None => ListOutcome::Unchanged,
            },
            ListCommand::OpenDetail => match self.open_detail_cursor() {
                Some(_) => ListOutcome::Changed,
                None => ListOutcome::Unchanged,
            },
            ListCommand::CloseDetail => {
                self.close_detail();
                ListOutcome::Changed
            }
            ListCommand::Shortcut(key) => match self.apply_shortcut(key) {
                Some(receipt) if !receipt.is_empty() => {
                    self.begin_commit();
                    ListOutcome::Transitioned(SyncBatch::from_receipt(self.spec().id, &receipt))
                }
                _ => ListOutcome::Unchanged,
            },
            ListCommand::DeleteSelected => ListOutcome::Removed(self.remove_selected().len()),
            ListCommand::EditField { id, field, value } => {
                self.update_field(&id, &field, value)?;
                ListOutcome::Changed
            }
        };
        Ok(outcome)
    }

    fn reconcile(&mut self, report: &SyncReport) -> Result<usize, AppError> {
        self.end_commit();

        let receipt = report.batch.to_receipt::<S>().ok_or_else(|| {
            AppError::unknown_status(self.spec().title(), report.batch.status_code)
        })?;
        Ok(ListController::reconcile(self, &receipt, &report.failed_ids()))
    }

    fn export_csv(&self, writer: &mut dyn Write) -> Result<usize, AppError> {
        ListController::export_csv(self, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        model::{
            screen_spec::ScreenSpec,
            status::{EmployeeStatus, RequestStatus},
        },
    };

    fn regularization() -> Box<dyn Screen> {
        let cfg = Config::default();
        let spec = ScreenSpec::regularization(&cfg.screens.regularization, 2).unwrap();
        let items = vec![
            ListItem::new("R1", RequestStatus::Pending)
                .with_field("name", "Sarah Chen")
                .with_field("date", "2024-06-03")
                .with_field("department", "Engineering"),
            ListItem::new("R2", RequestStatus::Approved)
                .with_field("name", "Tom Becker")
                .with_field("date", "2024-06-01")
                .with_field("department", "Finance"),
            ListItem::new("R3", RequestStatus::Pending)
                .with_field("name", "Priya Nair")
                .with_field("date", "2024-06-05")
                .with_field("department", "Engineering"),
        ];
        Box::new(ListController::new(spec, items).unwrap())
    }

    #[test]
    fn test_rows_render_pending_first_by_recency() {
        let screen = regularization();
        let ids: Vec<_> = screen.page_rows().into_iter().map(|row| row.id).collect();
        assert_eq!(ids, vec!["R3", "R1"]);

        let info = screen.page_info();
        assert_eq!((info.page_count, info.visible, info.total), (2, 3, 3));
    }

    #[test]
    fn test_tabs_count_ignoring_active_tab() {
        let mut screen = regularization();
        screen.apply(ListCommand::NextTab).unwrap();

        let tabs = screen.tabs();
        assert_eq!(tabs[0].label, "All");
        assert_eq!(tabs[0].count, 3);
        assert!(tabs[1].active);
        assert_eq!((tabs[1].label, tabs[1].count), ("Pending", 2));
    }

    #[test]
    fn test_shortcut_yields_batch_and_commit_phase() {
        let mut screen = regularization();
        assert_eq!(screen.apply(ListCommand::Shortcut('a')).unwrap(), ListOutcome::Unchanged);

        screen.apply(ListCommand::ToggleCursor).unwrap();
        let ListOutcome::Transitioned(batch) = screen.apply(ListCommand::Shortcut('a')).unwrap() else {
            panic!("expected a transition");
        };
        assert_eq!(batch.status_code, "APPROVED");
        assert_eq!(batch.previous, vec![(ItemId::new("R3"), "PENDING")]);
        assert_eq!(screen.phase(), BulkPhase::Committing);

        let report = SyncReport {
            batch,
            failed: vec![(ItemId::new("R3"), AppError::backend("R3", "locked"))],
        };
        assert_eq!(screen.reconcile(&report).unwrap(), 1);
        assert_eq!(screen.phase(), BulkPhase::Idle);
        assert_eq!(screen.page_rows()[0].status_code, "PENDING");
    }

    #[test]
    fn test_reconcile_rejects_foreign_batch() {
        let cfg = Config::default();
        let spec = ScreenSpec::employees(&cfg.screens.employees, 5).unwrap();
        let mut screen: Box<dyn Screen> = Box::new(
            ListController::new(spec, vec![ListItem::new("E1", EmployeeStatus::Active)]).unwrap(),
        );

        let report = SyncReport {
            batch: SyncBatch {
                screen: ScreenId::Regularization,
                status_code: "APPROVED",
                previous: vec![(ItemId::new("E1"), "PENDING")],
            },
            failed: Vec::new(),
        };
        assert!(matches!(screen.reconcile(&report), Err(AppError::UnknownStatus { .. })));
    }

    #[test]
    fn test_expanded_row_lists_hidden_fields() {
        let cfg = Config::default();
        let spec = ScreenSpec::employees(&cfg.screens.employees, 5).unwrap();
        let mut screen: Box<dyn Screen> = Box::new(
            ListController::new(
                spec,
                vec![
                    ListItem::new("E1", EmployeeStatus::Active)
                        .with_field("name", "Ann")
                        .with_field("phone", "+1-555-0100"),
                ],
            )
            .unwrap(),
        );

        screen.apply(ListCommand::ToggleExpand).unwrap();
        let row = &screen.page_rows()[0];
        assert!(row.expanded);
        assert_eq!(row.extra, vec![("phone".to_string(), "+1-555-0100".to_string())]);
        assert_eq!(row.cells[0], "Ann");
    }

    #[test]
    fn test_dropdown_cycle_and_edit_through_commands() {
        let mut screen = regularization();

        assert_eq!(screen.apply(ListCommand::CycleDropdown(7)).unwrap(), ListOutcome::Unchanged);
        screen.apply(ListCommand::CycleDropdown(1)).unwrap();
        assert_eq!(screen.dropdowns()[1].value.as_deref(), Some("Engineering"));
        assert_eq!(screen.page_info().visible, 2);

        screen
            .apply(ListCommand::EditField {
                id: ItemId::new("R1"),
                field: "department".into(),
                value: "Finance".into(),
            })
            .unwrap();
        assert_eq!(screen.page_info().visible, 1);

        screen.apply(ListCommand::ClearDropdowns).unwrap();
        assert_eq!(screen.page_info().visible, 3);
    }
}
