//! ``src/model/screen_spec.rs``
//! ============================================================================
//! # Screen specifications
//!
//! Static description of each list screen: route, columns, searchable and
//! filterable fields, secondary sort, shortcut table and expansion policy.
//! The shortcut table and expansion policy come from configuration; the rest
//! is fixed per screen.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::ScreenConfig,
    error::AppError,
    model::{
        expansion::ExpansionPolicy,
        filter::{SearchFields, SortSpec},
        list_item::ItemStatus,
        shortcuts::ShortcutMap,
        status::{EmployeeStatus, RequestStatus},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    Regularization,
    ShiftSwap,
    Employees,
}

impl ScreenId {
    pub const ALL: [Self; 3] = [Self::Regularization, Self::ShiftSwap, Self::Employees];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Regularization => "Regularization Requests",
            Self::ShiftSwap => "Shift Swap Requests",
            Self::Employees => "Employee Directory",
        }
    }

    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Regularization => "/timesync/attendance/regularization",
            Self::ShiftSwap => "/timesync/roster/shift-swaps",
            Self::Employees => "/hq/employees",
        }
    }

    /// Stable slug used for export file names and config keys.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Regularization => "regularization",
            Self::ShiftSwap => "shift_swap",
            Self::Employees => "employees",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One table column bound to a display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub title: &'static str,

    /// Share of the table width, in percent.
    pub width: u16,
}

const fn col(field: &'static str, title: &'static str, width: u16) -> Column {
    Column { field, title, width }
}

#[derive(Debug, Clone)]
pub struct ScreenSpec<S> {
    pub id: ScreenId,
    pub columns: &'static [Column],
    pub search_fields: SearchFields,
    pub dropdown_fields: &'static [&'static str],
    pub sort: SortSpec,
    pub shortcuts: ShortcutMap<S>,
    pub expansion: ExpansionPolicy,
    pub page_size: usize,
}

impl<S: ItemStatus> ScreenSpec<S> {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.id.title()
    }

    #[must_use]
    pub fn has_dropdown(&self, field: &str) -> bool {
        self.dropdown_fields.contains(&field)
    }

    fn build(
        id: ScreenId,
        columns: &'static [Column],
        search_fields: SearchFields,
        dropdown_fields: &'static [&'static str],
        sort: SortSpec,
        cfg: &ScreenConfig,
        page_size: usize,
    ) -> Result<Self, AppError> {
        if page_size == 0 {
            return Err(AppError::InvalidConfig("page_size must be at least 1".into()));
        }

        Ok(Self {
            id,
            columns,
            search_fields,
            dropdown_fields,
            sort,
            shortcuts: ShortcutMap::from_codes(&cfg.shortcuts, id.title())?,
            expansion: ExpansionPolicy::from_single_flag(cfg.single_expansion),
            page_size,
        })
    }
}

const PENDING_FIRST: SortSpec = SortSpec {
    status_priority: true,
    recency_field: Some("date"),
};

const REGULARIZATION_COLUMNS: &[Column] = &[
    col("name", "Employee", 22),
    col("date", "Date", 12),
    col("type", "Type", 16),
    col("requested_in", "In", 8),
    col("requested_out", "Out", 8),
    col("reason", "Reason", 34),
];

const SHIFT_SWAP_COLUMNS: &[Column] = &[
    col("requester", "Requester", 20),
    col("counterpart", "Swap With", 20),
    col("date", "Date", 12),
    col("from_shift", "From Shift", 16),
    col("to_shift", "To Shift", 16),
    col("department", "Department", 16),
];

const EMPLOYEE_COLUMNS: &[Column] = &[
    col("name", "Name", 22),
    col("employee_id", "Emp ID", 10),
    col("department", "Department", 16),
    col("designation", "Designation", 20),
    col("location", "Location", 12),
    col("email", "Email", 20),
];

impl ScreenSpec<RequestStatus> {
    pub fn regularization(cfg: &ScreenConfig, page_size: usize) -> Result<Self, AppError> {
        Self::build(
            ScreenId::Regularization,
            REGULARIZATION_COLUMNS,
            &["name", "employee_id", "email"],
            &["type", "department"],
            PENDING_FIRST,
            cfg,
            page_size,
        )
    }

    pub fn shift_swap(cfg: &ScreenConfig, page_size: usize) -> Result<Self, AppError> {
        Self::build(
            ScreenId::ShiftSwap,
            SHIFT_SWAP_COLUMNS,
            &["requester", "counterpart"],
            &["department"],
            PENDING_FIRST,
            cfg,
            page_size,
        )
    }
}

impl ScreenSpec<EmployeeStatus> {
    pub fn employees(cfg: &ScreenConfig, page_size: usize) -> Result<Self, AppError> {
        Self::build(
            ScreenId::Employees,
            EMPLOYEE_COLUMNS,
            &["name", "employee_id", "email"],
            &["department", "location"],
            SortSpec::none(),
            cfg,
            page_size,
        )
    }
}
