//! Status enumerations for the workforce screens.

use std::{fmt, str::FromStr};

use crate::{error::AppError, model::list_item::ItemStatus};

/// Approval workflow shared by regularization and shift-swap requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl ItemStatus for RequestStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Approved, Self::Rejected];

    fn code(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    // Pending work first.
    fn priority(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Rejected => 1,
            Self::Approved => 2,
        }
    }
}

/// Employment state in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Inactive,
}

impl ItemStatus for EmployeeStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::OnLeave, Self::Inactive];

    fn code(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::OnLeave => "ON_LEAVE",
            Self::Inactive => "INACTIVE",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnLeave => "On Leave",
            Self::Inactive => "Inactive",
        }
    }

    fn priority(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::OnLeave => 1,
            Self::Inactive => 2,
        }
    }
}

macro_rules! status_text_impls {
    ($status:ty, $screen:literal) => {
        impl fmt::Display for $status {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $status {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s).ok_or_else(|| AppError::unknown_status($screen, s))
            }
        }
    };
}

status_text_impls!(RequestStatus, "request");
status_text_impls!(EmployeeStatus, "employee");
