//! Open/closed flags for every modal of a page.
//!
//! The keyboard dispatcher consults `any_open` before firing bulk
//! shortcuts, and Escape closes the top-most modal in `Modal::PRIORITY`
//! order.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Modal {
    ConfirmDelete = 0,
    Detail = 1,
    Help = 2,
}

impl Modal {
    /// Escape closes modals in this order.
    pub const PRIORITY: [Self; 3] = [Self::ConfirmDelete, Self::Detail, Self::Help];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ConfirmDelete => "Confirm Delete",
            Self::Detail => "Details",
            Self::Help => "Help",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalStack {
    open: u8,
}

impl ModalStack {
    #[must_use]
    pub const fn new() -> Self {
        Self { open: 0 }
    }

    pub const fn open(&mut self, modal: Modal) {
        self.open |= modal.bit();
    }

    pub const fn close(&mut self, modal: Modal) {
        self.open &= !modal.bit();
    }

    pub const fn toggle(&mut self, modal: Modal) {
        self.open ^= modal.bit();
    }

    #[must_use]
    pub const fn is_open(&self, modal: Modal) -> bool {
        self.open & modal.bit() != 0
    }

    #[must_use]
    pub const fn any_open(&self) -> bool {
        self.open != 0
    }

    /// Highest-priority open modal.
    #[must_use]
    pub fn top_most(&self) -> Option<Modal> {
        Modal::PRIORITY.into_iter().find(|modal| self.is_open(*modal))
    }

    /// Close and return the highest-priority open modal.
    pub fn close_top_most(&mut self) -> Option<Modal> {
        let top = self.top_most()?;
        self.close(top);
        Some(top)
    }

    pub const fn close_all(&mut self) {
        self.open = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_order_is_fixed() {
        let mut modals = ModalStack::new();
        modals.open(Modal::Help);
        modals.open(Modal::ConfirmDelete);
        modals.open(Modal::Detail);

        assert_eq!(modals.close_top_most(), Some(Modal::ConfirmDelete));
        assert_eq!(modals.close_top_most(), Some(Modal::Detail));
        assert_eq!(modals.close_top_most(), Some(Modal::Help));
        assert_eq!(modals.close_top_most(), None);
        assert!(!modals.any_open());
    }

    #[test]
    fn test_toggle_and_flags() {
        let mut modals = ModalStack::default();
        modals.toggle(Modal::Help);
        assert!(modals.is_open(Modal::Help));
        assert!(modals.any_open());

        modals.toggle(Modal::Help);
        assert!(!modals.any_open());
    }
}
