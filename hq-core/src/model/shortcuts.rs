//! Validated single-letter shortcut table of one screen.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::{error::AppError, model::list_item::ItemStatus};

/// Letters claimed by navigation and global bindings; a screen may not
/// bind these to a status.
pub const RESERVED_KEYS: &[char] = &['C', 'E', 'F', 'J', 'K', 'M', 'N', 'O', 'P', 'Q', 'V', 'X'];

/// Uppercase letter → status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutMap<S> {
    bindings: SmallVec<[(char, S); 4]>,
}

impl<S> Default for ShortcutMap<S> {
    fn default() -> Self {
        Self {
            bindings: SmallVec::new(),
        }
    }
}

impl<S: ItemStatus> ShortcutMap<S> {
    /// Build from `key -> status code` pairs as they appear in the config file.
    pub fn from_codes(pairs: &BTreeMap<String, String>, screen: &str) -> Result<Self, AppError> {
        let mut map = Self::default();
        for (key, code) in pairs {
            let letter = Self::parse_key(key)?;
            let status = S::from_code(code).ok_or_else(|| AppError::unknown_status(screen, code))?;
            map.bind(letter, status)?;
        }
        Ok(map)
    }

    pub fn bind(&mut self, key: char, status: S) -> Result<(), AppError> {
        let letter = key.to_ascii_uppercase();
        if !letter.is_ascii_alphabetic() {
            return Err(AppError::invalid_shortcut(key.to_string(), "must be a letter"));
        }
        if RESERVED_KEYS.contains(&letter) {
            return Err(AppError::invalid_shortcut(
                key.to_string(),
                "reserved for navigation",
            ));
        }
        if self.bindings.iter().any(|(bound, _)| *bound == letter) {
            return Err(AppError::invalid_shortcut(key.to_string(), "bound twice"));
        }

        self.bindings.push((letter, status));
        Ok(())
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn status_for(&self, key: char) -> Option<S> {
        let letter = key.to_ascii_uppercase();
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == letter)
            .map(|(_, status)| *status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, S)> + '_ {
        self.bindings.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn parse_key(key: &str) -> Result<char, AppError> {
        let mut chars = key.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Ok(letter),
            _ => Err(AppError::invalid_shortcut(key, "must be a single character")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::EmployeeStatus;

    fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, code)| ((*key).to_string(), (*code).to_string()))
            .collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map: ShortcutMap<EmployeeStatus> = ShortcutMap::from_codes(
            &pairs(&[("A", "ACTIVE"), ("l", "ON_LEAVE"), ("I", "INACTIVE")]),
            "employees",
        )
        .unwrap();

        assert_eq!(map.status_for('a'), Some(EmployeeStatus::Active));
        assert_eq!(map.status_for('L'), Some(EmployeeStatus::OnLeave));
        assert_eq!(map.status_for('z'), None);
    }

    #[test]
    fn test_invalid_bindings_rejected() {
        let reserved = ShortcutMap::<EmployeeStatus>::from_codes(&pairs(&[("q", "ACTIVE")]), "employees");
        assert!(matches!(reserved, Err(AppError::InvalidShortcut { .. })));

        let long = ShortcutMap::<EmployeeStatus>::from_codes(&pairs(&[("AL", "ACTIVE")]), "employees");
        assert!(long.is_err());

        let unknown = ShortcutMap::<EmployeeStatus>::from_codes(&pairs(&[("A", "RETIRED")]), "employees");
        assert!(matches!(unknown, Err(AppError::UnknownStatus { .. })));

        let twice = ShortcutMap::<EmployeeStatus>::from_codes(&pairs(&[("A", "ACTIVE"), ("a", "INACTIVE")]), "employees");
        assert!(twice.is_err());
    }
}
