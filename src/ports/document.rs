//! The document root whose class list drives class-based dark mode.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

#[cfg_attr(test, mockall::automock)]
pub trait DocumentRoot: Send + Sync {
    /// Add `class` when `present` is true, remove it otherwise.
    fn set_class(&self, class: &str, present: bool);

    fn has_class(&self, class: &str) -> bool;
}

/// Stand-in for hosts without a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRoot;

impl DocumentRoot for NoopRoot {
    fn set_class(&self, _class: &str, _present: bool) {}

    fn has_class(&self, _class: &str) -> bool {
        false
    }
}

/// In-memory class list for headless hosts.
#[derive(Debug, Default)]
pub struct ClassList {
    classes: Mutex<BTreeSet<String>>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current classes, sorted.
    pub fn classes(&self) -> Vec<String> {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl DocumentRoot for ClassList {
    fn set_class(&self, class: &str, present: bool) {
        let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
        if present {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_toggle() {
        let root = ClassList::new();

        root.set_class("dark", true);
        root.set_class("dark", true);
        assert!(root.has_class("dark"));
        assert_eq!(root.classes(), vec!["dark".to_string()]);

        root.set_class("dark", false);
        assert!(!root.has_class("dark"));

        // Removing an absent class is fine
        root.set_class("dark", false);
        assert!(root.classes().is_empty());
    }

    #[test]
    fn test_noop_root() {
        let root = NoopRoot;
        root.set_class("dark", true);
        assert!(!root.has_class("dark"));
    }
}
