//! Light/dark theme with persistence.
//!
//! Every theme change is written to the preference store under
//! [`THEME_STORAGE_KEY`] and mirrored on the document root by toggling the
//! dark marker class. Both side effects are best effort: a missing store or
//! document only means that effect is skipped.

use crate::metrics::Metrics;
use crate::models::Theme;
use crate::models::style::DEFAULT_DARK_CLASS;
use crate::ports::{DocumentRoot, PreferenceStore, StorageError};
use crate::state::{Cell, Subscription};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Preference key holding `"dark"` or `"light"`
pub const THEME_STORAGE_KEY: &str = "theme";

/// Observable theme with storage and document-root synchronisation
#[derive(Clone)]
pub struct ThemeStore {
    cell: Cell<Theme>,
    // Keeps the side-effect observer registered for the store's lifetime
    _sync: Arc<Subscription>,
}

impl ThemeStore {
    /// Load the stored preference (falling back to dark) and apply it.
    ///
    /// The side effects run once right away for the initial value, so storage
    /// and document root agree with the store from the start.
    pub fn new(
        storage: Arc<dyn PreferenceStore>,
        root: Arc<dyn DocumentRoot>,
        dark_class: impl Into<String>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let initial = load_theme(storage.as_ref());
        tracing::info!("Initial theme: {}", initial);

        let cell = Cell::new(initial);
        let dark_class = dark_class.into();
        let sync = cell.subscribe(move |theme: &Theme| {
            metrics.record_theme_change();
            apply_theme(*theme, storage.as_ref(), root.as_ref(), &dark_class, &metrics);
        });

        Self {
            cell,
            _sync: Arc::new(sync),
        }
    }

    /// Store with the default `"dark"` marker class
    pub fn with_defaults(storage: Arc<dyn PreferenceStore>, root: Arc<dyn DocumentRoot>) -> Self {
        Self::new(storage, root, DEFAULT_DARK_CLASS, Arc::new(Metrics::new()))
    }

    pub fn get(&self) -> Theme {
        self.cell.get()
    }

    /// Switch to `theme`. Setting the active theme again changes nothing.
    ///
    /// # Returns
    /// `true` if the theme changed
    pub fn set(&self, theme: Theme) -> bool {
        let changed = self.cell.update_if(|current| {
            if *current == theme {
                return false;
            }
            *current = theme;
            true
        });
        if changed {
            tracing::info!("Theme changed to {}", theme);
        }
        changed
    }

    /// Flip between dark and light
    ///
    /// # Returns
    /// The new theme
    pub fn toggle(&self) -> Theme {
        let mut next = Theme::default();
        self.cell.update(|current| {
            *current = current.toggled();
            next = *current;
        });
        tracing::info!("Theme toggled to {}", next);
        next
    }

    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Theme) + Send + Sync + 'static,
    {
        self.cell.subscribe(observer)
    }

    pub fn listen(&self) -> broadcast::Receiver<Theme> {
        self.cell.listen()
    }
}

/// Read the stored preference. Missing or unknown values mean dark.
pub fn load_theme(storage: &dyn PreferenceStore) -> Theme {
    match storage.get(THEME_STORAGE_KEY) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored theme preference: {}", e);
            Theme::default()
        }),
        None => {
            tracing::debug!("No stored theme preference, using {}", Theme::default());
            Theme::default()
        }
    }
}

fn apply_theme(
    theme: Theme,
    storage: &dyn PreferenceStore,
    root: &dyn DocumentRoot,
    dark_class: &str,
    metrics: &Metrics,
) {
    match storage.set(THEME_STORAGE_KEY, theme.as_str()) {
        Ok(()) => {}
        Err(StorageError::Unavailable) => {
            tracing::debug!("Preference storage unavailable, theme not persisted");
        }
        Err(e) => {
            tracing::warn!("Failed to persist theme {}: {}", theme, e);
            metrics.record_side_effect_failure();
        }
    }

    root.set_class(dark_class, theme.is_dark());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::document::MockDocumentRoot;
    use crate::ports::storage::MockPreferenceStore;
    use crate::ports::{ClassList, MemoryStore, NoopRoot, NoopStore};
    use mockall::predicate::eq;
    use std::sync::atomic::Ordering;

    fn memory_store(storage: &Arc<MemoryStore>, root: &Arc<ClassList>) -> ThemeStore {
        ThemeStore::with_defaults(Arc::clone(storage) as Arc<dyn PreferenceStore>, Arc::clone(root) as Arc<dyn DocumentRoot>)
    }

    #[test]
    fn test_defaults_to_dark_without_preference() {
        let storage = Arc::new(MemoryStore::new());
        let root = Arc::new(ClassList::new());
        let store = memory_store(&storage, &root);

        assert_eq!(store.get(), Theme::Dark);
        // Initial value is applied right away
        assert_eq!(storage.get(THEME_STORAGE_KEY).as_deref(), Some("dark"));
        assert!(root.has_class("dark"));
    }

    #[test]
    fn test_uses_stored_preference() {
        let storage = Arc::new(MemoryStore::with_entry(THEME_STORAGE_KEY, "light"));
        let root = Arc::new(ClassList::new());
        let store = memory_store(&storage, &root);

        assert_eq!(store.get(), Theme::Light);
        assert!(!root.has_class("dark"));
    }

    #[test]
    fn test_invalid_preference_falls_back_to_dark() {
        let storage = Arc::new(MemoryStore::with_entry(THEME_STORAGE_KEY, "solarized"));
        let root = Arc::new(ClassList::new());
        let store = memory_store(&storage, &root);

        assert_eq!(store.get(), Theme::Dark);
        assert_eq!(storage.get(THEME_STORAGE_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_toggle_persists_and_updates_root() {
        let storage = Arc::new(MemoryStore::new());
        let root = Arc::new(ClassList::new());
        let store = memory_store(&storage, &root);

        assert_eq!(store.toggle(), Theme::Light);
        assert_eq!(storage.get(THEME_STORAGE_KEY).as_deref(), Some("light"));
        assert!(!root.has_class("dark"));

        assert_eq!(store.toggle(), Theme::Dark);
        assert_eq!(storage.get(THEME_STORAGE_KEY).as_deref(), Some("dark"));
        assert!(root.has_class("dark"));
    }

    #[test]
    fn test_set_same_theme_is_not_a_change() {
        let metrics = Arc::new(Metrics::new());
        let store = ThemeStore::new(Arc::new(MemoryStore::new()), Arc::new(NoopRoot), "dark", Arc::clone(&metrics));

        assert!(!store.set(Theme::Dark));
        assert!(store.set(Theme::Light));
        assert_eq!(metrics.theme_changes.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_missing_environment_degrades_silently() {
        let metrics = Arc::new(Metrics::new());
        let store = ThemeStore::new(Arc::new(NoopStore), Arc::new(NoopRoot), "dark", Arc::clone(&metrics));

        assert_eq!(store.get(), Theme::Dark);
        assert_eq!(store.toggle(), Theme::Light);
        assert_eq!(store.get(), Theme::Light);
        assert_eq!(metrics.side_effect_failures.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_storage_failure_is_counted_not_raised() {
        let mut storage = MockPreferenceStore::new();
        storage.expect_get().returning(|_| None);
        storage.expect_set().returning(|_, _| {
            Err(StorageError::Io {
                path: "prefs.yaml".into(),
                source: std::io::Error::other("disk full"),
            })
        });
        let metrics = Arc::new(Metrics::new());
        let store = ThemeStore::new(Arc::new(storage), Arc::new(NoopRoot), "dark", Arc::clone(&metrics));

        store.toggle();

        assert_eq!(store.get(), Theme::Light);
        assert_eq!(metrics.side_effect_failures.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_custom_marker_class() {
        let mut root = MockDocumentRoot::new();
        root.expect_set_class()
            .with(eq("theme-dark"), eq(true))
            .times(1)
            .return_const(());
        root.expect_set_class()
            .with(eq("theme-dark"), eq(false))
            .times(1)
            .return_const(());

        let store = ThemeStore::new(Arc::new(NoopStore), Arc::new(root), "theme-dark", Arc::new(Metrics::new()));
        store.set(Theme::Light);
    }

    #[test]
    fn test_observers_see_each_theme() {
        let store = ThemeStore::with_defaults(Arc::new(NoopStore), Arc::new(NoopRoot));
        let mut rx = store.listen();

        store.toggle();
        store.toggle();

        assert_eq!(rx.try_recv().unwrap(), Theme::Light);
        assert_eq!(rx.try_recv().unwrap(), Theme::Dark);
    }
}
