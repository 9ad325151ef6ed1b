//! Application context owning one instance of every store.
//!
//! Views receive the context (or a clone of a single store) instead of
//! reaching for globals. Host capabilities are injected through the builder;
//! anything not provided falls back to the no-op port.

use crate::metrics::Metrics;
use crate::models::{AppSettings, StyleConfig};
use crate::ports::{DocumentRoot, NoopRoot, NoopStore, PreferenceStore};
use crate::services::{Scheduler, SelectionStore, ThemeStore, ToastQueue};
use std::sync::Arc;

pub struct AppContext {
    pub selection: SelectionStore,
    pub theme: ThemeStore,
    pub toasts: ToastQueue,
    pub style: StyleConfig,
    metrics: Arc<Metrics>,
}

impl AppContext {
    /// Start building a context. A scheduler is always required since toast
    /// expiry cannot be faked by a no-op.
    pub fn builder(scheduler: Arc<dyn Scheduler>) -> AppContextBuilder {
        AppContextBuilder {
            scheduler,
            storage: Arc::new(NoopStore),
            root: Arc::new(NoopRoot),
            settings: AppSettings::default(),
            style: StyleConfig::default(),
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

pub struct AppContextBuilder {
    scheduler: Arc<dyn Scheduler>,
    storage: Arc<dyn PreferenceStore>,
    root: Arc<dyn DocumentRoot>,
    settings: AppSettings,
    style: StyleConfig,
}

impl AppContextBuilder {
    pub fn storage(mut self, storage: Arc<dyn PreferenceStore>) -> Self {
        self.storage = storage;
        self
    }

    pub fn document_root(mut self, root: Arc<dyn DocumentRoot>) -> Self {
        self.root = root;
        self
    }

    pub fn settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn build(self) -> AppContext {
        let metrics = Arc::new(Metrics::new());

        if !self.style.uses_class_strategy() {
            tracing::warn!(
                "Dark mode strategy is {:?}; the root marker class will still be toggled but the stylesheet ignores it",
                self.style.dark_mode
            );
        }

        let selection = SelectionStore::new(Arc::clone(&metrics));
        let theme = ThemeStore::new(
            self.storage,
            self.root,
            self.style.dark_class.clone(),
            Arc::clone(&metrics),
        );
        let toasts = ToastQueue::new(self.scheduler, self.settings.toast, Arc::clone(&metrics));

        tracing::info!("Application context initialized");
        AppContext {
            selection,
            theme,
            toasts,
            style: self.style,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;
    use crate::ports::{ClassList, MemoryStore};
    use crate::services::ManualScheduler;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[test]
    fn test_default_ports() {
        let context = AppContext::builder(Arc::new(ManualScheduler::new())).build();

        assert_eq!(context.theme.get(), Theme::Dark);
        assert_eq!(context.selection.get(), None);
        assert!(context.toasts.is_empty());
        assert!(context.style.uses_class_strategy());
    }

    #[test]
    fn test_injected_ports() {
        let storage = Arc::new(MemoryStore::with_entry("theme", "light"));
        let root = Arc::new(ClassList::new());
        let context = AppContext::builder(Arc::new(ManualScheduler::new()))
            .storage(storage.clone())
            .document_root(root.clone())
            .build();

        assert_eq!(context.theme.get(), Theme::Light);
        context.theme.toggle();
        assert!(root.has_class("dark"));
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_stores_share_metrics() {
        let scheduler = ManualScheduler::new();
        let context = AppContext::builder(Arc::new(scheduler.clone())).build();

        context.selection.select_file("/a.cpp");
        context.toasts.success("Saved");
        scheduler.advance(Duration::from_secs(3));

        let metrics = context.metrics();
        assert_eq!(metrics.selection_changes.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.toasts_posted.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.toasts_expired.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.theme_changes.load(Ordering::Relaxed), 1);
    }
}
