//! The pending analysis slot.
//!
//! Some view (a file picker, a drop target, the history list) decides what
//! should be analysed next and the analysis view picks it up. Last write wins.

use crate::metrics::Metrics;
use crate::models::PendingAnalysis;
use crate::state::{Cell, Subscription};
use camino::Utf8PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Single-slot holder of the next analysis target
#[derive(Clone)]
pub struct SelectionStore {
    cell: Cell<Option<PendingAnalysis>>,
    metrics: Arc<Metrics>,
}

impl SelectionStore {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            cell: Cell::new(None),
            metrics,
        }
    }

    pub fn get(&self) -> Option<PendingAnalysis> {
        self.cell.get()
    }

    pub fn is_pending(&self) -> bool {
        self.cell.read(Option::is_some)
    }

    /// Replace the slot, including clearing it with `None`.
    ///
    /// Observers are notified even when the new value equals the old one.
    pub fn set(&self, value: Option<PendingAnalysis>) {
        match &value {
            Some(pending) => tracing::debug!("Pending analysis set: {}", pending),
            None => tracing::debug!("Pending analysis cleared"),
        }
        self.cell.set(value);
        self.metrics.record_selection_change();
    }

    pub fn select_file(&self, path: impl Into<Utf8PathBuf>) {
        self.set(Some(PendingAnalysis::file(path)));
    }

    pub fn select_folder(&self, path: impl Into<Utf8PathBuf>) {
        self.set(Some(PendingAnalysis::folder(path)));
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// Hand the pending target to the caller and empty the slot.
    ///
    /// Observers are only notified if there was something to take.
    pub fn take(&self) -> Option<PendingAnalysis> {
        let mut taken = None;
        self.cell.update_if(|slot| {
            taken = slot.take();
            taken.is_some()
        });
        if let Some(pending) = &taken {
            tracing::debug!("Pending analysis taken: {}", pending);
            self.metrics.record_selection_change();
        }
        taken
    }

    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Option<PendingAnalysis>) + Send + Sync + 'static,
    {
        self.cell.subscribe(observer)
    }

    pub fn listen(&self) -> broadcast::Receiver<Option<PendingAnalysis>> {
        self.cell.listen()
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(Arc::new(Metrics::new()))
    }
}
