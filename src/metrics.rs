// Runtime metrics module
//
// Provides lightweight counters for the state stores

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for store activity
///
/// Uses atomic operations so timer tasks on tokio workers can record without locks.
/// One instance is owned by [`crate::context::AppContext`] and shared with every store;
/// the summary is logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Number of times the pending analysis slot was written
    pub selection_changes: AtomicU64,

    /// Number of theme changes (initial application included)
    pub theme_changes: AtomicU64,

    /// Number of persistence or document updates that failed
    pub side_effect_failures: AtomicU64,

    /// Total number of toasts posted
    pub toasts_posted: AtomicU64,

    /// Toasts removed by their expiry timer
    pub toasts_expired: AtomicU64,

    /// Toasts removed before expiry
    pub toasts_dismissed: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            selection_changes: AtomicU64::new(0),
            theme_changes: AtomicU64::new(0),
            side_effect_failures: AtomicU64::new(0),
            toasts_posted: AtomicU64::new(0),
            toasts_expired: AtomicU64::new(0),
            toasts_dismissed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_selection_change(&self) {
        self.selection_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_theme_change(&self) {
        self.theme_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_side_effect_failure(&self) {
        self.side_effect_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_toast_posted(&self) {
        self.toasts_posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_toast_expired(&self) {
        self.toasts_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_toast_dismissed(&self) {
        self.toasts_dismissed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Toasts posted but neither expired nor dismissed yet
    pub fn toasts_active(&self) -> u64 {
        let posted = self.toasts_posted.load(Ordering::Relaxed);
        let removed = self.toasts_expired.load(Ordering::Relaxed)
            + self.toasts_dismissed.load(Ordering::Relaxed);
        posted.saturating_sub(removed)
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== State Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Selection changes: {}, theme changes: {}, side effect failures: {}",
            self.selection_changes.load(Ordering::Relaxed),
            self.theme_changes.load(Ordering::Relaxed),
            self.side_effect_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Toasts: {} posted, {} expired, {} dismissed, {} active",
            self.toasts_posted.load(Ordering::Relaxed),
            self.toasts_expired.load(Ordering::Relaxed),
            self.toasts_dismissed.load(Ordering::Relaxed),
            self.toasts_active()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
