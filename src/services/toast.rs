//! Toast notifications that remove themselves after a delay.
//!
//! Toasts are kept in posting order. Each `post` allocates the next id from
//! the queue's counter (0, 1, 2, ... never reused) and schedules exactly one
//! expiry timer. Expiry and [`ToastQueue::dismiss`] both remove by id and are
//! no-ops when the toast is already gone.

use crate::metrics::Metrics;
use crate::models::{Toast, ToastId, ToastKind, ToastSettings};
use crate::services::scheduler::{Scheduler, TimerHandle};
use crate::state::{Cell, Subscription};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;

/// Ordered list of active toasts with automatic expiry
#[derive(Clone)]
pub struct ToastQueue {
    toasts: Cell<Vec<Toast>>,
    next_id: Arc<AtomicU64>,
    timers: Arc<Mutex<HashMap<ToastId, TimerHandle>>>,
    scheduler: Arc<dyn Scheduler>,
    durations: ToastSettings,
    metrics: Arc<Metrics>,
}

impl ToastQueue {
    pub fn new(scheduler: Arc<dyn Scheduler>, durations: ToastSettings, metrics: Arc<Metrics>) -> Self {
        Self {
            toasts: Cell::new(Vec::new()),
            next_id: Arc::new(AtomicU64::new(0)),
            timers: Arc::new(Mutex::new(HashMap::new())),
            scheduler,
            durations,
            metrics,
        }
    }

    /// Queue with the built-in 3000 ms / 4000 ms lifetimes
    pub fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::new(scheduler, ToastSettings::default(), Arc::new(Metrics::new()))
    }

    /// Append a toast and schedule its removal after `duration`.
    ///
    /// # Returns
    /// The id of the new toast
    pub fn post(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> ToastId {
        let message = message.into();
        let mut id = 0;
        // Allocate under the cell's write lock so ids in the list stay ascending
        self.toasts.update(|list| {
            id = self.next_id.fetch_add(1, Ordering::Relaxed);
            list.push(Toast::new(id, message, kind));
        });
        self.metrics.record_toast_posted();
        tracing::debug!("Posted {} toast #{} for {:?}", kind, id, duration);

        let toasts = self.toasts.clone();
        let timers = Arc::clone(&self.timers);
        let metrics = Arc::clone(&self.metrics);

        // Hold the timer map while scheduling so a zero-length timer cannot
        // fire before its handle is recorded
        let mut pending = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = self.scheduler.schedule(
            duration,
            Box::new(move || {
                timers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
                if remove_toast(&toasts, id) {
                    metrics.record_toast_expired();
                    tracing::debug!("Toast #{} expired", id);
                }
            }),
        );
        pending.insert(id, handle);

        id
    }

    /// Post an [`ToastKind::Info`] toast with the default lifetime
    pub fn post_default(&self, message: impl Into<String>) -> ToastId {
        self.toast(message, ToastKind::default())
    }

    /// Post with the configured lifetime for `kind`
    pub fn toast(&self, message: impl Into<String>, kind: ToastKind) -> ToastId {
        self.post(message, kind, self.durations.duration_for(kind))
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.toast(message, ToastKind::Success)
    }

    /// Error toasts use the longer error lifetime (4000 ms by default)
    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.toast(message, ToastKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.toast(message, ToastKind::Info)
    }

    /// Remove a toast before it expires and cancel its timer.
    ///
    /// # Returns
    /// `false` if no toast with that id was active
    pub fn dismiss(&self, id: ToastId) -> bool {
        let handle = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if let Some(handle) = handle {
            handle.cancel();
        }

        let removed = remove_toast(&self.toasts, id);
        if removed {
            self.metrics.record_toast_dismissed();
            tracing::debug!("Toast #{} dismissed", id);
        }
        removed
    }

    /// Dismiss every active toast
    pub fn clear(&self) {
        let handles: Vec<TimerHandle> = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        for handle in handles {
            handle.cancel();
        }

        let mut cleared = 0;
        self.toasts.update_if(|list| {
            cleared = list.len();
            list.clear();
            cleared > 0
        });
        for _ in 0..cleared {
            self.metrics.record_toast_dismissed();
        }
        if cleared > 0 {
            tracing::debug!("Cleared {} toasts", cleared);
        }
    }

    /// Snapshot of the active toasts, oldest first
    pub fn get(&self) -> Vec<Toast> {
        self.toasts.get()
    }

    pub fn len(&self) -> usize {
        self.toasts.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.read(Vec::is_empty)
    }

    /// Number of expiry timers still armed
    pub fn pending_timers(&self) -> usize {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Vec<Toast>) + Send + Sync + 'static,
    {
        self.toasts.subscribe(observer)
    }

    pub fn listen(&self) -> broadcast::Receiver<Vec<Toast>> {
        self.toasts.listen()
    }
}

/// Remove the toast with `id`, keeping the others in order. Observers are
/// only notified when something was removed.
fn remove_toast(toasts: &Cell<Vec<Toast>>, id: ToastId) -> bool {
    toasts.update_if(|list| {
        let before = list.len();
        list.retain(|toast| toast.id != id);
        list.len() != before
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scheduler::ManualScheduler;

    fn manual_queue() -> (ToastQueue, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let queue = ToastQueue::with_scheduler(Arc::new(scheduler.clone()));
        (queue, scheduler)
    }

    fn ids(queue: &ToastQueue) -> Vec<ToastId> {
        queue.get().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_post_appends_entry() {
        let (queue, _scheduler) = manual_queue();

        let id = queue.toast("Saved", ToastKind::Success);

        assert_eq!(id, 0);
        assert_eq!(queue.get(), vec![Toast::new(0, "Saved", ToastKind::Success)]);
    }

    #[test]
    fn test_expires_after_default_duration() {
        let (queue, scheduler) = manual_queue();
        queue.success("Saved");

        scheduler.advance(Duration::from_millis(2999));
        assert_eq!(queue.len(), 1);

        scheduler.advance(Duration::from_millis(1));
        assert!(queue.is_empty());
        assert_eq!(queue.pending_timers(), 0);
    }

    #[test]
    fn test_error_lives_longer() {
        let (queue, scheduler) = manual_queue();
        queue.error("Failed");
        assert_eq!(queue.get()[0].kind, ToastKind::Error);

        scheduler.advance(Duration::from_millis(3000));
        assert_eq!(queue.len(), 1);

        scheduler.advance(Duration::from_millis(1000));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ids_never_reused() {
        let (queue, scheduler) = manual_queue();
        queue.info("a");
        queue.info("b");
        scheduler.advance(Duration::from_secs(5));
        assert!(queue.is_empty());

        assert_eq!(queue.info("c"), 2);
    }

    #[test]
    fn test_expiry_preserves_order() {
        let (queue, scheduler) = manual_queue();
        queue.post("slow", ToastKind::Info, Duration::from_millis(500));
        queue.post("fast", ToastKind::Info, Duration::from_millis(100));
        queue.post("slower", ToastKind::Info, Duration::from_millis(900));

        scheduler.advance(Duration::from_millis(100));

        assert_eq!(ids(&queue), vec![0, 2]);
    }

    #[test]
    fn test_dismiss_cancels_timer() {
        let (queue, scheduler) = manual_queue();
        let id = queue.info("bye");
        queue.info("stay");

        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(ids(&queue), vec![1]);
    }

    #[test]
    fn test_dismiss_unknown_id_is_noop() {
        let (queue, _scheduler) = manual_queue();
        queue.info("a");
        let mut rx = queue.listen();

        assert!(!queue.dismiss(42));
        assert_eq!(queue.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_post_default_is_info() {
        let (queue, scheduler) = manual_queue();

        let id = queue.post_default("Heads up");

        assert_eq!(queue.get(), vec![Toast::new(id, "Heads up", ToastKind::Info)]);
        scheduler.advance(Duration::from_millis(3000));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_missing_id_leaves_list_untouched() {
        let (queue, _scheduler) = manual_queue();
        queue.info("a");
        queue.error("b");
        let before = queue.get();
        let mut rx = queue.listen();

        assert!(!remove_toast(&queue.toasts, 7));

        assert_eq!(queue.get(), before);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_expiry_after_removal_is_noop() {
        let metrics = Arc::new(Metrics::new());
        let scheduler = ManualScheduler::new();
        let queue = ToastQueue::new(Arc::new(scheduler.clone()), ToastSettings::default(), Arc::clone(&metrics));
        let gone = queue.info("gone");
        queue.error("kept");

        // Removed without cancelling, so the timer still fires at 3000 ms
        assert!(remove_toast(&queue.toasts, gone));
        let before = queue.get();
        let mut rx = queue.listen();

        assert_eq!(scheduler.advance(Duration::from_millis(3000)), 1);

        assert_eq!(queue.get(), before);
        assert!(rx.try_recv().is_err());
        assert_eq!(metrics.toasts_expired.load(Ordering::Relaxed), 0);
        assert_eq!(queue.pending_timers(), 1);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let (queue, scheduler) = manual_queue();
        queue.info("a");
        queue.error("b");

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(queue.pending_timers(), 0);
    }

    #[test]
    fn test_configured_durations() {
        let scheduler = ManualScheduler::new();
        let settings = ToastSettings {
            default_duration_ms: 100,
            error_duration_ms: 200,
        };
        let queue = ToastQueue::new(Arc::new(scheduler.clone()), settings, Arc::new(Metrics::new()));
        queue.info("a");
        queue.error("b");

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(ids(&queue), vec![1]);
        scheduler.advance(Duration::from_millis(100));
        assert!(queue.is_empty());
    }
}
