//! One-shot timers with cancellation.
//!
//! Toast expiry is the only delayed work in the state core. It goes through the
//! [`Scheduler`] trait so tests (and hosts without a tokio runtime) can drive
//! time by hand with [`ManualScheduler`], while the application uses
//! [`TokioScheduler`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Work run once when a timer fires.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Register a callback to run once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// Cancellation handle for a scheduled task.
///
/// Dropping the handle does not cancel the timer; only [`cancel()`](Self::cancel) does.
/// Cancelling a timer that already fired is a no-op.
#[must_use = "a timer can only be cancelled through its handle"]
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl TimerHandle {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}

/// Timers backed by `tokio::time::sleep` on a runtime handle.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running in, if any.
    pub fn try_current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let abort = join.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    // Keyed by (deadline, registration order)
    timers: BTreeMap<(Duration, u64), Task>,
}

/// Virtual clock that only moves when [`advance()`](Self::advance) is called.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// Move the clock forward, running every task that falls due, in deadline
    /// order. Tasks may schedule further timers; those also run if they fall
    /// inside the window.
    ///
    /// # Returns
    /// The number of tasks that ran
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now.saturating_add(by);
        let mut fired = 0;

        loop {
            let task = {
                let mut clock = self.lock();
                let due = clock
                    .timers
                    .first_key_value()
                    .is_some_and(|((deadline, _), _)| *deadline <= target);
                if !due {
                    clock.now = target;
                    break;
                }
                match clock.timers.pop_first() {
                    Some(((deadline, _), task)) => {
                        clock.now = deadline;
                        task
                    }
                    None => continue,
                }
            };
            task();
            fired += 1;
        }

        fired
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let key = {
            let mut clock = self.lock();
            let key = (clock.now.saturating_add(delay), clock.next_seq);
            clock.next_seq += 1;
            clock.timers.insert(key, task);
            key
        };

        let weak = Arc::downgrade(&self.clock);
        TimerHandle::new(move || {
            if let Some(clock) = weak.upgrade() {
                clock
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .timers
                    .remove(&key);
            }
        })
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending", &clock.timers.len())
            .finish()
    }
}
