// Reactive state module
//
// This module provides Cell<T>, the observable single-value holder that backs the
// selection, theme and toast stores. Values live behind Arc<RwLock<T>>; every change
// is pushed to synchronous observers and to a tokio broadcast channel.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, ThreadId};
use tokio::sync::broadcast;

/// Buffer size of the broadcast channel returned by [`Cell::listen`]
const CHANGE_CHANNEL_CAPACITY: usize = 64;

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct ObserverEntry<T> {
    id: u64,
    // Sequence number of the value the observer was handed on subscribe
    since: u64,
    observer: Observer<T>,
}

struct Observers<T> {
    next_id: u64,
    entries: Vec<ObserverEntry<T>>,
}

/// Values written but not yet handed to observers, in write order.
struct Delivery<T> {
    pending: VecDeque<(u64, T)>,
    written: u64,
    delivered: u64,
    deliverer: Option<ThreadId>,
}

struct Inner<T> {
    value: RwLock<T>,
    observers: Mutex<Observers<T>>,
    delivery: Mutex<Delivery<T>>,
    // Signalled whenever `delivered` advances or `deliverer` is released
    progress: Condvar,
    change_tx: broadcast::Sender<T>,
}

/// Observable single-value holder
///
/// This is the building block of the UI state core:
/// - [`get()`](Self::get) / [`read()`](Self::read) for reading the current value
/// - [`set()`](Self::set) / [`update()`](Self::update) for mutations with notification
/// - [`subscribe()`](Self::subscribe) for synchronous observers that want the current
///   value immediately and then every later change, in order
/// - [`listen()`](Self::listen) for async consumers via a tokio broadcast channel
///
/// Observers run outside the value lock, so an observer may read the cell or write
/// to it again. A write made from inside an observer is queued and delivered after
/// the current round of notifications finishes. A write from another thread while a
/// round is running blocks until its own value has reached every observer, so
/// `set()` never returns before observers have seen the change it made.
///
/// Observers must not wait on another thread that is itself writing to the same cell.
///
/// # Related Types
///
/// - [`crate::services::selection::SelectionStore`]: `Cell<Option<PendingAnalysis>>`
/// - [`crate::services::theme::ThemeStore`]: `Cell<Theme>` plus persistence side effects
/// - [`crate::services::toast::ToastQueue`]: `Cell<Vec<Toast>>` plus expiry timers
pub struct Cell<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(value),
                observers: Mutex::new(Observers {
                    next_id: 0,
                    entries: Vec::new(),
                }),
                delivery: Mutex::new(Delivery {
                    pending: VecDeque::new(),
                    written: 0,
                    delivered: 0,
                    deliverer: None,
                }),
                progress: Condvar::new(),
                change_tx,
            }),
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> T {
        self.read(T::clone)
    }

    /// Execute a function with read access to the current value
    ///
    /// # Example
    /// ```ignore
    /// let count = toasts.read(|list| list.len());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&*value)
    }

    /// Replace the value unconditionally and notify observers
    pub fn set(&self, value: T) {
        self.update(move |current| *current = value);
    }

    /// Mutate the value in place and notify observers
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.update_if(|value| {
            f(value);
            true
        });
    }

    /// Mutate the value, notifying observers only if `f` reports a change
    ///
    /// # Returns
    /// Whatever `f` returned
    pub fn update_if<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut value = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
        if !f(&mut *value) {
            return false;
        }

        // Enqueue while still holding the write lock so queue order is write order
        let mut delivery = self.delivery();
        delivery.written += 1;
        let seq = delivery.written;
        delivery.pending.push_back((seq, T::clone(&value)));
        drop(value);

        let me = thread::current().id();
        let deliverer = delivery.deliverer;
        match deliverer {
            // Written by an observer: goes out after the current round
            Some(owner) if owner == me => {}
            Some(_) => {
                let _delivery = self
                    .inner
                    .progress
                    .wait_while(delivery, |d| d.delivered < seq)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            None => {
                delivery.deliverer = Some(me);
                drop(delivery);
                self.drain();
            }
        }
        true
    }

    /// Register an observer
    ///
    /// The observer is called right away with the current value, then once per
    /// later change until the returned [`Subscription`] is dropped or unsubscribed.
    /// Values written before the call but still waiting for delivery are not
    /// replayed to it.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let observer: Observer<T> = Arc::new(observer);
        let me = thread::current().id();

        let (id, current, claimed) = loop {
            let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
            let mut delivery = self.delivery();
            let deliverer = delivery.deliverer;
            if deliverer.is_some_and(|owner| owner != me) {
                // Let the other thread finish so the first value comes before any later one
                drop(value);
                let _delivery = self
                    .inner
                    .progress
                    .wait_while(delivery, |d| d.deliverer.is_some())
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }

            let mut observers = self.inner.observers.lock().unwrap_or_else(PoisonError::into_inner);
            let id = observers.next_id;
            observers.next_id += 1;
            observers.entries.push(ObserverEntry {
                id,
                since: delivery.written,
                observer: Arc::clone(&observer),
            });

            let claimed = deliverer.is_none();
            if claimed {
                delivery.deliverer = Some(me);
            }
            break (id, T::clone(&value), claimed);
        };

        observer(&current);
        if claimed {
            self.drain();
        }

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut observers = inner.observers.lock().unwrap_or_else(PoisonError::into_inner);
                observers.entries.retain(|entry| entry.id != id);
            }
        })
    }

    /// Subscribe to future values through a broadcast channel
    ///
    /// Unlike [`subscribe()`](Self::subscribe) the current value is not sent.
    pub fn listen(&self) -> broadcast::Receiver<T> {
        self.inner.change_tx.subscribe()
    }

    /// Number of registered synchronous observers
    pub fn observer_count(&self) -> usize {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn delivery(&self) -> MutexGuard<'_, Delivery<T>> {
        self.inner.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand out queued values until the queue is empty. Only the thread recorded
    /// as `deliverer` runs this.
    fn drain(&self) {
        let _release = ReleaseOnPanic(&*self.inner);
        loop {
            let (seq, next) = {
                let mut delivery = self.delivery();
                match delivery.pending.pop_front() {
                    Some(entry) => entry,
                    None => {
                        delivery.deliverer = None;
                        drop(delivery);
                        self.inner.progress.notify_all();
                        return;
                    }
                }
            };

            let observers: Vec<Observer<T>> = self
                .inner
                .observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .iter()
                .filter(|entry| entry.since < seq)
                .map(|entry| Arc::clone(&entry.observer))
                .collect();

            tracing::trace!("Notifying {} observers of change #{}", observers.len(), seq);
            for observer in observers {
                observer(&next);
            }

            // Ignore send errors - it's OK if no one is listening
            let _ = self.inner.change_tx.send(next);

            self.delivery().delivered = seq;
            self.inner.progress.notify_all();
        }
    }
}

/// Drops the rest of the queue and wakes blocked writers if an observer panics.
struct ReleaseOnPanic<'a, T>(&'a Inner<T>);

impl<T> Drop for ReleaseOnPanic<'_, T> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        let mut delivery = self.0.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        delivery.pending.clear();
        delivery.delivered = delivery.written;
        delivery.deliverer = None;
        drop(delivery);
        self.0.progress.notify_all();
    }
}

impl<T> Default for Cell<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

// Clones share the same value and observers
impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Cell").field("value", &*value).finish()
    }
}

/// Handle returned by [`Cell::subscribe`]
///
/// Dropping it unsubscribes. Values changed while unsubscribed are not replayed.
#[must_use = "dropping the subscription unsubscribes the observer"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
