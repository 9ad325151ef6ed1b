//! Services module - the stores UI views consume.
//!
//! - [`SelectionStore`]: the pending analysis slot
//! - [`ThemeStore`]: light/dark theme, persisted and mirrored on the document root
//! - [`ToastQueue`]: ordered toast notifications with timed expiry
//! - [`Scheduler`]: one-shot timers used for toast expiry ([`TokioScheduler`] in
//!   the application, [`ManualScheduler`] for tests and headless hosts)
//!
//! The stores are framework-agnostic: they only know about [`crate::state::Cell`]
//! and the host ports in [`crate::ports`]. They do not depend on each other.

pub mod scheduler;
pub mod selection;
pub mod theme;
pub mod toast;

pub use scheduler::{ManualScheduler, Scheduler, Task, TimerHandle, TokioScheduler};
pub use selection::SelectionStore;
pub use theme::{THEME_STORAGE_KEY, ThemeStore};
pub use toast::ToastQueue;
