// vulnscope - UI state core for the vulnscope C++ vulnerability analyzer
//
// This is the library crate holding the stores the views consume: the pending analysis
// slot, the persisted light/dark theme and the toast queue, plus the style configuration.
// The binary crate (main.rs) provides a headless console over the same stores.

pub mod config;
pub mod context;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use context::{AppContext, AppContextBuilder};
pub use metrics::Metrics;
pub use models::{
    AnalysisKind, AppSettings, DarkModeStrategy, PendingAnalysis, StyleConfig, Theme, Toast,
    ToastId, ToastKind,
};
pub use services::{ManualScheduler, Scheduler, SelectionStore, ThemeStore, ToastQueue, TokioScheduler};
pub use state::{Cell, Subscription};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
