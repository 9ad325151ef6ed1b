//! Data models for the vulnscope UI state core.
//!
//! - [`PendingAnalysis`]: A file or folder queued for analysis
//! - [`Theme`]: The light/dark visual theme
//! - [`Toast`]: A transient notification, with its [`ToastKind`]
//! - [`StyleConfig`]: Content globs and dark-mode strategy for the style scanner
//! - [`AppSettings`]: Logging and toast settings loaded from `settings.yaml`
//!
//! All models are plain data. Mutation and change notification live in
//! [`crate::services`], on top of [`crate::state::Cell`].

pub mod analysis;
pub mod settings;
pub mod style;
pub mod theme;
pub mod toast;

pub use analysis::{AnalysisKind, PendingAnalysis};
pub use settings::{AppSettings, ToastSettings};
pub use style::{ContentMatcher, DarkModeStrategy, StyleConfig, StyleConfigError};
pub use theme::{ParseThemeError, Theme};
pub use toast::{Toast, ToastId, ToastKind};
