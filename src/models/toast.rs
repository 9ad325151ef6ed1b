use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Lifetime of a toast when the caller does not pick one.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Error toasts stay up longer so they can actually be read.
pub const DEFAULT_ERROR_TOAST_DURATION: Duration = Duration::from_millis(4000);

/// Process-wide unique toast identifier, allocated from a counter starting at 0.
pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }

    /// Built-in lifetime for this kind: 4000 ms for errors, 3000 ms otherwise.
    pub fn default_duration(&self) -> Duration {
        match self {
            ToastKind::Error => DEFAULT_ERROR_TOAST_DURATION,
            ToastKind::Success | ToastKind::Info => DEFAULT_TOAST_DURATION,
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short-lived status message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(id: ToastId, message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            id,
            message: message.into(),
            kind,
        }
    }
}
