use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::toast::{DEFAULT_ERROR_TOAST_DURATION, DEFAULT_TOAST_DURATION, ToastKind};

/// Application settings from `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(rename = "Log Prefix", default = "default_log_prefix")]
    pub log_prefix: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Log", default = "default_true")]
    pub console_log: bool,

    #[serde(rename = "Toasts", default)]
    pub toast: ToastSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            debug_mode: false,
            console_log: true,
            toast: ToastSettings::default(),
        }
    }
}

/// Toast lifetimes in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastSettings {
    #[serde(rename = "Default Duration", default = "default_duration_ms")]
    pub default_duration_ms: u64,

    #[serde(rename = "Error Duration", default = "default_error_duration_ms")]
    pub error_duration_ms: u64,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
            error_duration_ms: default_error_duration_ms(),
        }
    }
}

impl ToastSettings {
    pub fn duration_for(&self, kind: ToastKind) -> Duration {
        match kind {
            ToastKind::Error => Duration::from_millis(self.error_duration_ms),
            ToastKind::Success | ToastKind::Info => Duration::from_millis(self.default_duration_ms),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "vulnscope".to_string()
}

fn default_true() -> bool {
    true
}

fn default_duration_ms() -> u64 {
    DEFAULT_TOAST_DURATION.as_millis() as u64
}

fn default_error_duration_ms() -> u64 {
    DEFAULT_ERROR_TOAST_DURATION.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_settings_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.log_dir, "logs");
        assert_eq!(settings.log_prefix, "vulnscope");
        assert!(!settings.debug_mode);
        assert!(settings.console_log);
    }

    #[test]
    fn test_toast_settings_match_kind_defaults() {
        let toast = ToastSettings::default();
        for kind in [ToastKind::Success, ToastKind::Error, ToastKind::Info] {
            assert_eq!(toast.duration_for(kind), kind.default_duration());
        }
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let settings: AppSettings =
            serde_yaml_ng::from_str("Debug Mode: true\nToasts:\n  Error Duration: 6000\n").unwrap();
        assert!(settings.debug_mode);
        assert_eq!(settings.toast.default_duration_ms, 3000);
        assert_eq!(settings.toast.error_duration_ms, 6000);
        assert_eq!(settings.log_dir, "logs");
    }
}
