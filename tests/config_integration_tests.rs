//! Integration tests for ConfigManager and the style configuration
//!
//! These tests verify:
//! - Default settings and style when no files exist
//! - Settings flowing into the toast queue durations
//! - Style source collection over a real directory tree

use camino::Utf8PathBuf;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vulnscope::models::ToastSettings;
use vulnscope::{AppContext, AppSettings, ConfigManager, DarkModeStrategy, ManualScheduler, StyleConfig};

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

// Non-hidden prefix: the walker skips hidden entries
fn create_source_tree() -> (TempDir, Utf8PathBuf) {
    let temp_dir = tempfile::Builder::new().prefix("vulnscope-src").tempdir().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn touch(root: &Utf8PathBuf, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

#[test]
fn test_defaults_without_files() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.toast.default_duration_ms, 3000);
    assert_eq!(settings.toast.error_duration_ms, 4000);

    let style = manager.load_style().unwrap();
    assert_eq!(style.dark_mode, DarkModeStrategy::Class);
    assert_eq!(style.dark_class, "dark");
}

#[test]
fn test_settings_drive_toast_durations() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    manager
        .save_settings(&AppSettings {
            toast: ToastSettings {
                default_duration_ms: 1000,
                error_duration_ms: 1500,
            },
            ..AppSettings::default()
        })
        .unwrap();

    let scheduler = ManualScheduler::new();
    let context = AppContext::builder(Arc::new(scheduler.clone()))
        .settings(manager.load_settings().unwrap())
        .build();
    context.toasts.success("ok");
    context.toasts.error("bad");

    scheduler.advance(Duration::from_millis(1000));
    assert_eq!(context.toasts.len(), 1);
    scheduler.advance(Duration::from_millis(500));
    assert!(context.toasts.is_empty());
}

#[test]
fn test_handwritten_style_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(
        manager.style_path(),
        "darkMode: class\ndarkClass: theme-dark\ncontent:\n  - \"./src/**/*.{html,js,svelte,ts}\"\n",
    )
    .unwrap();

    let style = manager.load_style().unwrap();
    assert_eq!(style.dark_class, "theme-dark");
    assert!(style.uses_class_strategy());
}

#[test]
fn test_collect_sources() {
    let (_temp_dir, root) = create_source_tree();
    touch(&root, "src/app.html");
    touch(&root, "src/routes/+page.svelte");
    touch(&root, "src/lib/toast.ts");
    touch(&root, "src/lib/app.css");
    touch(&root, "node_modules/pkg/src/index.js");
    touch(&root, "README.md");

    let sources = StyleConfig::default().collect_sources(&root).unwrap();

    assert_eq!(
        sources,
        vec![
            Utf8PathBuf::from("src/app.html"),
            Utf8PathBuf::from("src/lib/toast.ts"),
            Utf8PathBuf::from("src/routes/+page.svelte"),
        ]
    );
}

#[test]
fn test_collect_sources_with_exclusion() {
    let (_temp_dir, root) = create_source_tree();
    touch(&root, "src/lib/theme.ts");
    touch(&root, "src/lib/theme.test.ts");

    let style = StyleConfig {
        content: vec!["src/**/*.ts".to_string(), "!src/**/*.test.ts".to_string()],
        ..StyleConfig::default()
    };

    assert_eq!(
        style.collect_sources(&root).unwrap(),
        vec![Utf8PathBuf::from("src/lib/theme.ts")]
    );
}
