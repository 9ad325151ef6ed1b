use crate::models::{AppSettings, StyleConfig};
use crate::ports::FileStore;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

/// Configuration manager for the YAML files in the configuration directory.
///
/// - `settings.yaml`: logging and toast settings ([`AppSettings`])
/// - `style.yaml`: content globs and dark-mode strategy ([`StyleConfig`])
/// - `preferences.yaml`: key-value preferences, opened as a [`FileStore`]
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    style_path: Utf8PathBuf,
    preferences_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("settings.yaml"),
            style_path: config_dir.join("style.yaml"),
            preferences_path: config_dir.join("preferences.yaml"),
            config_dir,
        })
    }

    /// Load `settings.yaml`, or defaults if it doesn't exist.
    pub fn load_settings(&self) -> Result<AppSettings> {
        load_yaml(&self.settings_path, "settings")
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        save_yaml(&self.settings_path, settings, "settings")
    }

    /// Load `style.yaml`, or defaults if it doesn't exist.
    pub fn load_style(&self) -> Result<StyleConfig> {
        load_yaml(&self.style_path, "style config")
    }

    pub fn save_style(&self, style: &StyleConfig) -> Result<()> {
        save_yaml(&self.style_path, style, "style config")
    }

    /// Open the preference file backing the theme store.
    pub fn open_preferences(&self) -> Result<FileStore> {
        FileStore::open(&self.preferences_path)
            .with_context(|| format!("Failed to open preferences: {}", self.preferences_path))
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn style_path(&self) -> &Utf8Path {
        &self.style_path
    }

    pub fn preferences_path(&self) -> &Utf8Path {
        &self.preferences_path
    }
}

fn load_yaml<T>(path: &Utf8Path, what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::warn!("{} file not found at {}, using defaults", what, path);
        return Ok(T::default());
    }

    let file_contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}: {}", what, path))?;

    let config: T = serde_yaml_ng::from_str(&file_contents)
        .with_context(|| format!("Failed to parse {}: {}", what, path))?;

    tracing::info!("Loaded {} from {}", what, path);
    Ok(config)
}

fn save_yaml<T: Serialize>(path: &Utf8Path, value: &T, what: &str) -> Result<()> {
    let yaml_string = serde_yaml_ng::to_string(value)
        .with_context(|| format!("Failed to serialize {} to YAML", what))?;

    fs::write(path, yaml_string).with_context(|| format!("Failed to write {}: {}", what, path))?;

    tracing::info!("Saved {} to {}", what, path);
    Ok(())
}
