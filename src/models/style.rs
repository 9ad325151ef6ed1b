//! Styling configuration consumed by the build-time utility-class scanner.
//!
//! The scanner only needs two things: which source files may contain class
//! names, and how dark mode is switched on. Dark mode is class driven here,
//! which is what [`crate::services::theme::ThemeStore`] relies on when it
//! toggles [`StyleConfig::dark_class`] on the document root.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker class put on the document root while the dark theme is active.
pub const DEFAULT_DARK_CLASS: &str = "dark";

/// How dark-mode rules are activated in generated stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkModeStrategy {
    /// Dark rules apply while the marker class is present on the root element.
    #[default]
    Class,
    /// Dark rules follow the OS `prefers-color-scheme` media query.
    Media,
}

#[derive(Error, Debug)]
pub enum StyleConfigError {
    #[error("Invalid content pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Glob patterns (relative to the project root) of files to scan.
    /// A leading `!` turns a pattern into an exclusion.
    #[serde(default = "default_content")]
    pub content: Vec<String>,

    #[serde(rename = "darkMode", default)]
    pub dark_mode: DarkModeStrategy,

    #[serde(rename = "darkClass", default = "default_dark_class")]
    pub dark_class: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            content: default_content(),
            dark_mode: DarkModeStrategy::Class,
            dark_class: default_dark_class(),
        }
    }
}

fn default_content() -> Vec<String> {
    vec!["./src/**/*.{html,js,svelte,ts}".to_string()]
}

fn default_dark_class() -> String {
    DEFAULT_DARK_CLASS.to_string()
}

/// Compiled form of the content patterns.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl ContentMatcher {
    /// Check a path relative to the project root.
    pub fn is_match(&self, path: impl AsRef<Utf8Path>) -> bool {
        let path = normalize(path.as_ref().as_str());
        self.include.is_match(path) && !self.exclude.is_match(path)
    }
}

impl StyleConfig {
    pub fn uses_class_strategy(&self) -> bool {
        self.dark_mode == DarkModeStrategy::Class
    }

    /// Compile the content globs. `*` does not cross `/`; `**` does.
    pub fn content_matcher(&self) -> Result<ContentMatcher, StyleConfigError> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for raw in &self.content {
            let (target, pattern) = match raw.strip_prefix('!') {
                Some(negated) => (&mut exclude, negated),
                None => (&mut include, raw.as_str()),
            };
            let glob = GlobBuilder::new(normalize(pattern))
                .literal_separator(true)
                .build()
                .map_err(|source| StyleConfigError::InvalidPattern {
                    pattern: raw.clone(),
                    source,
                })?;
            target.add(glob);
        }

        let build = |builder: GlobSetBuilder| {
            builder
                .build()
                .map_err(|source| StyleConfigError::InvalidPattern {
                    pattern: self.content.join(", "),
                    source,
                })
        };

        Ok(ContentMatcher {
            include: build(include)?,
            exclude: build(exclude)?,
        })
    }

    /// List the files under `root` the scanner would read, relative to `root`
    /// and sorted. Ignore files (`.gitignore`, `.ignore`) and hidden entries
    /// are skipped the same way the scanner skips them.
    pub fn collect_sources(&self, root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, StyleConfigError> {
        let matcher = self.content_matcher()?;
        let mut sources = Vec::new();

        for entry in WalkBuilder::new(root).build() {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let Some(relative) = Utf8Path::from_path(relative) else {
                tracing::debug!("Skipping non UTF-8 path: {}", entry.path().display());
                continue;
            };
            if matcher.is_match(relative) {
                sources.push(relative.to_path_buf());
            }
        }

        sources.sort();
        tracing::debug!("Collected {} style sources under {}", sources.len(), root);
        Ok(sources)
    }
}

fn normalize(pattern: &str) -> &str {
    pattern.strip_prefix("./").unwrap_or(pattern)
}
