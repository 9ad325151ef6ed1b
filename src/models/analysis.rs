use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of filesystem target an analysis request points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    File,
    Folder,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::File => "file",
            AnalysisKind::Folder => "folder",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file or folder the user asked to analyse, waiting for the analysis view
/// to pick it up.
///
/// The path is stored as given. Nothing checks that it exists or that its
/// kind matches what is on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAnalysis {
    pub kind: AnalysisKind,
    pub path: Utf8PathBuf,
}

impl PendingAnalysis {
    pub fn new(kind: AnalysisKind, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn file(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(AnalysisKind::File, path)
    }

    pub fn folder(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(AnalysisKind::Folder, path)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl fmt::Display for PendingAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}
