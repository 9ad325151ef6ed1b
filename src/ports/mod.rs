//! Host capabilities the stores depend on.
//!
//! The theme store never checks what environment it runs in. It talks to a
//! [`PreferenceStore`] and a [`DocumentRoot`]; hosts without one of those
//! facilities hand in the no-op implementation instead.

pub mod document;
pub mod storage;

pub use document::{ClassList, DocumentRoot, NoopRoot};
pub use storage::{FileStore, MemoryStore, NoopStore, PreferenceStore, StorageError};
