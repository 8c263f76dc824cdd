//! Host-facing introspection interface
//!
//! Editors plug an engine in through [`IntrospectionProvider`] rather than by
//! depending on a concrete type.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::Result,
    snapshot::ParsedSnapshot,
    types::{Declaration, DocEntry, NestableRange},
};

/// Cheap, cloneable reference to one published snapshot.
///
/// A handle keeps its snapshot alive even after the file is re-parsed or
/// closed.
#[derive(Debug, Clone)]
pub struct SnapshotHandle(Arc<ParsedSnapshot>);

impl SnapshotHandle {
    pub fn new(snapshot: Arc<ParsedSnapshot>) -> Self {
        Self(snapshot)
    }

    pub fn file_path(&self) -> &Path {
        &self.0.file_path
    }

    /// Whether both handles point at the very same snapshot
    pub fn same_snapshot(&self, other: &SnapshotHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SnapshotHandle {
    type Target = ParsedSnapshot;

    fn deref(&self) -> &ParsedSnapshot {
        &self.0
    }
}

/// The operations an editor needs from an introspection engine
pub trait IntrospectionProvider: Send + Sync {
    /// Parse (or reuse) the snapshot for `path` with contents `text`
    fn parse_file(&self, path: &Path, text: &str) -> Result<SnapshotHandle>;

    /// Names visible at `line`, sorted by name
    fn query_variables(&self, handle: &SnapshotHandle, line: u32) -> Result<Vec<Declaration>>;

    fn query_documentation(&self, handle: &SnapshotHandle) -> Vec<DocEntry>;

    fn query_nestable_ranges(&self, handle: &SnapshotHandle) -> Vec<NestableRange>;

    /// Forget the cached snapshot for `path`
    fn close_file(&self, path: &Path);
}
