use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::{
    error::{Error, Result},
    parser::{SourceParser, content_hash},
    snapshot::ParsedSnapshot,
};

/// Lifecycle of one file path inside the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unparsed,
    Parsed,
    Evicted,
}

#[derive(Debug)]
struct Entries {
    snapshots: LruCache<PathBuf, Arc<ParsedSnapshot>>,
    /// Recently dropped paths, remembered up to the snapshot capacity
    evicted: LruCache<PathBuf, ()>,
}

/// Most recent snapshot per file path, bounded by an LRU policy.
///
/// Parses of the same path are serialized by a per-path lock. Parses of
/// different paths and all reads proceed independently; a snapshot is
/// published by swapping the `Arc` held in the cache, so a reader keeps
/// whatever snapshot it already has. A path's lock lives only while the
/// path is cached or a parse of it is in flight.
#[derive(Debug)]
pub struct ParseSessionCache {
    parser: SourceParser,
    entries: Mutex<Entries>,
    parse_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Nothing in the cache is left half-updated across a panic
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ParseSessionCache {
    pub fn new(parser: SourceParser, capacity: NonZeroUsize) -> Self {
        Self {
            parser,
            entries: Mutex::new(Entries {
                snapshots: LruCache::new(capacity),
                evicted: LruCache::new(capacity),
            }),
            parse_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Parse `source` for `file_path` unless the cached snapshot already has
    /// the same content hash, in which case that very snapshot is returned.
    pub fn request_parse(&self, file_path: &Path, source: &str) -> Result<Arc<ParsedSnapshot>> {
        let outcome = {
            let path_lock = self.path_lock(file_path);
            let _parsing = lock(&path_lock);
            self.parse_serialized(file_path, source)
        };

        match outcome {
            Ok((snapshot, displaced)) => {
                if let Some(displaced) = displaced {
                    self.release_lock(&displaced);
                }
                Ok(snapshot)
            }
            Err(error) => {
                if !lock(&self.entries).snapshots.contains(file_path) {
                    self.release_lock(file_path);
                }
                Err(error)
            }
        }
    }

    /// Body of `request_parse`, run under the path's lock. Also returns the
    /// path the new entry pushed out of the cache, if any.
    fn parse_serialized(
        &self,
        file_path: &Path,
        source: &str,
    ) -> Result<(Arc<ParsedSnapshot>, Option<PathBuf>)> {
        let hash = content_hash(source);
        if let Some(cached) = lock(&self.entries).snapshots.get(file_path) {
            if cached.source_hash == hash {
                debug!("cache hit for {:?}", file_path);
                return Ok((Arc::clone(cached), None));
            }
        }

        debug!("cache miss for {:?}, parsing", file_path);
        let snapshot = Arc::new(self.parser.parse(file_path, source)?);

        let mut entries = lock(&self.entries);
        let displaced = entries
            .snapshots
            .push(file_path.to_path_buf(), Arc::clone(&snapshot))
            .map(|(path, _)| path)
            .filter(|path| path != file_path);
        if let Some(path) = &displaced {
            debug!("evicted {:?} to make room for {:?}", path, file_path);
            entries.evicted.put(path.clone(), ());
        }
        entries.evicted.pop(file_path);
        Ok((snapshot, displaced))
    }

    /// Current snapshot for `file_path`, marking it most recently used
    pub fn get(&self, file_path: &Path) -> Result<Arc<ParsedSnapshot>> {
        lock(&self.entries)
            .snapshots
            .get(file_path)
            .cloned()
            .ok_or_else(|| Error::UnknownFile(file_path.to_path_buf()))
    }

    /// Drop the snapshot for `file_path`. Returns whether one was cached.
    pub fn close(&self, file_path: &Path) -> bool {
        let removed = {
            let mut entries = lock(&self.entries);
            let removed = entries.snapshots.pop(file_path).is_some();
            if removed {
                entries.evicted.put(file_path.to_path_buf(), ());
            }
            removed
        };
        self.release_lock(file_path);
        debug!("closed {:?} (cached: {})", file_path, removed);
        removed
    }

    pub fn state(&self, file_path: &Path) -> SessionState {
        let entries = lock(&self.entries);
        if entries.snapshots.contains(file_path) {
            SessionState::Parsed
        } else if entries.evicted.contains(file_path) {
            SessionState::Evicted
        } else {
            SessionState::Unparsed
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        lock(&self.entries).snapshots.cap().get()
    }

    fn path_lock(&self, file_path: &Path) -> Arc<Mutex<()>> {
        let mut locks = lock(&self.parse_locks);
        Arc::clone(locks.entry(file_path.to_path_buf()).or_default())
    }

    /// Forget the lock of `file_path` unless a parse still holds a clone.
    /// Clones are only taken under the map's mutex, so the count is exact.
    fn release_lock(&self, file_path: &Path) {
        let mut locks = lock(&self.parse_locks);
        if locks
            .get(file_path)
            .is_some_and(|path_lock| Arc::strong_count(path_lock) == 1)
        {
            locks.remove(file_path);
        }
    }
}
