//! Engine façade that ties configuration, parsing and the session cache
//! together

use crate::{
    cache::{ParseSessionCache, SessionState},
    config::EngineConfig,
    error::{Error, Result},
    interfaces::{IntrospectionProvider, SnapshotHandle},
    parser::SourceParser,
    types::{Declaration, DocEntry, NavigationItem, NestableRange, Occurrence},
};
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct Introspector {
    config: EngineConfig,
    cache: ParseSessionCache,
}

impl Default for Introspector {
    fn default() -> Self {
        let config = EngineConfig::default();
        let capacity = NonZeroUsize::new(config.max_cache_entries).unwrap_or(NonZeroUsize::MIN);
        Self::build(config, capacity)
    }
}

impl Introspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.max_cache_entries)
            .ok_or_else(|| Error::ConfigError("max_cache_entries must be at least 1".to_string()))?;
        Ok(Self::build(config, capacity))
    }

    /// Use the nearest config file above `start_path`, or the defaults
    pub fn discover(start_path: &Path) -> Result<Self> {
        match EngineConfig::find_config_file(start_path) {
            Some(path) => {
                debug!("using config {:?}", path);
                Self::with_config(EngineConfig::load_from_file(&path)?)
            }
            None => Ok(Self::new()),
        }
    }

    fn build(config: EngineConfig, capacity: NonZeroUsize) -> Self {
        let parser = SourceParser::new().with_recovery(config.recovery_mode);
        Self {
            cache: ParseSessionCache::new(parser, capacity),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parse(&self, file_path: &Path, source: &str) -> Result<SnapshotHandle> {
        self.cache
            .request_parse(file_path, source)
            .map(SnapshotHandle::new)
    }

    /// Handle for the snapshot currently cached for `file_path`
    pub fn snapshot(&self, file_path: &Path) -> Result<SnapshotHandle> {
        self.cache.get(file_path).map(SnapshotHandle::new)
    }

    pub fn close(&self, file_path: &Path) -> bool {
        self.cache.close(file_path)
    }

    pub fn state(&self, file_path: &Path) -> SessionState {
        self.cache.state(file_path)
    }

    pub fn variables_at(&self, file_path: &Path, line: u32) -> Result<Vec<Declaration>> {
        let snapshot = self.snapshot(file_path)?;
        Ok(snapshot
            .variables_in_scope(line)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn documentation(&self, file_path: &Path) -> Result<Vec<DocEntry>> {
        Ok(self.snapshot(file_path)?.all_documentation().to_vec())
    }

    pub fn nestable_ranges(&self, file_path: &Path) -> Result<Vec<NestableRange>> {
        Ok(self.snapshot(file_path)?.nestable_ranges())
    }

    pub fn navigation(&self, file_path: &Path) -> Result<Vec<NavigationItem>> {
        Ok(self.snapshot(file_path)?.navigation())
    }

    pub fn occurrences(&self, file_path: &Path, line: u32, column: u32) -> Result<Vec<Occurrence>> {
        self.snapshot(file_path)?.occurrences(line, column)
    }
}

impl IntrospectionProvider for Introspector {
    fn parse_file(&self, path: &Path, text: &str) -> Result<SnapshotHandle> {
        self.parse(path, text)
    }

    fn query_variables(&self, handle: &SnapshotHandle, line: u32) -> Result<Vec<Declaration>> {
        Ok(handle
            .variables_in_scope(line)?
            .into_iter()
            .cloned()
            .collect())
    }

    fn query_documentation(&self, handle: &SnapshotHandle) -> Vec<DocEntry> {
        handle.all_documentation().to_vec()
    }

    fn query_nestable_ranges(&self, handle: &SnapshotHandle) -> Vec<NestableRange> {
        handle.nestable_ranges()
    }

    fn close_file(&self, path: &Path) {
        self.close(path);
    }
}
