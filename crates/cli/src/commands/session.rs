use anyhow::{Context, Result};
use introspector_core::{EngineConfig, Introspector, SnapshotHandle};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::GlobalOptions;

/// Resolve `filepath` against the current directory
pub fn absolute_path(filepath: &str) -> Result<PathBuf> {
    let path = Path::new(filepath);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if !absolute.exists() {
        return Err(anyhow::anyhow!("File not found: {}", absolute.display()));
    }
    Ok(absolute)
}

/// Config from `--config`, or the nearest config file above `file`
pub fn load_config(file: &Path, options: &GlobalOptions) -> Result<EngineConfig> {
    let config_path = match &options.config {
        Some(path) => Some(path.clone()),
        None => file.parent().and_then(EngineConfig::find_config_file),
    };
    let mut config = match config_path {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            EngineConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if options.strict {
        config.recovery_mode = false;
    }
    Ok(config)
}

/// Read and parse `filepath`, reporting tolerated problems on stderr
pub fn open_snapshot(filepath: &str, options: &GlobalOptions) -> Result<SnapshotHandle> {
    let path = absolute_path(filepath)?;
    let config = load_config(&path, options)?;
    let introspector = Introspector::with_config(config)?;

    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let handle = introspector
        .parse(&path, &source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if !options.json {
        for diagnostic in handle.diagnostics() {
            eprintln!("warning: {diagnostic}");
        }
    }
    Ok(handle)
}
