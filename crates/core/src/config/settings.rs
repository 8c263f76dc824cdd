use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAMES: &[&str] = &[".introspector.json", "introspector.json"];

fn default_recovery_mode() -> bool {
    true
}

fn default_max_cache_entries() -> usize {
    64
}

/// Options for an [`Introspector`](crate::Introspector)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Keep tokenizing past lexical errors instead of failing the parse
    #[serde(default = "default_recovery_mode")]
    pub recovery_mode: bool,
    /// Number of files whose snapshots stay cached
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recovery_mode: default_recovery_mode(),
            max_cache_entries: default_max_cache_entries(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cache_entries == 0 {
            return Err(Error::ConfigError(
                "max_cache_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Look for a config file in `start_path` and then in each parent
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }
}
