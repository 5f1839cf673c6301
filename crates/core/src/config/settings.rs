use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File names searched for, nearest directory first.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".shellkit.json", "shellkit.json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Prompt shown by the console before each line
    pub prompt: String,

    /// When false, paged writes are emitted without pausing
    pub paging: bool,

    /// Text shown while paged output waits for a key
    pub pager_prompt: String,

    /// How often blocked reads check for cancellation, in milliseconds
    pub read_poll_interval_ms: u64,

    // Where the settings were loaded from (internal, not exposed in JSON)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            paging: true,
            pager_prompt: "--More--".to_string(),
            read_poll_interval_ms: 50,
            source: None,
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            Error::Configuration(format!("Failed to parse {}: {e}", path.display()))
        })?;
        settings.source = Some(path.to_path_buf());
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("Failed to serialize settings: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Nearest settings file at or above `start_path`.
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest settings file, or defaults when there is none.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!(
                    "No settings file above {}, using defaults",
                    start_path.display()
                );
                Ok(Self::default())
            }
        }
    }

    pub fn read_poll_interval(&self) -> Duration {
        Duration::from_millis(self.read_poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.read_poll_interval_ms == 0 {
            return Err(Error::Configuration(
                "read_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
