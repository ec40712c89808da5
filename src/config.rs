use crate::persistence::{atomic_write, default_ledger_path, default_shelf_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User settings read from `<config dir>/timeshelf/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Time ledger file; defaults to ~/.gotime.json
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,
    /// Command shelf file; defaults to ~/.shellshelf.json
    #[serde(default)]
    pub shelf_path: Option<PathBuf>,
    /// Editor for shelf commands; falls back to $EDITOR, then vi
    #[serde(default)]
    pub editor: Option<String>,
    /// Overrides the shelf file's own confirm-before-run setting
    #[serde(default)]
    pub confirm_before_run: Option<bool>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_path: None,
            shelf_path: None,
            editor: None,
            confirm_before_run: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("timeshelf")
            .join("config.toml"))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load settings from `path`. Returns defaults if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let settings: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        atomic_write(path, &raw)
    }

    /// Ledger file, preferring an explicit override
    pub fn ledger_file(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        match (override_path, &self.ledger_path) {
            (Some(p), _) => Ok(p.to_path_buf()),
            (None, Some(p)) => Ok(p.clone()),
            (None, None) => default_ledger_path(),
        }
    }

    /// Shelf file, preferring an explicit override
    pub fn shelf_file(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        match (override_path, &self.shelf_path) {
            (Some(p), _) => Ok(p.to_path_buf()),
            (None, Some(p)) => Ok(p.clone()),
            (None, None) => default_shelf_path(),
        }
    }

    /// Editor command, from settings, then $EDITOR, then vi
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }
}
