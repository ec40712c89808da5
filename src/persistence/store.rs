use super::files::{atomic_write, read_file};
use crate::domain::Ledger;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load a JSON document, falling back to its default when the file is missing or blank
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = read_file(path)?;
    if content.trim().is_empty() {
        debug!(path = %path.display(), "no existing data, starting empty");
        return Ok(T::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pretty-print a JSON document and write it atomically
pub fn save_json<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut content = serde_json::to_string_pretty(value).context("Failed to serialize data")?;
    content.push('\n');
    atomic_write(path, &content)?;
    debug!(path = %path.display(), bytes = content.len(), "saved");
    Ok(())
}

/// File-backed handle to the time ledger
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Ledger> {
        let mut ledger: Ledger = load_json(&self.path)?;
        for entry in &mut ledger.entries {
            // active must hold exactly when there is no end time
            if entry.active == entry.end_time.is_some() {
                warn!(id = %entry.id, active = entry.active, "inconsistent entry state, normalizing");
                let span = entry.span();
                entry.apply(entry.keyword.clone(), entry.tags.clone(), span);
            }
        }
        ledger.reassign_short_ids();
        debug!(entries = ledger.entries.len(), "ledger loaded");
        Ok(ledger)
    }

    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        save_json(&self.path, ledger)
    }
}
