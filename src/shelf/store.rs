use super::command::ShelfCommand;
use crate::persistence::{load_json, save_json};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShelfError {
    #[error("command ID '{0}' does not exist")]
    UnknownId(u32),
    #[error("no command named '{0}'")]
    UnknownName(String),
    #[error("alias '{0}' not found")]
    UnknownAlias(String),
    #[error("alias '{0}' already exists")]
    AliasExists(String),
    #[error("invalid alias specified: {0} (letters, digits, '-' and '_' only)")]
    InvalidAlias(String),
    #[error("command name cannot be empty")]
    EmptyName,
    #[error("no command specified")]
    EmptyCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfSettings {
    #[serde(rename = "confirmBeforeRun", default = "default_confirm")]
    pub confirm_before_run: bool,
}

fn default_confirm() -> bool {
    true
}

impl Default for ShelfSettings {
    fn default() -> Self {
        Self {
            confirm_before_run: default_confirm(),
        }
    }
}

/// Every shelved command plus aliases, as persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    #[serde(default)]
    pub commands: BTreeMap<u32, ShelfCommand>,
    /// Alias name -> command id
    #[serde(default)]
    pub aliases: BTreeMap<String, u32>,
    #[serde(default)]
    pub settings: ShelfSettings,
}

impl Shelf {
    pub fn next_id(&self) -> u32 {
        self.commands.keys().next_back().map_or(1, |max| max + 1)
    }

    pub fn get(&self, id: u32) -> Result<&ShelfCommand, ShelfError> {
        self.commands.get(&id).ok_or(ShelfError::UnknownId(id))
    }

    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.commands
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(id, _)| *id)
    }

    pub fn by_name(&self, name: &str) -> Result<(u32, &ShelfCommand), ShelfError> {
        let id = self
            .id_by_name(name)
            .ok_or_else(|| ShelfError::UnknownName(name.to_string()))?;
        Ok((id, &self.commands[&id]))
    }

    pub fn by_alias(&self, alias: &str) -> Result<(u32, &ShelfCommand), ShelfError> {
        let id = *self
            .aliases
            .get(alias)
            .ok_or_else(|| ShelfError::UnknownAlias(alias.to_string()))?;
        Ok((id, self.get(id)?))
    }

    fn check(command: &ShelfCommand) -> Result<(), ShelfError> {
        if command.name.trim().is_empty() {
            return Err(ShelfError::EmptyName);
        }
        if command.command.trim().is_empty() {
            return Err(ShelfError::EmptyCommand);
        }
        Ok(())
    }

    /// Store `command`, replacing any command with the same name in place
    pub fn upsert(&mut self, command: ShelfCommand) -> Result<u32, ShelfError> {
        Self::check(&command)?;
        let id = self.id_by_name(&command.name).unwrap_or_else(|| self.next_id());
        info!(id, name = %command.name, "shelving command");
        self.commands.insert(id, command);
        Ok(id)
    }

    /// Overwrite the command stored under `id`
    pub fn replace(&mut self, id: u32, command: ShelfCommand) -> Result<(), ShelfError> {
        Self::check(&command)?;
        let slot = self.commands.get_mut(&id).ok_or(ShelfError::UnknownId(id))?;
        *slot = command;
        Ok(())
    }

    /// Remove commands and any aliases pointing at them
    pub fn remove(&mut self, ids: &[u32]) -> Result<usize, ShelfError> {
        if let Some(missing) = ids.iter().find(|id| !self.commands.contains_key(*id)) {
            return Err(ShelfError::UnknownId(*missing));
        }
        for id in ids {
            self.commands.remove(id);
        }
        self.aliases.retain(|_, target| !ids.contains(target));
        debug!(removed = ids.len(), "commands removed");
        Ok(ids.len())
    }

    pub fn remove_all(&mut self) -> usize {
        let removed = self.commands.len();
        self.commands.clear();
        self.aliases.clear();
        removed
    }

    pub fn add_alias(&mut self, id: u32, alias: &str) -> Result<(), ShelfError> {
        if !is_valid_alias(alias) {
            return Err(ShelfError::InvalidAlias(alias.to_string()));
        }
        if self.aliases.contains_key(alias) {
            return Err(ShelfError::AliasExists(alias.to_string()));
        }
        self.get(id)?;
        self.aliases.insert(alias.to_string(), id);
        Ok(())
    }

    /// Remove aliases by name; every name must exist
    pub fn remove_aliases(&mut self, names: &[String]) -> Result<usize, ShelfError> {
        if let Some(missing) = names.iter().find(|n| !self.aliases.contains_key(*n)) {
            return Err(ShelfError::UnknownAlias(missing.clone()));
        }
        for name in names {
            self.aliases.remove(name);
        }
        Ok(names.len())
    }

    /// Remove every alias pointing at one of `ids`
    pub fn remove_aliases_for(&mut self, ids: &[u32]) -> usize {
        let before = self.aliases.len();
        self.aliases.retain(|_, target| !ids.contains(target));
        before - self.aliases.len()
    }

    /// Aliases of one command, sorted
    pub fn aliases_of(&self, id: u32) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, target)| **target == id)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// File-backed handle to the shelf
#[derive(Debug, Clone)]
pub struct ShelfStore {
    path: PathBuf,
}

impl ShelfStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Shelf> {
        load_json(&self.path)
    }

    pub fn save(&self, shelf: &Shelf) -> Result<()> {
        save_json(&self.path, shelf)
    }
}
