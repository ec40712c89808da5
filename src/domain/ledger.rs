use super::entry::{Entry, SpanError};
use super::keyword::MAX_SHORT_ID;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Oldest undo records are dropped beyond this many
pub const UNDO_LIMIT: usize = 10;

/// Entries parked by `gt stash`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stash {
    pub id: Uuid,
    pub entry_ids: Vec<Uuid>,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoOperation {
    Delete,
    Edit,
    Clear,
}

impl fmt::Display for UndoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delete => "delete",
            Self::Edit => "edit",
            Self::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// Snapshot taken before a destructive command.
///
/// `entries` holds the removed entries for deletes and clears, and the
/// pre-edit copies for edits. `stashes` is the stash as it was beforehand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub id: Uuid,
    pub operation: UndoOperation,
    pub description: String,
    pub timestamp: DateTime<Local>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stashes: Vec<Stash>,
}

/// Every tracked entry, as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub last_entry_keyword: String,
    /// At most one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stashes: Vec<Stash>,
    /// Oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undo_history: Vec<UndoRecord>,
}

impl Ledger {
    /// Append an entry and return its short id
    pub fn add_entry(&mut self, entry: Entry) -> u32 {
        let id = entry.id;
        self.last_entry_keyword = entry.keyword.clone();
        self.entries.push(entry);
        self.reassign_short_ids();
        self.get(id).map(|e| e.short_id).unwrap_or(0)
    }

    /// Number the most recent entries 1..=1000 by start time, newest first
    pub fn reassign_short_ids(&mut self) {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|a, b| self.entries[*b].start_time.cmp(&self.entries[*a].start_time));

        for entry in &mut self.entries {
            entry.short_id = 0;
        }
        for (rank, idx) in order.into_iter().take(MAX_SHORT_ID as usize).enumerate() {
            self.entries[idx].short_id = rank as u32 + 1;
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn by_short_id(&self, short_id: u32) -> Option<&Entry> {
        if short_id == 0 {
            return None;
        }
        self.entries.iter().find(|e| e.short_id == short_id)
    }

    pub fn active(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.active).collect()
    }

    pub fn active_for_keyword(&self, keyword: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.active && e.keyword == keyword)
            .collect()
    }

    pub fn has_active_for_keyword(&self, keyword: &str) -> bool {
        self.entries.iter().any(|e| e.active && e.keyword == keyword)
    }

    /// Entries for `keyword`, newest first
    pub fn for_keyword(&self, keyword: &str) -> Vec<&Entry> {
        let mut found: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.keyword == keyword)
            .collect();
        found.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        found
    }

    pub fn latest_for_keyword(&self, keyword: &str) -> Option<&Entry> {
        self.for_keyword(keyword).into_iter().next()
    }

    /// Most recently started entry
    pub fn latest(&self) -> Option<&Entry> {
        self.entries.iter().max_by_key(|e| e.start_time)
    }

    /// The `limit` newest entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&Entry> {
        let mut all: Vec<&Entry> = self.entries.iter().collect();
        all.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        all.truncate(limit);
        all
    }

    /// Stop an entry by id; `Ok(false)` if it is unknown or already stopped
    pub fn stop(&mut self, id: Uuid, now: DateTime<Local>) -> Result<bool, SpanError> {
        match self.get_mut(id) {
            Some(entry) if entry.active => entry.stop(now).map(|_| true),
            _ => Ok(false),
        }
    }

    /// Remove entries by id and renumber; returns how many were removed
    pub fn remove(&mut self, ids: &[Uuid]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !ids.contains(&e.id));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.reassign_short_ids();
            self.prune_stash();
        }
        removed
    }

    pub fn stash(&self) -> Option<&Stash> {
        self.stashes.first()
    }

    /// Stashed entries in ledger order
    pub fn stashed(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.stashed).collect()
    }

    /// Replace any stash with one holding `entry_ids`
    pub fn create_stash(&mut self, entry_ids: Vec<Uuid>, now: DateTime<Local>) {
        self.stashes = vec![Stash {
            id: Uuid::new_v4(),
            entry_ids,
            created_at: now,
        }];
    }

    /// Forget stash members that are gone or no longer stashed, then drop an empty stash
    pub fn prune_stash(&mut self) {
        let stashed: Vec<Uuid> = self.stashed().iter().map(|e| e.id).collect();
        for stash in &mut self.stashes {
            stash.entry_ids.retain(|id| stashed.contains(id));
        }
        self.stashes.retain(|s| !s.entry_ids.is_empty());
    }

    /// Remember `entries` so `operation` can be reverted later
    pub fn record_undo(
        &mut self,
        operation: UndoOperation,
        description: String,
        entries: Vec<Entry>,
        now: DateTime<Local>,
    ) {
        let stashes = match operation {
            UndoOperation::Edit => Vec::new(),
            UndoOperation::Delete | UndoOperation::Clear => self.stashes.clone(),
        };
        self.undo_history.push(UndoRecord {
            id: Uuid::new_v4(),
            operation,
            description,
            timestamp: now,
            entries,
            stashes,
        });
        let excess = self.undo_history.len().saturating_sub(UNDO_LIMIT);
        self.undo_history.drain(..excess);
    }

    /// Remove a record from the history
    pub fn take_undo(&mut self, id: Uuid) -> Option<UndoRecord> {
        let index = self.undo_history.iter().position(|r| r.id == id)?;
        Some(self.undo_history.remove(index))
    }

    /// Put the snapshot in `record` back; returns the ids restored.
    ///
    /// Deleted entries are re-added, edited ones overwritten in place. An edit
    /// whose entry has since been deleted restores nothing for it. Restored
    /// stashed entries rejoin the stash.
    pub fn restore(&mut self, record: &UndoRecord) -> Vec<Uuid> {
        let mut restored = Vec::new();
        for snapshot in &record.entries {
            match self.get_mut(snapshot.id) {
                Some(current) => *current = snapshot.clone(),
                None if record.operation == UndoOperation::Edit => continue,
                None => self.entries.push(snapshot.clone()),
            }
            restored.push(snapshot.id);
        }

        let stashed: Vec<Uuid> = record
            .entries
            .iter()
            .filter(|e| e.stashed && restored.contains(&e.id))
            .map(|e| e.id)
            .collect();
        if !stashed.is_empty() {
            if self.stashes.is_empty() {
                let mut stash = record.stashes.first().cloned().unwrap_or(Stash {
                    id: Uuid::new_v4(),
                    entry_ids: Vec::new(),
                    created_at: record.timestamp,
                });
                stash.entry_ids.clear();
                self.stashes.push(stash);
            }
            let stash = &mut self.stashes[0];
            for id in stashed {
                if !stash.entry_ids.contains(&id) {
                    stash.entry_ids.push(id);
                }
            }
        }

        self.reassign_short_ids();
        restored
    }

    /// Distinct keywords with their entry counts
    pub fn keyword_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.keyword.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct tags with their entry counts
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for tag in self.entries.iter().flat_map(|e| e.tags.iter()) {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Rename a tag everywhere, merging with `new` where both are present
    pub fn rename_tag(&mut self, old: &str, new: &str) -> usize {
        let mut touched = 0;
        for entry in &mut self.entries {
            if !entry.has_tag(old) {
                continue;
            }
            let had_new = entry.has_tag(new);
            entry.tags.retain(|t| t != old || !had_new);
            for tag in &mut entry.tags {
                if tag == old {
                    *tag = new.to_string();
                }
            }
            touched += 1;
        }
        touched
    }

    /// Drop a tag from every entry
    pub fn remove_tag(&mut self, tag: &str) -> usize {
        let mut touched = 0;
        for entry in &mut self.entries {
            let before = entry.tags.len();
            entry.tags.retain(|t| t != tag);
            if entry.tags.len() != before {
                touched += 1;
            }
        }
        touched
    }
}
