//! Snapshot-based history over the task and conference collections.
//!
//! # Invariants
//! - `index` addresses the entry whose snapshot is live in the store.
//! - `0 <= index <= len - 1` whenever the log is non-empty.
//! - Snapshots are owned clones; nothing outside the log borrows into them
//!   across a mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Conference, Task, new_id};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Init,
    AddTask,
    EditTask,
    DeleteTask,
    AddConference,
    EditConference,
    DeleteConference,
    Import,
    Revert,
    Clear,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AddTask => "add_task",
            Self::EditTask => "edit_task",
            Self::DeleteTask => "delete_task",
            Self::AddConference => "add_conference",
            Self::EditConference => "edit_conference",
            Self::DeleteConference => "delete_conference",
            Self::Import => "import",
            Self::Revert => "revert",
            Self::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub conferences: Vec<Conference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
    pub description: String,
    pub snapshot: Snapshot,
}

/// An entry as presented to the view, flagged when it sits under the cursor.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryListing {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from stored entries and a possibly stale cursor.
    ///
    /// A missing cursor means the last entry; an out-of-range one is clamped.
    /// Entries beyond `max_entries` are dropped from the front first, but never
    /// the cursor entry itself; any remaining excess is cut from the redo tail.
    pub fn restore(entries: Vec<HistoryEntry>, index: Option<i64>, max_entries: usize) -> Self {
        if entries.is_empty() {
            return Self::new();
        }
        let last = entries.len() - 1;
        let index = match index {
            Some(raw) => raw.clamp(0, last as i64) as usize,
            None => last,
        };

        let mut log = Self { entries, index };
        log.shrink_to(max_entries);
        log
    }

    /// Drops entries until at most `max_entries` remain, oldest first and
    /// then from the redo tail. The cursor entry is always kept.
    pub fn shrink_to(&mut self, max_entries: usize) {
        let max_entries = max_entries.max(1);
        if self.entries.len() <= max_entries {
            return;
        }
        let excess = self.entries.len() - max_entries;
        let front = excess.min(self.index);
        self.entries.drain(..front);
        self.index -= front;
        self.entries.truncate(max_entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Appends a snapshot and moves the cursor onto it.
    ///
    /// Entries after the cursor (an abandoned redo branch) are discarded first,
    /// then the oldest entries are dropped until at most `max_entries` remain.
    pub fn push(
        &mut self,
        action: HistoryAction,
        description: impl Into<String>,
        snapshot: Snapshot,
        max_entries: usize,
    ) -> &HistoryEntry {
        if self.can_redo() {
            self.entries.truncate(self.index + 1);
        }

        self.entries.push(HistoryEntry {
            id: new_id(),
            timestamp: Utc::now(),
            action,
            description: description.into(),
            snapshot,
        });

        let max_entries = max_entries.max(1);
        if self.entries.len() > max_entries {
            let excess = self.entries.len() - max_entries;
            self.entries.drain(..excess);
        }

        self.index = self.entries.len() - 1;
        &self.entries[self.index]
    }

    /// Moves the cursor back one step and returns a copy of that snapshot.
    pub fn step_back(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].snapshot.clone())
    }

    /// Moves the cursor forward one step and returns a copy of that snapshot.
    pub fn step_forward(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].snapshot.clone())
    }

    pub fn listing(&self) -> Vec<HistoryListing> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| HistoryListing {
                entry: entry.clone(),
                is_current: i == self.index,
            })
            .collect()
    }
}
