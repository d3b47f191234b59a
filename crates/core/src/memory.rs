//! Shared memory: the crew's record of task outcomes.
//!
//! Keyed by the task string, insertion-ordered so prompts built from it are
//! deterministic. Only the crew writes to it, and only after an agent call
//! returns; agents get a snapshot. Entries are never removed; writing an
//! existing key overwrites the record and keeps its original position.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// The outcome of one task as stored in shared memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Name of the agent (or crew-level label) that produced the result
    pub agent: String,

    /// The result text
    pub result: String,
}

impl MemoryRecord {
    pub fn new(agent: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            result: result.into(),
        }
    }
}

/// Insertion-ordered map from task string to [`MemoryRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedMemory {
    entries: Vec<(String, MemoryRecord)>,
}

impl SharedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a record under `task`.
    ///
    /// Returns the previous record when the key already existed.
    pub fn insert(&mut self, task: impl Into<String>, record: MemoryRecord) -> Option<MemoryRecord> {
        let task = task.into();
        match self.entries.iter_mut().find(|(key, _)| *key == task) {
            Some((_, existing)) => Some(std::mem::replace(existing, record)),
            None => {
                self.entries.push((task, record));
                None
            }
        }
    }

    pub fn get(&self, task: &str) -> Option<&MemoryRecord> {
        self.entries
            .iter()
            .find(|(key, _)| key == task)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemoryRecord)> {
        self.entries.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Task keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Render as a JSON object, `{"<task>": {"agent": .., "result": ..}, ..}`.
    ///
    /// This is the only place the typed record becomes a loose bag: the
    /// completion-service prompt boundary.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for SharedMemory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (task, record) in &self.entries {
            map.serialize_entry(task, record)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a SharedMemory {
    type Item = (&'a str, &'a MemoryRecord);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
