//! Label registry: the ordered record of committed annotations.

use crate::surface::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique, stable identifier of a committed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(u64);

impl LabelId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commit-time id source: wall-clock milliseconds, bumped to stay strictly
/// increasing when commits land within the same millisecond or the clock
/// steps back.
#[derive(Debug, Clone, Default)]
pub struct LabelIdGenerator {
    last: u64,
}

impl LabelIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> LabelId {
        let id = now_millis().max(self.last + 1);
        self.last = id;
        LabelId(id)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A committed polygon annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    id: LabelId,
    name: String,
    polygon: ObjectId,
}

impl Label {
    pub fn id(&self) -> LabelId {
        self.id
    }

    /// Display name, e.g. "Label 3".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Surface object holding the label's geometry.
    pub fn polygon(&self) -> ObjectId {
        self.polygon
    }

    pub fn summary(&self) -> LabelSummary {
        LabelSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// What the host's label list shows: id and name, no geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSummary {
    pub id: LabelId,
    pub name: String,
}

/// Ordered collection of committed labels.
///
/// Only [`LabelRegistry::commit`] and [`LabelRegistry::remove`] mutate it.
/// The name counter never goes back, so names are not reused after deletes.
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    labels: Vec<Label>,
    prefix: String,
    next_number: u64,
    ids: LabelIdGenerator,
}

impl LabelRegistry {
    /// Create an empty registry naming labels `"{prefix} {n}"`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            labels: Vec::new(),
            prefix: prefix.into(),
            next_number: 1,
            ids: LabelIdGenerator::new(),
        }
    }

    /// Record a newly finished polygon, assigning its id and name.
    pub fn commit(&mut self, polygon: ObjectId) -> LabelId {
        let id = self.ids.next_id();
        let name = format!("{} {}", self.prefix, self.next_number);
        self.next_number += 1;
        self.labels.push(Label { id, name, polygon });
        id
    }

    /// Remove a label record. Unknown ids are ignored.
    pub fn remove(&mut self, id: LabelId) -> Option<Label> {
        let index = self.labels.iter().position(|l| l.id == id)?;
        Some(self.labels.remove(index))
    }

    pub fn get(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Labels in commit order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn summaries(&self) -> Vec<LabelSummary> {
        self.labels.iter().map(Label::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new("Label")
    }
}
