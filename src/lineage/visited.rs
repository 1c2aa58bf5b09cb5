//! Cycle and duplicate-expansion guard.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// How long a [`VisitedSet`] lives during a workbook resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitedScope {
    /// Fresh set for every sheet field on every dashboard.
    #[default]
    Root,
    /// One set shared by every root in the workbook. A calculated field
    /// reached from a second root produces no rows the second time.
    Workbook,
}

/// Ids already expanded in the current run.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    ids: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Mark `id` as visited. Returns false if it already was.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
