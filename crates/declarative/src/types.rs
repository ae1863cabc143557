//! Core types shared with the engine boundary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat attribute map as the engine sees a resource
///
/// Typed records convert to and from this only at the boundary.
pub type Attributes = BTreeMap<String, String>;

/// Engine-side record of one managed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Opaque identifier the engine persists as the resource key
    pub id: String,
    /// Attribute values, empty until populated by a Read
    #[serde(default)]
    pub attributes: Attributes,
}

impl ResourceData {
    pub fn new(id: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// State handed back by a passthrough import: the id and nothing else
    pub fn passthrough(id: impl Into<String>) -> Self {
        Self::new(id, Attributes::new())
    }

    /// Look up a single attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the record still needs a Read to fill in attributes
    pub fn is_pending_read(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Outcome of refreshing one tracked resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
    /// Still exists remotely; attributes refreshed
    Present(ResourceData),
    /// Gone remotely; the tracked id should be cleared
    Absent,
    /// Query failed; keep the tracked id as-is
    Failed { error: String },
}

impl RefreshOutcome {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Summary of a refresh pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub present: usize,
    pub absent: usize,
    pub failed: usize,
}

impl RefreshSummary {
    /// Check if every Read completed without a query failure
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.present + self.absent + self.failed
    }

    /// Add a result to the summary
    pub fn add_outcome(&mut self, outcome: &RefreshOutcome) {
        match outcome {
            RefreshOutcome::Present(_) => self.present += 1,
            RefreshOutcome::Absent => self.absent += 1,
            RefreshOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Options for a refresh pass
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    /// Number of parallel Read calls
    pub jobs: usize,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}
