//! Local record of managed resources
//!
//! Stands in for the state an orchestration engine would keep: for each
//! resource address, the tracked id and last-known attributes.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use declarative::{Attributes, RefreshOutcome, ResourceData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// State Structures
// ============================================================================

/// All tracked resources, keyed by address (`<type>.<name>`)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderState {
    #[serde(default)]
    pub resources: BTreeMap<String, TrackedResource>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

/// One resource as last seen by a lifecycle operation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrackedResource {
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub updated_at: DateTime<Utc>,
}

impl TrackedResource {
    fn from_data(resource_type: &str, data: ResourceData) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            id: data.id,
            attributes: data.attributes,
            updated_at: Utc::now(),
        }
    }
}

/// Build an address from a resource type and a local name
pub fn address(resource_type: &str, name: &str) -> String {
    format!("{resource_type}.{name}")
}

/// Split an address into resource type and local name
pub fn parse_address(addr: &str) -> Result<(&str, &str)> {
    match addr.split_once('.') {
        Some((ty, name)) if !ty.is_empty() && !name.is_empty() => Ok((ty, name)),
        _ => bail!("Invalid address '{addr}', expected '<type>.<name>'"),
    }
}

// ============================================================================
// ProviderState Implementation
// ============================================================================

impl ProviderState {
    /// Load state from `path`, or return empty state if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using empty state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!(
            "Loaded {} resource(s) from {}",
            state.resources.len(),
            path.display()
        );
        Ok(state)
    }

    /// Save state to `path`, creating parent directories as needed
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.last_updated = Utc::now();
        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn get(&self, addr: &str) -> Option<&TrackedResource> {
        self.resources.get(addr)
    }

    /// Look up an address that must be tracked
    pub fn require(&self, addr: &str) -> Result<&TrackedResource> {
        self.get(addr)
            .with_context(|| format!("Resource '{addr}' is not tracked in state"))
    }

    // ========================================================================
    // Lifecycle results
    // ========================================================================

    /// Record a successful create or import
    pub fn track(&mut self, addr: &str, resource_type: &str, data: ResourceData) {
        self.resources
            .insert(addr.to_string(), TrackedResource::from_data(resource_type, data));
    }

    /// Record a read: refresh on present, forget on absent
    ///
    /// Returns `false` if the entry was removed.
    pub fn apply_read(&mut self, addr: &str, data: Option<ResourceData>) -> bool {
        match data {
            Some(data) => {
                if let Some(entry) = self.resources.get_mut(addr) {
                    entry.id = data.id;
                    entry.attributes = data.attributes;
                    entry.updated_at = Utc::now();
                }
                true
            }
            None => {
                self.resources.remove(addr);
                false
            }
        }
    }

    /// Record the outcome of a refresh; failures leave the entry untouched
    pub fn apply_refresh(&mut self, addr: &str, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Present(data) => {
                self.apply_read(addr, Some(data));
            }
            RefreshOutcome::Absent => {
                self.apply_read(addr, None);
            }
            RefreshOutcome::Failed { error } => {
                log::warn!("Keeping {addr} after failed refresh: {error}");
            }
        }
    }

    /// Record a successful delete
    pub fn forget(&mut self, addr: &str) -> Option<TrackedResource> {
        self.resources.remove(addr)
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

/// Resolve the state file: explicit path first, then the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(crate::paths::expand(&path.to_string_lossy())),
        None => crate::paths::state_file(),
    }
}

// ============================================================================
// Tests
// ============================================================================
