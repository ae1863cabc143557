//! Callback traits
//!
//! These let the crate report progress without depending on a specific
//! UI implementation.

use crate::types::RefreshOutcome;

/// Progress callback for refresh operations
///
/// Implement this trait to receive progress updates during a refresh.
pub trait ProgressCallback: Send {
    /// Called once before any resource is read
    fn on_batch_start(&mut self, count: usize);

    /// Called when starting to read a single resource
    ///
    /// Not called for resources read on the parallel path.
    fn on_resource_start(&mut self, address: &str);

    /// Called when a resource read completes
    fn on_resource_complete(&mut self, address: &str, outcome: &RefreshOutcome);

    /// Called when the batch completes
    fn on_batch_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _address: &str) {}
    fn on_resource_complete(&mut self, _address: &str, _outcome: &RefreshOutcome) {}
    fn on_batch_complete(&mut self) {}
}
