//! Capability traits and implementations for talking to the controller.
//!
//! This module provides the [`DomainManager`] and [`ServiceManager`] traits.
//! The primary implementation is [`cc::CcBackend`], which speaks the Cloud
//! Controller v2 REST API.
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without network access:
//!
//! ```
//! use cfapi::backend::{DomainManager, MockBackend};
//!
//! let mock = MockBackend::new();
//! mock.create_private_domain_access("org-1", "domain-1").unwrap();
//!
//! assert!(mock.has_private_domain_access("org-1", "domain-1").unwrap());
//! ```

pub mod cc;

use crate::error::{Error, Result};
use crate::types::{ServiceInstance, ServicePlanVisibility};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Private domain sharing between organizations.
///
/// All keys are controller GUIDs, never display names.
pub trait DomainManager: Send + Sync {
    /// Whether `org` can use private domain `domain`.
    ///
    /// A missing org or domain is `Ok(false)`, not an error.
    fn has_private_domain_access(&self, org: &str, domain: &str) -> Result<bool>;

    /// Share `domain` with `org`.
    fn create_private_domain_access(&self, org: &str, domain: &str) -> Result<()>;

    /// Stop sharing `domain` with `org`. Succeeds if already unshared.
    fn delete_private_domain_access(&self, org: &str, domain: &str) -> Result<()>;
}

/// Service plans and service instances.
pub trait ServiceManager: Send + Sync {
    /// Whether `org` can see service plan `plan`.
    fn has_service_plan_access(&self, plan: &str, org: &str) -> Result<bool>;

    /// Make `plan` visible to `org`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` if the visibility is already there.
    fn create_service_plan_access(&self, plan: &str, org: &str) -> Result<()>;

    /// Remove the visibility. Succeeds if already gone.
    fn delete_service_plan_access(&self, plan: &str, org: &str) -> Result<()>;

    /// Fetch a service instance by GUID.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelNotFound` if no such instance exists.
    fn read_service_instance(&self, guid: &str) -> Result<ServiceInstance>;

    /// Find a service instance by name within a space.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelNotFound` if no instance has that name.
    fn find_service_instance(&self, name: &str, space_guid: &str) -> Result<ServiceInstance>;
}

#[derive(Debug, Default)]
struct MockState {
    domain_access: BTreeSet<(String, String)>,
    plan_visibilities: Vec<ServicePlanVisibility>,
    service_instances: Vec<ServiceInstance>,
    unavailable: bool,
    next_guid: u64,
    calls: usize,
}

/// In-memory controller for testing without network access.
///
/// Clones share state, so a test can keep one handle while a
/// [`Session`](crate::Session) owns another.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(state: &mut MockState) -> Result<()> {
        state.calls += 1;
        if state.unavailable {
            Err(Error::http("HTTP 503", Some(503)))
        } else {
            Ok(())
        }
    }

    /// Make every call fail as if the controller were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Add a service instance.
    pub fn add_service_instance(&self, instance: ServiceInstance) {
        self.state().service_instances.push(instance);
    }

    /// Remove a service instance by GUID, as if deleted out-of-band.
    pub fn remove_service_instance(&self, guid: &str) {
        self.state().service_instances.retain(|si| si.guid != guid);
    }

    /// Number of controller calls made so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    /// Number of plan visibilities currently stored.
    pub fn plan_visibility_count(&self) -> usize {
        self.state().plan_visibilities.len()
    }
}

impl DomainManager for MockBackend {
    fn has_private_domain_access(&self, org: &str, domain: &str) -> Result<bool> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        Ok(state
            .domain_access
            .contains(&(org.to_string(), domain.to_string())))
    }

    fn create_private_domain_access(&self, org: &str, domain: &str) -> Result<()> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        state
            .domain_access
            .insert((org.to_string(), domain.to_string()));
        Ok(())
    }

    fn delete_private_domain_access(&self, org: &str, domain: &str) -> Result<()> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        state
            .domain_access
            .remove(&(org.to_string(), domain.to_string()));
        Ok(())
    }
}

impl ServiceManager for MockBackend {
    fn has_service_plan_access(&self, plan: &str, org: &str) -> Result<bool> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        Ok(state
            .plan_visibilities
            .iter()
            .any(|v| v.service_plan_guid == plan && v.organization_guid == org))
    }

    fn create_service_plan_access(&self, plan: &str, org: &str) -> Result<()> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        if state
            .plan_visibilities
            .iter()
            .any(|v| v.service_plan_guid == plan && v.organization_guid == org)
        {
            return Err(Error::AlreadyExists(format!(
                "This combination of ServicePlan and Organization is already taken: {plan}/{org}"
            )));
        }
        state.next_guid += 1;
        let guid = format!("visibility-{}", state.next_guid);
        state.plan_visibilities.push(ServicePlanVisibility {
            guid,
            service_plan_guid: plan.to_string(),
            organization_guid: org.to_string(),
        });
        Ok(())
    }

    fn delete_service_plan_access(&self, plan: &str, org: &str) -> Result<()> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        state
            .plan_visibilities
            .retain(|v| !(v.service_plan_guid == plan && v.organization_guid == org));
        Ok(())
    }

    fn read_service_instance(&self, guid: &str) -> Result<ServiceInstance> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        state
            .service_instances
            .iter()
            .find(|si| si.guid == guid)
            .cloned()
            .ok_or_else(|| Error::not_found("service instance", guid))
    }

    fn find_service_instance(&self, name: &str, space_guid: &str) -> Result<ServiceInstance> {
        let mut state = self.state();
        Self::check_available(&mut state)?;
        state
            .service_instances
            .iter()
            .find(|si| si.name == name && si.space_guid == space_guid)
            .cloned()
            .ok_or_else(|| Error::not_found("service instance", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_domain_access_lifecycle() {
        let mock = MockBackend::new();
        assert!(!mock.has_private_domain_access("org-1", "domain-1").unwrap());

        mock.create_private_domain_access("org-1", "domain-1").unwrap();
        assert!(mock.has_private_domain_access("org-1", "domain-1").unwrap());
        assert!(!mock.has_private_domain_access("org-2", "domain-1").unwrap());

        mock.delete_private_domain_access("org-1", "domain-1").unwrap();
        assert!(!mock.has_private_domain_access("org-1", "domain-1").unwrap());
    }

    #[test]
    fn test_mock_domain_access_delete_is_idempotent() {
        let mock = MockBackend::new();
        assert!(mock.delete_private_domain_access("org-1", "domain-1").is_ok());
    }

    #[test]
    fn test_mock_plan_visibility_duplicate() {
        let mock = MockBackend::new();
        mock.create_service_plan_access("plan-1", "org-1").unwrap();
        let err = mock.create_service_plan_access("plan-1", "org-1").unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert_eq!(mock.plan_visibility_count(), 1);
    }

    #[test]
    fn test_mock_plan_visibility_delete() {
        let mock = MockBackend::new();
        mock.create_service_plan_access("plan-1", "org-1").unwrap();
        mock.delete_service_plan_access("plan-1", "org-1").unwrap();
        assert!(!mock.has_service_plan_access("plan-1", "org-1").unwrap());
        assert!(mock.delete_service_plan_access("plan-1", "org-1").is_ok());
    }

    #[test]
    fn test_mock_find_service_instance() {
        let mock = MockBackend::new();
        mock.add_service_instance(ServiceInstance::new("si-1", "mysql", "space-1", "plan-1"));

        let found = mock.find_service_instance("mysql", "space-1").unwrap();
        assert_eq!(found.guid, "si-1");

        let err = mock.find_service_instance("mysql", "space-2").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_mock_read_service_instance() {
        let mock = MockBackend::new();
        mock.add_service_instance(ServiceInstance::new("si-1", "mysql", "space-1", "plan-1"));
        assert_eq!(mock.read_service_instance("si-1").unwrap().name, "mysql");

        mock.remove_service_instance("si-1");
        assert!(mock.read_service_instance("si-1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_mock_unavailable() {
        let mock = MockBackend::new();
        mock.set_unavailable(true);
        let err = mock.has_private_domain_access("org-1", "domain-1").unwrap_err();
        assert!(err.is_retryable());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_mock_clones_share_state() {
        let mock = MockBackend::new();
        let other = mock.clone();
        other.create_private_domain_access("org-1", "domain-1").unwrap();
        assert!(mock.has_private_domain_access("org-1", "domain-1").unwrap());
    }
}
