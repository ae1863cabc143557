//! Post-apply checks against the live controller
//!
//! Acceptance runs use these to confirm that what state claims matches
//! what the controller reports.

use anyhow::{Context, Result};
use cfapi::{ServiceInstance, Session};
use declarative::Resource;
use thiserror::Error;

use crate::state::ProviderState;

/// A check found something that should have been destroyed
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("service instance with name '{name}' still exists in cloud foundry")]
    ServiceInstanceExists { name: String },

    #[error("{resource_type} '{id}' still exists in cloud foundry")]
    RelationshipExists { resource_type: String, id: String },
}

/// The service instance tracked at `address` must exist
pub fn check_service_instance_exists(
    session: &Session,
    state: &ProviderState,
    address: &str,
) -> Result<ServiceInstance> {
    let tracked = state
        .get(address)
        .with_context(|| format!("service instance '{address}' not found in state"))?;

    log::debug!("Checking service instance {} ({})", address, tracked.id);
    let instance = session
        .service_manager()
        .read_service_instance(&tracked.id)
        .with_context(|| format!("service instance '{address}' ({}) not readable", tracked.id))?;
    Ok(instance)
}

/// None of `names` may resolve to a service instance in `space_guid`
///
/// A lookup error other than not-found means destruction could not be
/// confirmed and is returned as-is.
pub fn check_service_instances_destroyed<S: AsRef<str>>(
    session: &Session,
    names: &[S],
    space_guid: &str,
) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        match session
            .service_manager()
            .find_service_instance(name, space_guid)
        {
            Ok(_) => {
                return Err(VerifyError::ServiceInstanceExists {
                    name: name.to_string(),
                }
                .into());
            }
            Err(e) if e.is_not_found() => {
                log::debug!("Service instance '{name}' is gone from space {space_guid}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// A relationship resource must read back as absent
pub fn check_relationship_destroyed(
    session: &Session,
    resource: &dyn Resource<Session>,
    id: &str,
) -> Result<()> {
    if resource.read(session, id)?.is_some() {
        return Err(VerifyError::RelationshipExists {
            resource_type: resource.resource_type().to_string(),
            id: id.to_string(),
        }
        .into());
    }
    Ok(())
}
