//! Managed resource types exposed to the engine
//!
//! Every type here is a relationship between two controller objects and
//! shares the lifecycle in [`declarative::RelationshipResource`].

pub mod private_domain_access;
pub mod service_plan_access;

pub use private_domain_access::{PrivateDomainAccess, PrivateDomainAccessKind};
pub use service_plan_access::{ServicePlanAccess, ServicePlanAccessKind};

use cfapi::Session;
use declarative::{RelationshipResource, ResourceRegistry};

/// Registry of every resource type this provider manages
pub fn registry() -> ResourceRegistry<Session> {
    ResourceRegistry::new()
        .with(Box::new(RelationshipResource::new(PrivateDomainAccessKind)))
        .with(Box::new(RelationshipResource::new(ServicePlanAccessKind)))
}
