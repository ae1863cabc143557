//! cf_private_domain_access - share a private domain with an organization

use cfapi::Session;
use declarative::{IdShape, RelationshipKind};

/// Typed record for one sharing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateDomainAccess {
    /// Organization GUID
    pub org: String,
    /// Private domain GUID
    pub domain: String,
}

/// Organization has access to a private domain it doesn't own
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivateDomainAccessKind;

impl RelationshipKind for PrivateDomainAccessKind {
    type Session = Session;
    type Error = cfapi::Error;
    type Record = PrivateDomainAccess;

    const TYPE_NAME: &'static str = "cf_private_domain_access";
    const LEFT: &'static str = "org";
    const RIGHT: &'static str = "domain";
    const SHAPE: IdShape = IdShape::new("org-guid", "domain-guid");

    fn description(&self) -> String {
        "Private domain shared with an organization".to_string()
    }

    fn record(left: String, right: String) -> PrivateDomainAccess {
        PrivateDomainAccess {
            org: left,
            domain: right,
        }
    }

    fn keys(record: &PrivateDomainAccess) -> (&str, &str) {
        (&record.org, &record.domain)
    }

    fn check_relationship_exists(
        &self,
        session: &Session,
        org: &str,
        domain: &str,
    ) -> cfapi::Result<bool> {
        session
            .domain_manager()
            .has_private_domain_access(org, domain)
    }

    fn create_relationship(&self, session: &Session, org: &str, domain: &str) -> cfapi::Result<()> {
        session
            .domain_manager()
            .create_private_domain_access(org, domain)
    }

    fn delete_relationship(&self, session: &Session, org: &str, domain: &str) -> cfapi::Result<()> {
        session
            .domain_manager()
            .delete_private_domain_access(org, domain)
    }
}
