//! cf_service_plan_access - make a service plan visible to an organization

use cfapi::Session;
use declarative::{IdShape, RelationshipKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePlanAccess {
    /// Service plan GUID
    pub plan: String,
    /// Organization GUID
    pub org: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServicePlanAccessKind;

impl RelationshipKind for ServicePlanAccessKind {
    type Session = Session;
    type Error = cfapi::Error;
    type Record = ServicePlanAccess;

    const TYPE_NAME: &'static str = "cf_service_plan_access";
    const LEFT: &'static str = "plan";
    const RIGHT: &'static str = "org";
    const SHAPE: IdShape = IdShape::new("plan-guid", "org-guid");
    // the controller rejects a second visibility for the same pair
    const CREATE_IS_IDEMPOTENT: bool = false;

    fn description(&self) -> String {
        "Service plan visible to an organization".to_string()
    }

    fn record(left: String, right: String) -> ServicePlanAccess {
        ServicePlanAccess {
            plan: left,
            org: right,
        }
    }

    fn keys(record: &ServicePlanAccess) -> (&str, &str) {
        (&record.plan, &record.org)
    }

    fn check_relationship_exists(
        &self,
        session: &Session,
        plan: &str,
        org: &str,
    ) -> cfapi::Result<bool> {
        session.service_manager().has_service_plan_access(plan, org)
    }

    fn create_relationship(&self, session: &Session, plan: &str, org: &str) -> cfapi::Result<()> {
        session
            .service_manager()
            .create_service_plan_access(plan, org)
    }

    fn delete_relationship(&self, session: &Session, plan: &str, org: &str) -> cfapi::Result<()> {
        session
            .service_manager()
            .delete_service_plan_access(plan, org)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfapi::{MockBackend, ServiceManager};
    use declarative::{Attributes, RelationshipResource, Resource};

    fn attrs(plan: &str, org: &str) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("plan".into(), plan.into());
        attrs.insert("org".into(), org.into());
        attrs
    }

    #[test]
    fn test_create_is_retry_safe() {
        let mock = MockBackend::new();
        let session = Session::with_backend(mock.clone());
        let resource = RelationshipResource::new(ServicePlanAccessKind);

        let first = resource.create(&session, &attrs("plan-1", "org-1")).unwrap();
        // a retried apply must not trip over the existing visibility
        let second = resource.create(&session, &attrs("plan-1", "org-1")).unwrap();

        assert_eq!(first.id, "plan-1/org-1");
        assert_eq!(first, second);
        assert_eq!(mock.plan_visibility_count(), 1);
    }

    #[test]
    fn test_read_and_delete() {
        let mock = MockBackend::new();
        let session = Session::with_backend(mock.clone());
        let resource = RelationshipResource::new(ServicePlanAccessKind);

        mock.create_service_plan_access("plan-1", "org-1").unwrap();
        let read = resource.read(&session, "plan-1/org-1").unwrap().unwrap();
        assert_eq!(read.get("plan"), Some("plan-1"));
        assert_eq!(read.get("org"), Some("org-1"));

        resource.delete(&session, "plan-1/org-1").unwrap();
        assert!(resource.read(&session, "plan-1/org-1").unwrap().is_none());
    }

    #[test]
    fn test_import_error_names_format() {
        let session = Session::with_backend(MockBackend::new());
        let resource = RelationshipResource::new(ServicePlanAccessKind);
        let err = resource.import(&session, "plan-1").unwrap_err();
        assert!(err.to_string().contains("<plan-guid>/<org-guid>"));
    }
}
