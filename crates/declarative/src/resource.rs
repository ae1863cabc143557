//! Resource trait for the engine's four-operation contract
//!
//! A Resource is one managed type (e.g. `cf_private_domain_access`). The
//! engine drives it with Create, Read, Delete and Import; everything it
//! needs to reach the remote side comes in through the typed session
//! handle `S`, never through ambient state.

use crate::error::{ResourceError, Result};
use crate::types::{Attributes, RefreshOutcome, ResourceData};
use std::collections::BTreeMap;
use std::fmt;

/// Schema entry for one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub required: bool,
    /// Changing the value forces destroy-and-recreate
    pub force_new: bool,
}

impl AttributeSchema {
    /// Required string attribute that can't be updated in place
    pub const fn required_force_new(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            force_new: true,
        }
    }
}

/// Core trait for managed resource types
///
/// `S` is the service handle every operation receives. Implementations
/// hold no mutable state of their own, so the engine may call them for
/// different resource instances from different threads at once.
///
/// # Example
///
/// ```ignore
/// use declarative::{Attributes, Resource, ResourceData, Result};
///
/// #[derive(Debug)]
/// struct Marker;
///
/// impl Resource<MySession> for Marker {
///     fn resource_type(&self) -> &'static str { "marker" }
///     fn description(&self) -> String { "A marker".into() }
///     fn id_format(&self) -> String { "<name>".into() }
///     fn schema(&self) -> Vec<AttributeSchema> { vec![] }
///     fn create(&self, s: &MySession, attrs: &Attributes) -> Result<ResourceData> { todo!() }
///     fn read(&self, s: &MySession, id: &str) -> Result<Option<ResourceData>> { todo!() }
///     fn delete(&self, s: &MySession, id: &str) -> Result<()> { todo!() }
///     fn import(&self, s: &MySession, id: &str) -> Result<ResourceData> { todo!() }
/// }
/// ```
pub trait Resource<S: ?Sized>: Send + Sync + fmt::Debug {
    /// Engine type name, e.g. "cf_private_domain_access"
    fn resource_type(&self) -> &'static str;

    /// Human-readable description of what this type manages
    fn description(&self) -> String;

    /// Identifier format shown to operators on import errors
    fn id_format(&self) -> String;

    /// Attributes the engine must supply
    fn schema(&self) -> Vec<AttributeSchema>;

    /// Perform the remote side effect and return the new record
    ///
    /// On error nothing is recorded; the engine retries Create on the next
    /// apply.
    fn create(&self, session: &S, attrs: &Attributes) -> Result<ResourceData>;

    /// Refresh a tracked resource
    ///
    /// `Ok(None)` means the remote object is gone and the engine should
    /// clear the id. Query failures are errors and must not clear it.
    fn read(&self, session: &S, id: &str) -> Result<Option<ResourceData>>;

    /// Remove the remote object; already-absent counts as success
    fn delete(&self, session: &S, id: &str) -> Result<()>;

    /// Adopt an existing remote object from an operator-supplied id
    ///
    /// Validates the id's shape only. The returned record carries the id
    /// alone and is filled in by a later Read.
    fn import(&self, session: &S, id: &str) -> Result<ResourceData>;

    /// Stricter import that also requires the remote object to exist
    fn import_verified(&self, session: &S, id: &str) -> Result<ResourceData> {
        let imported = self.import(session, id)?;
        match self.read(session, &imported.id)? {
            Some(data) => Ok(data),
            None => Err(ResourceError::ImportTargetMissing {
                resource_type: self.resource_type().to_string(),
                id: id.to_string(),
            }),
        }
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource<S> = Box<dyn Resource<S>>;

/// Extension trait for working with resources
pub trait ResourceExt<S: ?Sized> {
    /// Run Read and fold the result into a [`RefreshOutcome`]
    fn refresh(&self, session: &S, id: &str) -> RefreshOutcome;
}

impl<S: ?Sized, R: Resource<S> + ?Sized> ResourceExt<S> for R {
    fn refresh(&self, session: &S, id: &str) -> RefreshOutcome {
        match self.read(session, id) {
            Ok(Some(data)) => RefreshOutcome::Present(data),
            Ok(None) => RefreshOutcome::Absent,
            Err(e) => RefreshOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Resource types keyed by engine type name
pub struct ResourceRegistry<S: ?Sized> {
    resources: BTreeMap<&'static str, BoxedResource<S>>,
}

impl<S: ?Sized> ResourceRegistry<S> {
    pub fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    /// Register a resource type, replacing any previous one of the same name
    pub fn register(&mut self, resource: BoxedResource<S>) {
        self.resources.insert(resource.resource_type(), resource);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, resource: BoxedResource<S>) -> Self {
        self.register(resource);
        self
    }

    /// Look up a resource type
    pub fn get(&self, resource_type: &str) -> Result<&dyn Resource<S>> {
        self.resources
            .get(resource_type)
            .map(AsRef::as_ref)
            .ok_or_else(|| ResourceError::UnknownResourceType(resource_type.to_string()))
    }

    /// Registered types in name order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource<S>> {
        self.resources.values().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<S: ?Sized> Default for ResourceRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> fmt::Debug for ResourceRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.resources.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Session holding the names that exist remotely
    struct Names(Mutex<BTreeSet<String>>);

    #[derive(Debug)]
    struct NameResource;

    impl Resource<Names> for NameResource {
        fn resource_type(&self) -> &'static str {
            "test_name"
        }

        fn description(&self) -> String {
            "Test name".into()
        }

        fn id_format(&self) -> String {
            "<name>".into()
        }

        fn schema(&self) -> Vec<AttributeSchema> {
            vec![AttributeSchema::required_force_new("name")]
        }

        fn create(&self, session: &Names, attrs: &Attributes) -> Result<ResourceData> {
            let name = attrs
                .get("name")
                .ok_or_else(|| ResourceError::MissingAttribute("name".into()))?;
            session.0.lock().unwrap().insert(name.clone());
            Ok(ResourceData::new(name.clone(), attrs.clone()))
        }

        fn read(&self, session: &Names, id: &str) -> Result<Option<ResourceData>> {
            if session.0.lock().unwrap().contains(id) {
                let mut attrs = Attributes::new();
                attrs.insert("name".into(), id.into());
                Ok(Some(ResourceData::new(id, attrs)))
            } else {
                Ok(None)
            }
        }

        fn delete(&self, session: &Names, id: &str) -> Result<()> {
            session.0.lock().unwrap().remove(id);
            Ok(())
        }

        fn import(&self, _session: &Names, id: &str) -> Result<ResourceData> {
            Ok(ResourceData::passthrough(id))
        }
    }

    fn names(items: &[&str]) -> Names {
        Names(Mutex::new(items.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn test_refresh_present_and_absent() {
        let session = names(&["a"]);
        assert!(NameResource.refresh(&session, "a").is_present());
        assert!(NameResource.refresh(&session, "b").is_absent());
    }

    #[test]
    fn test_import_verified_rejects_missing() {
        let session = names(&[]);
        let err = NameResource.import_verified(&session, "ghost").unwrap_err();
        assert!(matches!(err, ResourceError::ImportTargetMissing { .. }));
    }

    #[test]
    fn test_import_verified_reads_back() {
        let session = names(&["a"]);
        let data = NameResource.import_verified(&session, "a").unwrap();
        assert_eq!(data.get("name"), Some("a"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry: ResourceRegistry<Names> =
            ResourceRegistry::new().with(Box::new(NameResource));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("test_name").is_ok());
        assert!(matches!(
            registry.get("nope"),
            Err(ResourceError::UnknownResourceType(_))
        ));
    }
}
