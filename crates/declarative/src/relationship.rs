//! Managed relationships between two remote objects
//!
//! Some associations ("org X can use private domain Y") exist remotely
//! only as a link, never as an object with its own id. Every such kind
//! follows the same lifecycle:
//!
//! - Create: call the remote create, then record `encode(left, right)`
//! - Read: decode, ask whether the link still exists, clear the id if not
//! - Delete: decode, call the remote delete (already gone is fine)
//! - Import: decode to check the shape, then pass the id through
//!
//! A kind only names its attributes and supplies the three remote calls.

use crate::error::{ResourceError, Result};
use crate::id::{self, CompositeId, IdShape};
use crate::resource::{AttributeSchema, Resource};
use crate::types::{Attributes, ResourceData};
use std::fmt;

/// One kind of managed relationship and its remote capabilities
pub trait RelationshipKind: Send + Sync + fmt::Debug {
    /// Service handle the remote calls go through
    type Session: ?Sized;
    /// Error the remote side reports
    type Error: std::error::Error + Send + Sync + 'static;
    /// Typed record for this kind
    type Record: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// Engine type name
    const TYPE_NAME: &'static str;
    /// Attribute name of the owning object
    const LEFT: &'static str;
    /// Attribute name of the target object
    const RIGHT: &'static str;
    /// Identifier shape, for error messages
    const SHAPE: IdShape;
    /// Whether creating an existing link is harmless remotely
    ///
    /// When false, Create checks existence first and skips the remote
    /// create for a link that is already there.
    const CREATE_IS_IDEMPOTENT: bool = true;

    /// Human-readable description
    fn description(&self) -> String;

    /// Build the typed record from its two keys
    fn record(left: String, right: String) -> Self::Record;

    /// Borrow the two keys back out of a record
    fn keys(record: &Self::Record) -> (&str, &str);

    /// `Ok(false)` when absent; errors only for failed queries
    fn check_relationship_exists(
        &self,
        session: &Self::Session,
        left: &str,
        right: &str,
    ) -> std::result::Result<bool, Self::Error>;

    fn create_relationship(
        &self,
        session: &Self::Session,
        left: &str,
        right: &str,
    ) -> std::result::Result<(), Self::Error>;

    /// Must treat an already-absent link as success
    fn delete_relationship(
        &self,
        session: &Self::Session,
        left: &str,
        right: &str,
    ) -> std::result::Result<(), Self::Error>;
}

/// Lifecycle for one relationship kind
#[derive(Debug, Clone, Default)]
pub struct RelationshipResource<K> {
    kind: K,
}

impl<K: RelationshipKind> RelationshipResource<K> {
    pub fn new(kind: K) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Identifier for a record
    pub fn compute_id(&self, record: &K::Record) -> String {
        let (left, right) = K::keys(record);
        K::SHAPE.encode(left, right)
    }

    /// Decode an identifier with this kind's error message
    pub fn parse_id(&self, id: &str) -> Result<CompositeId> {
        Ok(K::SHAPE.decode(id)?)
    }

    /// Convert an engine attribute map into the typed record
    pub fn record_from_attributes(&self, attrs: &Attributes) -> Result<K::Record> {
        let left = required_key(attrs, K::LEFT)?;
        let right = required_key(attrs, K::RIGHT)?;
        Ok(K::record(left, right))
    }

    /// Convert the typed record into an engine attribute map
    pub fn record_to_attributes(&self, record: &K::Record) -> Attributes {
        let (left, right) = K::keys(record);
        let mut attrs = Attributes::new();
        attrs.insert(K::LEFT.to_string(), left.to_string());
        attrs.insert(K::RIGHT.to_string(), right.to_string());
        attrs
    }

    /// Create the link and return its identifier
    pub fn create_record(&self, session: &K::Session, record: &K::Record) -> Result<String> {
        let (left, right) = K::keys(record);
        check_key(K::LEFT, left)?;
        check_key(K::RIGHT, right)?;

        if !K::CREATE_IS_IDEMPOTENT
            && self
                .kind
                .check_relationship_exists(session, left, right)
                .map_err(ResourceError::remote)?
        {
            log::debug!("{} {left}/{right} already exists, adopting", K::TYPE_NAME);
        } else {
            log::debug!("Creating {} {left}/{right}", K::TYPE_NAME);
            self.kind
                .create_relationship(session, left, right)
                .map_err(ResourceError::remote)?;
        }

        Ok(self.compute_id(record))
    }

    /// Read back a link; `None` means it no longer exists
    pub fn read_record(&self, session: &K::Session, id: &str) -> Result<Option<K::Record>> {
        let CompositeId { left, right } = self.parse_id(id)?;

        let found = self
            .kind
            .check_relationship_exists(session, &left, &right)
            .map_err(ResourceError::remote)?;
        log::debug!("{} {id}: exists={found}", K::TYPE_NAME);

        if !found {
            log::info!("{} {id} no longer exists remotely", K::TYPE_NAME);
            return Ok(None);
        }
        Ok(Some(K::record(left, right)))
    }

    /// Remove a link by identifier
    pub fn delete_id(&self, session: &K::Session, id: &str) -> Result<()> {
        let CompositeId { left, right } = self.parse_id(id)?;
        log::debug!("Deleting {} {id}", K::TYPE_NAME);
        self.kind
            .delete_relationship(session, &left, &right)
            .map_err(ResourceError::remote)
    }
}

fn required_key(attrs: &Attributes, name: &str) -> Result<String> {
    attrs
        .get(name)
        .cloned()
        .ok_or_else(|| ResourceError::MissingAttribute(name.to_string()))
}

fn check_key(attribute: &str, value: &str) -> Result<()> {
    if id::is_encodable_key(value) {
        Ok(())
    } else {
        Err(ResourceError::InvalidKey {
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
    }
}

impl<K: RelationshipKind> Resource<K::Session> for RelationshipResource<K> {
    fn resource_type(&self) -> &'static str {
        K::TYPE_NAME
    }

    fn description(&self) -> String {
        self.kind.description()
    }

    fn id_format(&self) -> String {
        K::SHAPE.expected()
    }

    fn schema(&self) -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::required_force_new(K::LEFT),
            AttributeSchema::required_force_new(K::RIGHT),
        ]
    }

    fn create(&self, session: &K::Session, attrs: &Attributes) -> Result<ResourceData> {
        let record = self.record_from_attributes(attrs)?;
        let id = self.create_record(session, &record)?;
        Ok(ResourceData::new(id, self.record_to_attributes(&record)))
    }

    fn read(&self, session: &K::Session, id: &str) -> Result<Option<ResourceData>> {
        Ok(self
            .read_record(session, id)?
            .map(|record| ResourceData::new(id, self.record_to_attributes(&record))))
    }

    fn delete(&self, session: &K::Session, id: &str) -> Result<()> {
        self.delete_id(session, id)
    }

    fn import(&self, _session: &K::Session, id: &str) -> Result<ResourceData> {
        self.parse_id(id)?;
        Ok(ResourceData::passthrough(id))
    }
}
