//! Error types for lifecycle operations.
//!
//! Identifier and attribute problems are caller bugs and are never retried.
//! Remote failures are carried through untouched so the operator sees the
//! controller's own message.

use crate::id::MalformedIdentifier;
use thiserror::Error;

/// Boxed error from the remote collaborator
pub type RemoteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors that can occur during Create, Read, Delete or Import.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The identifier does not decode into exactly two fields.
    #[error(transparent)]
    MalformedIdentifier(#[from] MalformedIdentifier),

    /// A required attribute is missing from the engine's attribute map.
    #[error("missing required attribute '{0}'")]
    MissingAttribute(String),

    /// A key can't be encoded into an unambiguous identifier.
    #[error("invalid value '{value}' for attribute '{attribute}': must be non-empty and must not contain '/'")]
    InvalidKey {
        /// Attribute name
        attribute: String,
        /// Rejected value
        value: String,
    },

    /// The engine asked for a resource type nobody registered.
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    /// A verified import found nothing behind the identifier.
    #[error("{resource_type} '{id}' does not exist remotely")]
    ImportTargetMissing {
        /// Engine type name
        resource_type: String,
        /// Identifier that was imported
        id: String,
    },

    /// Transport, auth or controller-side failure.
    #[error(transparent)]
    Remote(RemoteError),
}

impl ResourceError {
    /// Wrap a collaborator error without changing its message.
    pub fn remote<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Remote(Box::new(err))
    }

    /// Whether this error came from the remote side.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Whether this error is a malformed identifier.
    #[must_use]
    pub fn is_malformed_identifier(&self) -> bool {
        matches!(self, Self::MalformedIdentifier(_))
    }

    /// Borrow the remote error as a concrete type, if it is one.
    pub fn remote_as<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Remote(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
