//! Composite identifiers for relationships without a native id
//!
//! A relationship such as "org X can use private domain Y" has no single
//! remote object to point at, so the engine tracks it under one opaque
//! token: `<left>/<right>`. The format is persisted in engine state and
//! must not change between versions.

use std::fmt;
use thiserror::Error;

/// Separator between the two halves of a composite identifier
pub const SEPARATOR: char = '/';

/// The id string did not split into exactly two non-empty fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to parse ID '{id}', expected format is '{expected}'")]
pub struct MalformedIdentifier {
    /// The offending identifier, verbatim
    pub id: String,
    /// Human-readable expected format, e.g. `<org-guid>/<domain-guid>`
    pub expected: String,
}

/// Shape of a composite identifier for one relationship kind
///
/// The labels only feed error messages; encoding is identical for every
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdShape {
    pub left: &'static str,
    pub right: &'static str,
}

impl IdShape {
    pub const fn new(left: &'static str, right: &'static str) -> Self {
        Self { left, right }
    }

    /// Expected format, as shown to the operator
    pub fn expected(&self) -> String {
        format!("<{}>{}<{}>", self.left, SEPARATOR, self.right)
    }

    /// Build the identifier for a pair of keys
    pub fn encode(&self, left: &str, right: &str) -> String {
        encode(left, right)
    }

    /// Split an identifier back into its keys
    pub fn decode(&self, token: &str) -> Result<CompositeId, MalformedIdentifier> {
        let mut parts = token.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(left), Some(right), None) if !left.is_empty() && !right.is_empty() => {
                Ok(CompositeId {
                    left: left.to_string(),
                    right: right.to_string(),
                })
            }
            _ => Err(MalformedIdentifier {
                id: token.to_string(),
                expected: self.expected(),
            }),
        }
    }
}

/// Shape used by the free functions when no kind-specific labels exist
pub const GENERIC: IdShape = IdShape::new("left", "right");

/// Decoded pair of keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub left: String,
    pub right: String,
}

impl CompositeId {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn into_pair(self) -> (String, String) {
        (self.left, self.right)
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.left, SEPARATOR, self.right)
    }
}

/// `left/right`, no escaping
pub fn encode(left: &str, right: &str) -> String {
    format!("{left}{SEPARATOR}{right}")
}

/// Inverse of [`encode`] for keys without the separator
pub fn decode(token: &str) -> Result<(String, String), MalformedIdentifier> {
    GENERIC.decode(token).map(CompositeId::into_pair)
}

/// Whether a key can be encoded without making the id ambiguous
pub fn is_encodable_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(SEPARATOR)
}
