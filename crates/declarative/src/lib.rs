//! # Declarative
//!
//! Lifecycle framework for resources managed by a declarative engine.
//!
//! The engine supplies desired state and persists one opaque identifier per
//! resource. This crate turns that into four operations (Create, Read,
//! Delete, Import) against a remote system reached through a typed session
//! handle.
//!
//! ## Core Concepts
//!
//! - **Identifier codec** ([`id`]): `<left>/<right>` tokens for
//!   relationships that have no id of their own
//! - **Resource**: one managed type and its four operations
//! - **RelationshipKind**: the remote calls for one kind of link; the
//!   lifecycle around them is shared by [`RelationshipResource`]
//! - **Refresh**: Read many tracked resources in parallel
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{RelationshipResource, Resource};
//!
//! let access = RelationshipResource::new(PrivateDomainAccess);
//! let created = access.create(&session, &attrs)?;   // id = "<org>/<domain>"
//! match access.read(&session, &created.id)? {
//!     Some(data) => println!("still there: {:?}", data.attributes),
//!     None => println!("gone, recreate on next apply"),
//! }
//! ```
//!
//! ## Absence is not an error
//!
//! A Read that finds nothing returns `Ok(None)` so the engine clears the id
//! and plans a recreate. A Read whose query fails returns `Err` and the id
//! stays tracked.

pub mod context;
pub mod error;
pub mod executor;
pub mod id;
pub mod relationship;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback};
pub use error::{RemoteError, ResourceError, Result};
pub use executor::{RefreshTarget, refresh_all};
pub use id::{CompositeId, IdShape, MalformedIdentifier};
pub use relationship::{RelationshipKind, RelationshipResource};
pub use resource::{AttributeSchema, BoxedResource, Resource, ResourceExt, ResourceRegistry};
pub use types::{Attributes, RefreshOptions, RefreshOutcome, RefreshSummary, ResourceData};
