//! # cfapi
//!
//! Client-side view of a Cloud Foundry controller for resource providers.
//!
//! This crate provides:
//! - Capability traits for the objects providers manage
//!   ([`DomainManager`], [`ServiceManager`])
//! - A [`Session`] handle that owns them and is passed explicitly to every
//!   operation
//! - A Cloud Controller v2 backend over blocking HTTP
//! - An in-memory [`MockBackend`] for tests
//!
//! ## Example
//!
//! ```no_run
//! use cfapi::{Session, SessionConfig};
//!
//! let session = Session::connect(&SessionConfig::new("https://api.example.com", "token"))
//!     .expect("invalid configuration");
//!
//! let shared = session
//!     .domain_manager()
//!     .has_private_domain_access("org-guid", "domain-guid")
//!     .unwrap();
//! println!("shared: {shared}");
//! ```
//!
//! ## Absence vs failure
//!
//! Existence checks answer `Ok(false)` for a missing object. Errors mean
//! the question could not be answered; use [`Error::is_not_found`] where a
//! lookup-by-name reports absence as [`Error::ModelNotFound`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::{DomainManager, MockBackend, ServiceManager};
pub use error::{Error, ErrorCategory, Result};
pub use types::{ServiceInstance, ServicePlanVisibility, SessionConfig};

use backend::cc::CcBackend;
use std::sync::Arc;

/// Handle to one controller, shared by every lifecycle operation.
///
/// Built once at program start and passed down by reference.
///
/// # Example
///
/// ```
/// use cfapi::{MockBackend, Session};
///
/// let mock = MockBackend::new();
/// let session = Session::with_backend(mock.clone());
///
/// session.domain_manager().create_private_domain_access("org-1", "domain-1").unwrap();
/// assert!(session.domain_manager().has_private_domain_access("org-1", "domain-1").unwrap());
/// ```
#[derive(Clone)]
pub struct Session {
    domains: Arc<dyn DomainManager>,
    services: Arc<dyn ServiceManager>,
}

impl Session {
    /// Create a session backed by the Cloud Controller REST API.
    pub fn connect(config: &SessionConfig) -> Result<Self> {
        Ok(Self::with_backend(CcBackend::new(config)?))
    }

    /// Create a session with a custom backend (useful for testing).
    pub fn with_backend<B>(backend: B) -> Self
    where
        B: DomainManager + ServiceManager + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            domains: backend.clone(),
            services: backend,
        }
    }

    /// Private domain operations.
    pub fn domain_manager(&self) -> &dyn DomainManager {
        self.domains.as_ref()
    }

    /// Service plan and instance operations.
    pub fn service_manager(&self) -> &dyn ServiceManager {
        self.services.as_ref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
