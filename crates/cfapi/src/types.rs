//! Core types for controller objects and session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A managed service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Controller GUID.
    pub guid: String,
    /// Instance name, unique within its space.
    pub name: String,
    /// GUID of the owning space.
    pub space_guid: String,
    /// GUID of the service plan.
    pub service_plan_guid: String,
    /// User tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ServiceInstance {
    /// Create a new service instance record.
    pub fn new(
        guid: impl Into<String>,
        name: impl Into<String>,
        space_guid: impl Into<String>,
        service_plan_guid: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            space_guid: space_guid.into(),
            service_plan_guid: service_plan_guid.into(),
            tags: Vec::new(),
        }
    }

    /// Set tags (builder pattern).
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Grants one organization access to one service plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlanVisibility {
    /// Controller GUID of the visibility itself.
    pub guid: String,
    /// Service plan GUID.
    pub service_plan_guid: String,
    /// Organization GUID.
    pub organization_guid: String,
}

/// Connection settings for a controller session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the Cloud Controller API, e.g. `https://api.sys.example.com`.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub access_token: String,
    /// Accept any TLS certificate.
    pub skip_ssl_validation: bool,
    /// Timeout for each request.
    pub timeout: Duration,
}

impl SessionConfig {
    /// Create a config with default TLS and timeout settings.
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            access_token: access_token.into(),
            skip_ssl_validation: false,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set whether to skip TLS verification (builder pattern).
    #[must_use]
    pub fn skip_ssl_validation(mut self, skip: bool) -> Self {
        self.skip_ssl_validation = skip;
        self
    }

    /// Set the per-request timeout (builder pattern).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
