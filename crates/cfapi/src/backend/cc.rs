//! Cloud Controller v2 backend.
//!
//! This module provides the [`CcBackend`] implementation, which talks to the
//! controller's REST API with a bearer token.
//!
//! # Authentication
//!
//! The token is used as-is. Obtaining and refreshing it is the caller's job
//! (for example `cf oauth-token`).

use crate::backend::{DomainManager, ServiceManager};
use crate::error::{Error, Result};
use crate::types::{ServiceInstance, ServicePlanVisibility, SessionConfig};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use ureq::Body;
use ureq::http::Response;
use ureq::tls::TlsConfig;

/// Upper bound on followed `next_url` links for one listing.
const MAX_PAGES: usize = 100;

/// Page size requested for listings; the controller's maximum.
const PAGE_SIZE: &str = "100";

/// Cloud Controller v2 backend.
///
/// # Example
///
/// ```no_run
/// use cfapi::backend::DomainManager;
/// use cfapi::backend::cc::CcBackend;
/// use cfapi::SessionConfig;
///
/// let backend = CcBackend::new(&SessionConfig::new("https://api.example.com", "token")).unwrap();
/// let shared = backend.has_private_domain_access("org-guid", "domain-guid").unwrap();
/// println!("shared: {shared}");
/// ```
pub struct CcBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL, without trailing slash.
    api_url: String,
    /// `Authorization` header value.
    authorization: String,
}

impl CcBackend {
    /// Create a new backend from session settings.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let api_url = config.api_url.trim_end_matches('/').to_string();
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(Error::InvalidConfig(format!(
                "api_url must start with http:// or https://, got '{}'",
                config.api_url
            )));
        }
        if config.access_token.is_empty() {
            return Err(Error::InvalidConfig("access token is empty".to_string()));
        }

        let tls = TlsConfig::builder()
            .disable_verification(config.skip_ssl_validation)
            .build();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .tls_config(tls)
            .http_status_as_error(false)
            .build()
            .into();

        let token = config.access_token.trim();
        let authorization = if token.to_ascii_lowercase().starts_with("bearer ") {
            token.to_string()
        } else {
            format!("bearer {token}")
        };

        Ok(Self {
            agent,
            api_url,
            authorization,
        })
    }

    /// Get the API base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build an absolute URL from an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn private_domain_url(&self, org: &str, domain: &str) -> String {
        self.url(&format!("/v2/organizations/{org}/private_domains/{domain}"))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        log::trace!("GET {url} {query:?}");

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let mut response = check_status(request.call()?)?;
        let value = response.body_mut().read_json()?;
        Ok(value)
    }

    /// Collect every resource of a paged listing.
    fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<CcResource<T>>> {
        let mut first: Vec<(&str, &str)> = vec![("results-per-page", PAGE_SIZE)];
        first.extend_from_slice(query);
        let mut page: CcPage<T> = self.get_json(path, &first)?;
        let mut resources = std::mem::take(&mut page.resources);

        let mut pages = 1;
        while let Some(next) = page.next_url.take() {
            if pages >= MAX_PAGES {
                return Err(Error::InvalidResponse(format!(
                    "listing {path} exceeded {MAX_PAGES} pages"
                )));
            }
            // next_url already carries the query string.
            page = self.get_json(&next, &[])?;
            resources.append(&mut page.resources);
            pages += 1;
        }

        Ok(resources)
    }

    fn put_empty(&self, url: &str) -> Result<()> {
        log::trace!("PUT {url}");
        let response = self
            .agent
            .put(url)
            .header("Authorization", self.authorization.as_str())
            .send_empty()?;
        check_status(response)?;
        Ok(())
    }

    /// DELETE, treating 404 as already deleted.
    fn delete_tolerant(&self, url: &str) -> Result<()> {
        log::trace!("DELETE {url}");
        let response = self
            .agent
            .delete(url)
            .header("Authorization", self.authorization.as_str())
            .call()?;
        if response.status().as_u16() == 404 {
            log::debug!("{url} already gone");
            return Ok(());
        }
        check_status(response)?;
        Ok(())
    }

    fn find_plan_visibility(&self, plan: &str, org: &str) -> Result<Option<ServicePlanVisibility>> {
        let plan_filter = format!("service_plan_guid:{plan}");
        let org_filter = format!("organization_guid:{org}");
        let resources: Vec<CcResource<VisibilityEntity>> = self.list_all(
            "/v2/service_plan_visibilities",
            &[("q", plan_filter.as_str()), ("q", org_filter.as_str())],
        )?;

        Ok(resources
            .into_iter()
            .map(ServicePlanVisibility::from)
            .find(|v| v.service_plan_guid == plan && v.organization_guid == org))
    }
}

impl DomainManager for CcBackend {
    fn has_private_domain_access(&self, org: &str, domain: &str) -> Result<bool> {
        let path = format!("/v2/organizations/{org}/private_domains");
        match self.list_all::<serde_json::Value>(&path, &[]) {
            Ok(domains) => Ok(domains.iter().any(|d| d.metadata.guid == domain)),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_private_domain_access(&self, org: &str, domain: &str) -> Result<()> {
        self.put_empty(&self.private_domain_url(org, domain))
    }

    fn delete_private_domain_access(&self, org: &str, domain: &str) -> Result<()> {
        self.delete_tolerant(&self.private_domain_url(org, domain))
    }
}

impl ServiceManager for CcBackend {
    fn has_service_plan_access(&self, plan: &str, org: &str) -> Result<bool> {
        Ok(self.find_plan_visibility(plan, org)?.is_some())
    }

    fn create_service_plan_access(&self, plan: &str, org: &str) -> Result<()> {
        let url = self.url("/v2/service_plan_visibilities");
        log::trace!("POST {url}");
        let body = serde_json::json!({
            "service_plan_guid": plan,
            "organization_guid": org,
        });
        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.authorization.as_str())
            .send_json(&body)?;
        let Err(err) = check_status(response) else {
            return Ok(());
        };
        // CF-ServicePlanVisibilityAlreadyExists comes back as a 400
        if err.status() == Some(400) && self.has_service_plan_access(plan, org)? {
            return Err(Error::AlreadyExists(format!(
                "service plan '{plan}' is already visible to organization '{org}'"
            )));
        }
        Err(err)
    }

    fn delete_service_plan_access(&self, plan: &str, org: &str) -> Result<()> {
        match self.find_plan_visibility(plan, org)? {
            Some(visibility) => self.delete_tolerant(
                &self.url(&format!("/v2/service_plan_visibilities/{}", visibility.guid)),
            ),
            None => Ok(()),
        }
    }

    fn read_service_instance(&self, guid: &str) -> Result<ServiceInstance> {
        let path = format!("/v2/service_instances/{guid}");
        match self.get_json::<CcResource<ServiceInstanceEntity>>(&path, &[]) {
            Ok(resource) => Ok(resource.into()),
            Err(e) if e.is_not_found() => Err(Error::not_found("service instance", guid)),
            Err(e) => Err(e),
        }
    }

    fn find_service_instance(&self, name: &str, space_guid: &str) -> Result<ServiceInstance> {
        let path = format!("/v2/spaces/{space_guid}/service_instances");
        let filter = format!("name:{name}");
        let resources: Vec<CcResource<ServiceInstanceEntity>> =
            self.list_all(&path, &[("q", filter.as_str())])?;

        resources
            .into_iter()
            .map(ServiceInstance::from)
            .find(|si| si.name == name)
            .ok_or_else(|| Error::not_found("service instance", name))
    }
}

/// Pass a success response through; turn an error status into [`Error`].
///
/// The controller's error body is kept so the operator sees its
/// `error_code` and description.
fn check_status(mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    let body = match response.body_mut().read_to_string() {
        Ok(body) => body,
        Err(e) => {
            log::debug!("could not read error body for HTTP {status}: {e}");
            String::new()
        }
    };
    Err(error_from_body(status, &body))
}

fn error_from_body(status: u16, body: &str) -> Error {
    let body = body.trim();
    let message = match serde_json::from_str::<CcErrorBody>(body) {
        Ok(parsed) if parsed.error_code.is_some() || parsed.description.is_some() => {
            parsed.to_string()
        }
        _ if body.is_empty() => format!("HTTP {status}"),
        _ => format!("HTTP {status}: {body}"),
    };
    Error::http(message, Some(status))
}

// =============================================================================
// Cloud Controller v2 response types
// =============================================================================

/// Error document returned with any 4xx/5xx status.
#[derive(Debug, Default, Deserialize)]
struct CcErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl fmt::Display for CcErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_code.as_deref().unwrap_or("CF-Error"))?;
        if let Some(code) = self.code {
            write!(f, " ({code})")?;
        }
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CcPage<T> {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default = "Vec::new")]
    resources: Vec<CcResource<T>>,
}

#[derive(Debug, Deserialize)]
struct CcResource<T> {
    metadata: CcMetadata,
    entity: T,
}

#[derive(Debug, Deserialize)]
struct CcMetadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct VisibilityEntity {
    service_plan_guid: String,
    organization_guid: String,
}

#[derive(Debug, Deserialize)]
struct ServiceInstanceEntity {
    name: String,
    space_guid: String,
    #[serde(default)]
    service_plan_guid: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<CcResource<VisibilityEntity>> for ServicePlanVisibility {
    fn from(r: CcResource<VisibilityEntity>) -> Self {
        Self {
            guid: r.metadata.guid,
            service_plan_guid: r.entity.service_plan_guid,
            organization_guid: r.entity.organization_guid,
        }
    }
}

impl From<CcResource<ServiceInstanceEntity>> for ServiceInstance {
    fn from(r: CcResource<ServiceInstanceEntity>) -> Self {
        Self {
            guid: r.metadata.guid,
            name: r.entity.name,
            space_guid: r.entity.space_guid,
            // user-provided instances have no plan
            service_plan_guid: r.entity.service_plan_guid.unwrap_or_default(),
            tags: r.entity.tags,
        }
    }
}
