//! Error types for controller operations.
//!
//! Errors are categorized so callers can tell a missing object apart from
//! a failed query, and so the transport layer can decide what to retry.

use std::fmt;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of controller errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable).
    Network,
    /// The requested object does not exist.
    NotFound,
    /// Token missing, expired or lacking permission.
    Auth,
    /// The controller refused because the object already exists or is in use.
    Conflict,
    /// Response body could not be understood.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Object not found",
            Self::Auth => "Authentication or authorization failure",
            Self::Conflict => "Object already exists or is in use",
            Self::Format => "Invalid response from controller",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check connectivity to the API endpoint and try again",
            Self::NotFound => "Verify the GUIDs refer to existing objects",
            Self::Auth => "Refresh the access token (e.g. `cf oauth-token`) and try again",
            Self::Conflict => "Import the existing object instead of creating it",
            Self::Format => "Check that api_url points at a Cloud Controller v2 API",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur talking to the controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed. For an error status, `message` is the
    /// controller's own `error_code (code): description`.
    #[error("{message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Lookup found no object of the given kind.
    #[error("{kind} '{name}' not found")]
    ModelNotFound {
        /// Kind of object, e.g. "service instance".
        kind: String,
        /// Name or GUID that was looked up.
        name: String,
    },

    /// The controller already has this object.
    #[error("{0}")]
    AlreadyExists(String),

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Session could not be configured.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Create a not-found error.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ModelNotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// HTTP status returned by the controller, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpError { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError { status, .. } => match status {
                Some(401 | 403) => ErrorCategory::Auth,
                Some(404) => ErrorCategory::NotFound,
                Some(409) => ErrorCategory::Conflict,
                Some(s) if *s >= 500 => ErrorCategory::Network,
                Some(_) => ErrorCategory::Other,
                None => ErrorCategory::Network,
            },
            Error::ModelNotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists(_) => ErrorCategory::Conflict,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::InvalidConfig(_) => ErrorCategory::Other,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the object simply isn't there.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Conflict.is_retryable());
        assert!(!ErrorCategory::Format.is_retryable());
        assert!(!ErrorCategory::Other.is_retryable());
    }

    #[test]
    fn test_error_category_advice() {
        assert!(!ErrorCategory::Network.advice().is_empty());
        assert!(!ErrorCategory::Auth.advice().is_empty());
        assert!(!ErrorCategory::NotFound.advice().is_empty());
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Network);
        assert!(display.contains("Network"));
    }

    #[test]
    fn test_http_status_categories() {
        assert_eq!(Error::http("x", Some(401)).category(), ErrorCategory::Auth);
        assert_eq!(Error::http("x", Some(403)).category(), ErrorCategory::Auth);
        assert_eq!(Error::http("x", Some(404)).category(), ErrorCategory::NotFound);
        assert_eq!(Error::http("x", Some(409)).category(), ErrorCategory::Conflict);
        assert_eq!(Error::http("x", Some(502)).category(), ErrorCategory::Network);
        assert_eq!(Error::http("x", Some(400)).category(), ErrorCategory::Other);
        assert_eq!(Error::http("x", None).category(), ErrorCategory::Network);
    }

    #[test]
    fn test_model_not_found() {
        let err = Error::not_found("service instance", "mysql");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "service instance 'mysql' not found");
    }

    #[test]
    fn test_already_exists_is_conflict() {
        let err = Error::AlreadyExists("visibility exists".into());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = serde_err.into();
        assert_eq!(err.category(), ErrorCategory::Format);
    }

    #[test]
    fn test_from_ureq_status() {
        let err: Error = ureq::Error::StatusCode(404).into();
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_http_message_not_wrapped() {
        let err = Error::http("CF-OrganizationNotFound (30003): not found", Some(404));
        assert_eq!(err.to_string(), "CF-OrganizationNotFound (30003): not found");
        assert_eq!(Error::AlreadyExists("x".into()).status(), None);
    }
}
