//! Provider configuration
//!
//! Loaded from `config.toml`, then overridden by environment variables and
//! CLI flags (clap handles the env lookup).

use anyhow::{Context, Result, bail};
use cfapi::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Cloud Controller endpoint, e.g. `https://api.sys.example.com`
    #[serde(default)]
    pub api_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub skip_ssl_validation: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            access_token: None,
            skip_ssl_validation: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Values that take precedence over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub skip_ssl_validation: Option<bool>,
}

impl ProviderConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Layer CLI/env values over the file values
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(token) = overrides.access_token {
            self.access_token = Some(token);
        }
        if let Some(skip) = overrides.skip_ssl_validation {
            self.skip_ssl_validation = skip;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if url.is_empty() {
            bail!("api_url is not set (use --api-url, CF_API_URL or config.toml)");
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            bail!("api_url must start with http:// or https://, got '{url}'");
        }
        if self.access_token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            bail!("access_token is not set (use --access-token, CF_ACCESS_TOKEN or config.toml)");
        }
        Ok(())
    }

    /// Session settings for the controller client
    pub fn to_session_config(&self) -> Result<SessionConfig> {
        self.validate()?;
        let token = self.access_token.clone().unwrap_or_default();
        Ok(SessionConfig::new(self.api_url.trim(), token)
            .skip_ssl_validation(self.skip_ssl_validation)
            .timeout(Duration::from_secs(self.timeout_secs)))
    }
}

/// Resolve the config file: explicit path first, then the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(crate::paths::expand(&path.to_string_lossy())),
        None => crate::paths::config_file(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid() -> ProviderConfig {
        ProviderConfig {
            api_url: "https://api.example.com".into(),
            access_token: Some("token".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert!(!config.skip_ssl_validation);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = \"https://api.example.com\"\n").unwrap();

        let config = ProviderConfig::load(&path).unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.access_token, None);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = ProviderConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let config = valid().with_overrides(Overrides {
            api_url: Some("https://other.example.com".into()),
            access_token: None,
            skip_ssl_validation: Some(true),
        });
        assert_eq!(config.api_url, "https://other.example.com");
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert!(config.skip_ssl_validation);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.api_url = String::new();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.api_url = "ftp://api.example.com".into();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.access_token = Some("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_session_config() {
        let mut config = valid();
        config.timeout_secs = 5;
        let session = config.to_session_config().unwrap();
        assert_eq!(session.api_url, "https://api.example.com");
        assert_eq!(session.timeout, Duration::from_secs(5));
        assert!(!session.skip_ssl_validation);
    }
}
