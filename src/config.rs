//! Client configuration
//!
//! ```
//! use ldx_insight_client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .base_url("https://api.example.com/api/v1")
//!     .timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.url_for("/datasets"), "https://api.example.com/api/v1/datasets");
//! assert!(config.is_auth_path("/auth/login"));
//! ```

use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::error::{ClientError, Result};

/// Fixed request timeout applied to every call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Application identifier sent with every request
pub const DEFAULT_APP_CODE: &str = "hit-members";

/// Header carrying the application identifier
pub const APP_CODE_HEADER: &str = "App-Code";

/// Base address used when `API_BASE_URL` is not set
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api/v1";

/// Environment variable holding the API base address
pub const API_BASE_ENV: &str = "API_BASE_URL";

/// Path prefix of the authentication endpoint family
pub const DEFAULT_AUTH_PREFIX: &str = "/auth";

/// Refresh endpoint, relative to the base address
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Configuration for [`AuthenticatedClient`](crate::AuthenticatedClient)
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ClientConfig"),
    builder_type(doc = "Builder for ClientConfig", vis = "pub"),
    build_method(doc = "Build the ClientConfig")
)]
pub struct ClientConfig {
    /// Base address every request path is appended to
    #[builder(setter(into))]
    pub base_url: String,

    /// Value of the `App-Code` header
    #[builder(default = DEFAULT_APP_CODE.to_string(), setter(into))]
    pub app_code: String,

    /// Per-request timeout
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub timeout: Duration,

    /// Paths equal to or below this prefix never trigger a refresh on 401
    #[builder(default = DEFAULT_AUTH_PREFIX.to_string(), setter(into))]
    pub auth_prefix: String,

    /// Refresh endpoint path
    #[builder(default = DEFAULT_REFRESH_PATH.to_string(), setter(into))]
    pub refresh_path: String,

    /// Re-dispatch the failing request once after a successful refresh
    #[builder(default = true)]
    pub retry_after_refresh: bool,

    /// Serialize concurrent refreshes and skip ones made redundant by another request
    #[builder(default = true)]
    pub coalesce_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().base_url(DEFAULT_API_BASE).build()
    }
}

impl ClientConfig {
    /// Configuration from the process environment (`API_BASE_URL`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(API_BASE_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::builder().base_url(base_url).build()
    }

    /// Check the configuration before a client is built from it
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidConfig` if the base address is not an absolute
    /// http(s) URL, the timeout is zero, or the refresh endpoint lies outside the
    /// authentication family.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::invalid_config(format!(
                "base_url must be an absolute http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::invalid_config("timeout must be non-zero"));
        }
        if !self.auth_prefix.starts_with('/') || self.auth_prefix.len() < 2 {
            return Err(ClientError::invalid_config(format!(
                "auth_prefix must be a non-root absolute path, got '{}'",
                self.auth_prefix
            )));
        }
        if !self.is_auth_path(&self.refresh_path) {
            return Err(ClientError::invalid_config(format!(
                "refresh_path '{}' is outside auth_prefix '{}'",
                self.refresh_path, self.auth_prefix
            )));
        }
        Ok(())
    }

    /// Full URL for a request path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Whether `path` belongs to the authentication endpoint family
    #[must_use]
    pub fn is_auth_path(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let prefix = self.auth_prefix.trim_end_matches('/');
        path == prefix || path.starts_with(&format!("{prefix}/"))
    }
}
