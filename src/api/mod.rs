//! Typed wrappers for the LDX Insight REST API
//!
//! Every call goes through [`AuthenticatedClient`], so endpoint wrappers get
//! credential attachment and token refresh for free.
//!
//! ```no_run
//! use ldx_insight_client::api::{DatasetQuery, LdxApi, LoginRequest};
//! use ldx_insight_client::{ClientConfig, CookieSessionStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> ldx_insight_client::Result<()> {
//! let api = LdxApi::new(ClientConfig::from_env(), Arc::new(CookieSessionStore::in_memory()))?;
//!
//! api.auth().sign_in(&LoginRequest::new("alice", "secret")).await?;
//!
//! let page = api
//!     .datasets()
//!     .list(&DatasetQuery::builder().category("health").build())
//!     .await?;
//! for dataset in &page.content {
//!     println!("{} ({} views)", dataset.title, dataset.view_count);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod datasets;
mod stats;
mod types;

use std::sync::Arc;

pub use auth::AuthApi;
pub use datasets::{DatasetsApi, Download};
pub use stats::StatsApi;
pub use types::{
    AuthResponse, CategoryStat, Dataset, DatasetPage, DatasetQuery, DatasetQueryBuilder,
    LoginRequest, RegisterRequest, SummaryStats,
};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::AuthenticatedClient;
use crate::session::SessionStore;

/// Entry point grouping the API's endpoint families
#[derive(Debug, Clone)]
pub struct LdxApi {
    client: AuthenticatedClient,
}

impl LdxApi {
    /// Create an API over the default transport
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        Ok(Self::from_client(AuthenticatedClient::new(config, session)?))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn from_client(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Underlying client, for refetch subscriptions or raw requests
    #[must_use]
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Authentication endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.client)
    }

    /// Dataset endpoints
    #[must_use]
    pub fn datasets(&self) -> DatasetsApi<'_> {
        DatasetsApi::new(&self.client)
    }

    /// Statistics endpoints
    #[must_use]
    pub fn stats(&self) -> StatsApi<'_> {
        StatsApi::new(&self.client)
    }
}
