//! # LDX Insight Client
//!
//! Authenticated HTTP client for the LDX Insight open-data platform.
//! Bearer tokens, silent refresh, cookie-persisted sessions; tokio-based.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ldx_insight_client::api::{LdxApi, LoginRequest};
//! use ldx_insight_client::session::{CookieSessionStore, FileCookieJar, MemoryNavigator};
//! use ldx_insight_client::ClientConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let navigator = Arc::new(MemoryNavigator::new("/"));
//!     let session = Arc::new(CookieSessionStore::hydrate(FileCookieJar::new(), navigator));
//!     let api = LdxApi::new(ClientConfig::from_env(), session)?;
//!
//!     api.auth().sign_in(&LoginRequest::new("alice", "secret")).await?;
//!
//!     let summary = api.stats().summary().await?;
//!     println!("{} datasets, {} views", summary.total_datasets, summary.total_views);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Credential attachment
//!
//! Every request sent through [`AuthenticatedClient`] carries the `App-Code`
//! header and, while logged in, `Authorization: Bearer <access token>`. The
//! token is read from the [`SessionStore`] when the request is dispatched, so a
//! refresh between two calls is picked up immediately.
//!
//! ### 2. Silent refresh
//!
//! A 401 from a data endpoint triggers exactly one refresh-token exchange. On
//! success the new tokens are stored without navigation, subscribers of
//! [`AuthenticatedClient::subscribe_refetch`] are told to reload, and the
//! failing request is retried once. On failure the session is cleared and the
//! error surfaces as [`ClientError::RefreshFailed`].
//!
//! A 401 from an authentication endpoint never triggers a refresh: the
//! session is cleared and the user is sent to the login page with a `redirect`
//! back to where they were.
//!
//! ### 3. Persistent sessions
//!
//! [`CookieSessionStore`] hydrates from a cookie file at startup and rewrites
//! it on every log in or log out. See the [`session`] module.
//!
//! ## Architecture
//!
//! - [`config`]: Client configuration and defaults
//! - [`session`]: Session state, cookie persistence, login navigation
//! - [`http`]: Request descriptors, transport seam, refresh protocol
//! - [`api`]: Typed endpoint wrappers and wire types
//! - [`error`]: Error types and handling
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! To see logs, attach a tracing subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, ClientError>`](Result):
//!
//! ```no_run
//! # use ldx_insight_client::api::LdxApi;
//! # use ldx_insight_client::ClientError;
//! # async fn example(api: LdxApi) {
//! match api.datasets().detail("d-42").await {
//!     Ok(dataset) => println!("{}", dataset.title),
//!     Err(e) if e.requires_login() => eprintln!("Please log in again"),
//!     Err(ClientError::Http { status: 404, .. }) => eprintln!("No such dataset"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ClientError, Result};
pub use http::{
    AuthenticatedClient, Dispatch, PendingRequest, RawResponse, Refetch, ReqwestTransport,
    Transport,
};
pub use session::{
    CookieJar, CookieSessionStore, FileCookieJar, MemoryNavigator, Navigator, Session,
    SessionStore, TokenPair,
};

/// Version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
