//! `AuthenticatedClient`: bearer-token HTTP client with one-shot refresh
//!
//! # Refresh protocol
//!
//! ```text
//!   request ──► attach App-Code + Bearer ──► transport ──► 2xx/3xx ──► Ok
//!                                                │
//!                                               401?──no──► Err(Http)
//!                                                │
//!                           auth endpoint? ──yes──► log out (redirect back) ──► Err(AuthenticationRequired)
//!                                                │ no
//!                          refresh token? ──no───► log out ──► Err(RefreshFailed)
//!                                                │ yes
//!                           POST refresh ──fail──► log out ──► Err(RefreshFailed)
//!                                                │ ok
//!                  silent log in + Refetch signal ──► retry once ──► Ok / Err(Http)
//! ```
//!
//! A refresh is attempted at most once per failing request and the refresh
//! call itself never re-enters the protocol.
//!
//! # Example
//!
//! ```no_run
//! use ldx_insight_client::{AuthenticatedClient, ClientConfig, CookieSessionStore, PendingRequest};
//! use std::sync::Arc;
//!
//! # async fn example() -> ldx_insight_client::Result<()> {
//! let session = Arc::new(CookieSessionStore::in_memory());
//! let client = AuthenticatedClient::new(ClientConfig::from_env(), session)?;
//!
//! let mut refetch = client.subscribe_refetch();
//! tokio::spawn(async move {
//!     while let Ok(signal) = refetch.recv().await {
//!         println!("token refreshed by {}, reload views", signal.trigger);
//!     }
//! });
//!
//! let categories: Vec<String> = client
//!     .request_json(PendingRequest::get("/datasets/categories"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, broadcast};

use super::recovery::{Recovery, plan_recovery};
use super::request::{Dispatch, PendingRequest, RawResponse, merge_headers};
use super::transport::{ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{SessionStore, TokenPair};
use crate::utils::body_preview;

/// Buffered refetch signals per subscriber
const REFETCH_CAPACITY: usize = 16;

/// Published after every successful refresh so data-dependent views reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refetch {
    /// Path of the request whose 401 triggered the refresh
    pub trigger: String,
}

/// Body shapes the refresh endpoint answers with
///
/// Either a token pair, the bare access token, or either of those under a
/// lone `data` key. The `{ code, message, data }` envelope is already
/// unwrapped by [`RawResponse::json`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RefreshReply {
    Pair(TokenPair),
    Token(String),
    Data { data: Box<RefreshReply> },
}

impl RefreshReply {
    fn into_tokens(self) -> TokenPair {
        match self {
            Self::Pair(tokens) => tokens,
            Self::Token(access_token) => TokenPair::new(access_token, None),
            Self::Data { data } => data.into_tokens(),
        }
    }
}

/// HTTP client that attaches credentials and recovers from token expiry
///
/// Cloning is cheap; clones share the transport, session and refresh guard.
#[derive(Clone)]
pub struct AuthenticatedClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    refetch_tx: broadcast::Sender<Refetch>,
    /// Serializes refreshes when `coalesce_refresh` is on
    refresh_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("config", &self.config)
            .field("logged_in", &self.session.access_token().is_some())
            .finish_non_exhaustive()
    }
}

impl AuthenticatedClient {
    /// Create a client over the default reqwest transport
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_transport(config, session, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client around a custom base transport
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` if the configuration is invalid.
    pub fn with_transport(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        let (refetch_tx, _) = broadcast::channel(REFETCH_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            transport,
            session,
            refetch_tx,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Get the client configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the session store
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Subscribe to refetch signals
    #[must_use]
    pub fn subscribe_refetch(&self) -> broadcast::Receiver<Refetch> {
        self.refetch_tx.subscribe()
    }

    /// Issue a request, attaching credentials and running the refresh protocol on 401
    ///
    /// # Errors
    /// - `ClientError::Http` for any unrecovered non-2xx/3xx response
    /// - `ClientError::AuthenticationRequired` for a 401 from an authentication endpoint
    /// - `ClientError::RefreshFailed` if the token could not be refreshed
    /// - `ClientError::Network` / `ClientError::Timeout` if no response arrived
    pub async fn request(&self, request: PendingRequest) -> Result<RawResponse> {
        let (dispatch, sent_token) = self.prepare(&request);
        let response = self.transport.send(dispatch).await?;
        if response.is_success() {
            return Ok(response);
        }
        self.recover(&request, sent_token.as_deref(), response).await
    }

    /// Issue a request and decode its JSON body
    ///
    /// # Errors
    /// Same as [`request`](Self::request), plus `ClientError::JsonDecode`.
    pub async fn request_json<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T> {
        self.request(request).await?.json()
    }

    /// Resolve the request against the current session; the token is read here,
    /// at dispatch time.
    fn prepare(&self, request: &PendingRequest) -> (Dispatch, Option<String>) {
        let access_token = self.session.access_token();
        let headers = merge_headers(
            &self.config.app_code,
            &request.headers,
            access_token.as_deref(),
        );
        let dispatch = Dispatch {
            method: request.method.clone(),
            url: self.config.url_for(&request.path),
            query: request.query.clone(),
            headers,
            body: request.body.clone(),
            timeout: self.config.timeout,
        };

        tracing::debug!(
            method = %dispatch.method,
            url = %dispatch.url,
            authorized = access_token.is_some(),
            "Dispatching request"
        );
        (dispatch, access_token)
    }

    async fn recover(
        &self,
        request: &PendingRequest,
        sent_token: Option<&str>,
        response: RawResponse,
    ) -> Result<RawResponse> {
        let status = response.status;
        match plan_recovery(&self.config, request, status, &self.session.snapshot()) {
            Recovery::Propagate => {
                tracing::debug!(status, path = %request.path, "Request failed");
                Err(response.into_error())
            }
            Recovery::Reauthenticate => {
                tracing::warn!(
                    path = %request.path,
                    body = %body_preview(&response.body),
                    "Authentication endpoint rejected credentials; logging out"
                );
                let target = self.session.return_location();
                self.session.log_out(Some(target.as_str()));
                Err(ClientError::authentication_required(status, response.text()))
            }
            Recovery::RefreshUnavailable => {
                tracing::warn!(
                    path = %request.path,
                    "Unauthorized with no refresh token; logging out"
                );
                self.session.log_out(None);
                Err(ClientError::refresh_failed("no refresh token in session"))
            }
            Recovery::Refresh => {
                if let Err(e) = self.refresh(&request.path, sent_token).await {
                    tracing::warn!(
                        error = %e,
                        path = %request.path,
                        "Token refresh failed; logging out"
                    );
                    self.session.log_out(None);
                    return Err(ClientError::refresh_failed(e.to_string()));
                }

                if !self.config.retry_after_refresh {
                    return Err(response.into_error());
                }

                let (dispatch, _) = self.prepare(request);
                let retried = self.transport.send(dispatch).await?;
                if retried.is_success() {
                    Ok(retried)
                } else {
                    tracing::debug!(
                        status = retried.status,
                        path = %request.path,
                        "Retry after refresh failed"
                    );
                    Err(retried.into_error())
                }
            }
        }
    }

    /// Replace the access token using the stored refresh token
    async fn refresh(&self, trigger: &str, sent_token: Option<&str>) -> Result<()> {
        let _guard = if self.config.coalesce_refresh {
            Some(self.refresh_lock.lock().await)
        } else {
            None
        };

        if self.config.coalesce_refresh {
            let current = self.session.access_token();
            if current.is_some() && current.as_deref() != sent_token {
                tracing::debug!(
                    path = %trigger,
                    "Access token already replaced by a concurrent refresh"
                );
                return Ok(());
            }
        }

        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ClientError::refresh_failed("session cleared before refresh"))?;
        let tokens = self.exchange_refresh_token(&refresh_token).await?;
        self.session.log_in(tokens, false);
        tracing::info!(path = %trigger, "Access token refreshed");

        // No subscribers is fine
        let _ = self.refetch_tx.send(Refetch {
            trigger: trigger.to_string(),
        });
        Ok(())
    }

    /// Dedicated refresh call; goes straight to the transport so a 401 here
    /// cannot recurse into the protocol.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let dispatch = Dispatch {
            method: Method::POST,
            url: self.config.url_for(&self.config.refresh_path),
            query: Vec::new(),
            headers: merge_headers(&self.config.app_code, &[], None),
            body: Some(serde_json::json!({ "refreshToken": refresh_token })),
            timeout: self.config.timeout,
        };

        let response = self.transport.send(dispatch).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        Ok(response.json::<RefreshReply>()?.into_tokens())
    }
}
