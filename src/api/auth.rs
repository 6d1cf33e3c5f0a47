//! Authentication endpoints

use super::types::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::Result;
use crate::http::{AuthenticatedClient, PendingRequest};

/// `/auth/*` endpoints
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for tokens without touching the session
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AuthenticationRequired` on bad credentials; the
    /// session is cleared and the user sent to the login page.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let request = PendingRequest::post("/auth/login").json(credentials)?;
        self.client.request_json(request).await
    }

    /// Create an account and return its tokens without touching the session
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the server rejects the registration.
    pub async fn register(&self, account: &RegisterRequest) -> Result<AuthResponse> {
        let request = PendingRequest::post("/auth/register").json(account)?;
        self.client.request_json(request).await
    }

    /// Log in and store the tokens, navigating to the post-login destination
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login).
    pub async fn sign_in(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let tokens = self.login(credentials).await?;
        self.client.session().log_in(tokens.clone(), true);
        tracing::info!(username = %credentials.username, "Signed in");
        Ok(tokens)
    }

    /// Register and store the tokens, navigating to the post-login destination
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub async fn sign_up(&self, account: &RegisterRequest) -> Result<AuthResponse> {
        let tokens = self.register(account).await?;
        self.client.session().log_in(tokens.clone(), true);
        tracing::info!(username = %account.username, "Registered and signed in");
        Ok(tokens)
    }

    /// Tell the server to drop its cookie, then clear the local session
    ///
    /// The server call is best effort; the local session is cleared either way.
    pub async fn logout(&self) {
        if let Err(e) = self.client.request(PendingRequest::post("/auth/logout")).await {
            tracing::warn!(error = %e, "Server-side logout failed");
        }
        self.client.session().log_out(None);
    }
}
