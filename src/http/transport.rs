//! Base HTTP transport

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::request::{Dispatch, RawResponse};
use crate::error::{ClientError, Result};

/// Transport trait for sending fully resolved requests
///
/// Implementations perform exactly one network exchange per call and never
/// interpret the status code; recovery is the client's job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return whatever the server answered
    ///
    /// # Errors
    /// Returns `ClientError::Timeout` if no response arrived within
    /// `dispatch.timeout`, or `ClientError::Network` if no response was received.
    async fn send(&self, dispatch: Dispatch) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, dispatch: Dispatch) -> Result<RawResponse> {
        (**self).send(dispatch).await
    }
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom HTTP client (for connection pool reuse or proxies)
    #[must_use]
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, dispatch: Dispatch) -> Result<RawResponse> {
        let timeout = dispatch.timeout;
        let mut builder = self
            .http_client
            .request(dispatch.method, dispatch.url.as_str())
            .timeout(timeout);

        if !dispatch.query.is_empty() {
            builder = builder.query(&dispatch.query);
        }
        for (name, value) in &dispatch.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &dispatch.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(&e, timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_send_error(&e, timeout))?
            .to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_send_error(error: &reqwest::Error, timeout: Duration) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout(timeout)
    } else {
        ClientError::network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let transport = ReqwestTransport::new();
        let result = transport
            .send(Dispatch {
                method: Method::GET,
                url: "http://127.0.0.1:9/datasets".to_string(),
                query: Vec::new(),
                headers: Vec::new(),
                body: None,
                timeout: Duration::from_secs(5),
            })
            .await;

        assert!(matches!(result, Err(ClientError::Network(_))));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let timeout = Duration::from_millis(100);
        let result = ReqwestTransport::new()
            .send(Dispatch {
                method: Method::GET,
                url: format!("http://{addr}/stats/summary"),
                query: Vec::new(),
                headers: Vec::new(),
                body: None,
                timeout,
            })
            .await;

        assert!(matches!(result, Err(ClientError::Timeout(t)) if t == timeout));
    }
}
