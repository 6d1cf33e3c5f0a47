//! Request and response descriptors

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{APP_CODE_HEADER, ClientConfig};
use crate::error::{ClientError, Result};

/// Header carrying the bearer token
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// A call into the client, before credentials are attached
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the configured base address
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Caller-supplied headers
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
    /// Treat as an authentication endpoint regardless of path
    pub auth_family: bool,
}

impl PendingRequest {
    /// Create a request with no query, headers or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            auth_family: false,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter when a value is present
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    ///
    /// # Errors
    ///
    /// Returns `ClientError::JsonDecode` if the body cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Mark as part of the authentication endpoint family
    #[must_use]
    pub fn mark_auth_family(mut self) -> Self {
        self.auth_family = true;
        self
    }

    /// Whether a 401 on this request must not trigger a refresh
    #[must_use]
    pub fn is_auth_family(&self, config: &ClientConfig) -> bool {
        self.auth_family || config.is_auth_path(&self.path)
    }
}

/// A fully resolved request handed to the [`Transport`](super::Transport)
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// HTTP method
    pub method: Method,
    /// Absolute URL without query
    pub url: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Final header set
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
    /// Request timeout
    pub timeout: Duration,
}

impl Dispatch {
    /// Look up a header value (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Merge caller headers with the app identifier and bearer token
///
/// The app identifier is a default the caller may override. The Authorization
/// header always reflects `access_token`: set when present, absent otherwise.
#[must_use]
pub fn merge_headers(
    app_code: &str,
    caller: &[(String, String)],
    access_token: Option<&str>,
) -> Vec<(String, String)> {
    let mut headers = vec![(APP_CODE_HEADER.to_string(), app_code.to_string())];

    for (name, value) in caller {
        if name.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
            continue;
        }
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.clone(),
            None => headers.push((name.clone(), value.clone())),
        }
    }

    if let Some(token) = access_token {
        headers.push((AUTHORIZATION_HEADER.to_string(), format!("Bearer {token}")));
    }

    headers
}

/// A response received from the transport
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Raw body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx or 3xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Look up a header value (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as text, lossily decoded
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the JSON body, unwrapping the platform envelope if present
    ///
    /// # Errors
    ///
    /// Returns `ClientError::JsonDecode` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        decode_payload(&self.body)
    }

    /// Convert a failed response into `ClientError::Http`
    #[must_use]
    pub fn into_error(self) -> ClientError {
        let body = self.text();
        ClientError::http(self.status, body)
    }
}

/// Decode a JSON payload that may be wrapped in `{ code, message, data, error }`
///
/// An empty body decodes as JSON `null`.
///
/// # Errors
///
/// Returns `ClientError::JsonDecode` if the payload does not match `T`.
pub fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }

    let value: serde_json::Value = serde_json::from_slice(body)?;
    let value = match value {
        serde_json::Value::Object(mut map)
            if map.contains_key("data")
                && (map.contains_key("code") || map.contains_key("message")) =>
        {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };

    Ok(serde_json::from_value(value)?)
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_merge_headers_with_token() {
        let headers = merge_headers("hit-members", &[], Some("T1"));
        assert_eq!(find_header(&headers, "app-code"), Some("hit-members"));
        assert_eq!(find_header(&headers, "authorization"), Some("Bearer T1"));
    }

    #[test]
    fn test_merge_headers_without_token_omits_authorization() {
        let caller = vec![("Authorization".to_string(), "Bearer stale".to_string())];
        let headers = merge_headers("hit-members", &caller, None);
        assert_eq!(find_header(&headers, "authorization"), None);
    }

    #[test]
    fn test_merge_headers_token_overrides_caller() {
        let caller = vec![("authorization".to_string(), "Basic xyz".to_string())];
        let headers = merge_headers("hit-members", &caller, Some("T1"));
        let auth: Vec<_> = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].1, "Bearer T1");
    }

    #[test]
    fn test_merge_headers_caller_overrides_app_code() {
        let caller = vec![
            ("app-code".to_string(), "other-app".to_string()),
            ("Accept".to_string(), "text/csv".to_string()),
        ];
        let headers = merge_headers("hit-members", &caller, None);
        assert_eq!(headers.len(), 2);
        assert_eq!(find_header(&headers, "App-Code"), Some("other-app"));
        assert_eq!(find_header(&headers, "accept"), Some("text/csv"));
    }

    #[test]
    fn test_pending_request_builder() {
        let request = PendingRequest::get("/datasets")
            .query("page", 0)
            .query_opt("keyword", Some("rice"))
            .query_opt("category", None::<String>);

        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "0".to_string()),
                ("keyword".to_string(), "rice".to_string()),
            ]
        );
    }

    #[test]
    fn test_auth_family_marker() {
        let config = ClientConfig::default();
        assert!(PendingRequest::post("/auth/login").is_auth_family(&config));
        assert!(!PendingRequest::get("/datasets").is_auth_family(&config));
        assert!(
            PendingRequest::post("/sso/callback")
                .mark_auth_family()
                .is_auth_family(&config)
        );
    }

    #[test]
    fn test_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(304, "").is_success());
        assert!(!RawResponse::new(401, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        id: String,
    }

    #[test]
    fn test_decode_bare_payload() {
        let payload: Payload = decode_payload(br#"{"id":"d1"}"#).unwrap();
        assert_eq!(payload.id, "d1");
    }

    #[test]
    fn test_decode_enveloped_payload() {
        let body = br#"{"code":200,"message":"success","data":{"id":"d1"},"error":null}"#;
        let payload: Payload = decode_payload(body).unwrap();
        assert_eq!(payload.id, "d1");
    }

    #[test]
    fn test_decode_object_with_data_field_is_not_unwrapped() {
        #[derive(Deserialize)]
        struct WithData {
            data: String,
        }
        let payload: WithData = decode_payload(br#"{"data":"raw"}"#).unwrap();
        assert_eq!(payload.data, "raw");
    }

    #[test]
    fn test_decode_empty_body_as_unit() {
        decode_payload::<()>(b"").unwrap();
        assert_eq!(decode_payload::<Option<Payload>>(b"  ").unwrap(), None);
    }

    #[test]
    fn test_into_error_keeps_status_and_body() {
        let err = RawResponse::new(404, "dataset not found").into_error();
        assert!(matches!(
            err,
            ClientError::Http { status: 404, ref body } if body == "dataset not found"
        ));
    }
}
