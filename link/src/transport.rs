//! HTTP transport for backend calls.
//!
//! [`Transport`] is the seam between the admin components and the network.
//! [`HttpTransport`] is the reqwest-backed implementation; it attaches the
//! request's credential, enforces JSON responses and folds every failure into
//! an [`ApiError`].

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE, SET_COOKIE};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Instant;

use crate::auth::Credential;
use crate::error::{ApiError, Result};
use crate::models::ErrorBody;

/// Percent-encoded request path built from raw segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// Parse a route template such as `/admin/tables`.
    pub fn parse(route: &str) -> Self {
        Self {
            segments: route
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append one raw segment; `/` and other reserved characters are encoded.
    ///
    /// Empty, `.` and `..` segments are rejected: URL normalization would
    /// drop them (even percent-encoded) and the call would reach the parent route.
    pub fn join(mut self, segment: impl Into<String>) -> Result<Self> {
        let segment = segment.into();
        if matches!(segment.as_str(), "" | "." | "..") {
            return Err(ApiError::BadRequest {
                message: format!("'{}' cannot be used as a path segment", segment),
            });
        }
        self.segments.push(segment);
        Ok(self)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve against a base URL, keeping any path prefix the base carries.
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::NetworkUnreachable(format!("base URL '{}' cannot take a path", base)))?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut url = Url::parse("http://localhost/").map_err(|_| fmt::Error)?;
        url.path_segments_mut()
            .map_err(|_| fmt::Error)?
            .pop_if_empty()
            .extend(&self.segments);
        f.write_str(url.path())
    }
}

/// One outgoing backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: ApiPath,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub credential: Credential,
}

impl ApiRequest {
    pub fn new(method: Method, path: ApiPath) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
            credential: Credential::None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }
}

/// Cookie set by the backend (`Set-Cookie: name=value; ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
}

impl ResponseCookie {
    /// Parse the `name=value` pair of a `Set-Cookie` header; attributes are ignored.
    pub fn parse(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.trim().trim_matches('"').to_string(),
        })
    }
}

/// Successful (2xx) decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: JsonValue,
    pub cookies: Vec<ResponseCookie>,
}

impl ApiResponse {
    pub fn json(body: JsonValue) -> Self {
        Self {
            status: 200,
            body,
            cookies: Vec::new(),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&ResponseCookie> {
        self.cookies.iter().find(|cookie| cookie.name == name)
    }
}

/// Outbound calls to the backend. Failures are always values, never panics.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// `request(method, path, body?)`: the JSON body of a successful call.
    async fn request(
        &self,
        method: Method,
        path: ApiPath,
        body: Option<JsonValue>,
        credential: Credential,
    ) -> Result<JsonValue> {
        let mut request = ApiRequest::new(method, path).with_credential(credential);
        request.body = body;
        Ok(self.send(request).await?.body)
    }
}

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: Url, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            http_client,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut url = request.path.resolve(&self.base_url)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut builder = self
            .http_client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder = request.credential.apply_to_request(builder);

        let start = Instant::now();
        debug!("[ADMIN_HTTP] Sending {} {}", request.method, request.path);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "[ADMIN_HTTP] No response: {} {} error=\"{}\" duration_ms={}",
                    request.method,
                    request.path,
                    e,
                    start.elapsed().as_millis()
                );
                return Err(e.into());
            },
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(ResponseCookie::parse)
            .collect();
        let text = response.text().await?;

        debug!(
            "[ADMIN_HTTP] Response: {} {} status={} duration_ms={}",
            request.method,
            request.path,
            status,
            start.elapsed().as_millis()
        );

        let body = decode_body(status, content_type.as_deref(), &text).inspect_err(|e| {
            warn!("[ADMIN_HTTP] {} {} failed: {}", request.method, request.path, e);
        })?;

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            cookies,
        })
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/json")
        || mime.to_ascii_lowercase().ends_with("+json")
}

/// Classify a received response.
///
/// A non-JSON content type is `InvalidResponseFormat` whatever the status;
/// the one exception is an empty `204 No Content`, which decodes to `null`.
pub fn decode_body(status: StatusCode, content_type: Option<&str>, text: &str) -> Result<JsonValue> {
    if status == StatusCode::NO_CONTENT && text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }

    match content_type {
        Some(ct) if is_json_content_type(ct) => {},
        Some(ct) => {
            return Err(ApiError::InvalidResponseFormat(format!(
                "expected application/json, got '{}' (status {})",
                ct,
                status.as_u16()
            )));
        },
        None => {
            return Err(ApiError::InvalidResponseFormat(format!(
                "response without content type (status {})",
                status.as_u16()
            )));
        },
    }

    if status.is_success() {
        return serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponseFormat(format!("malformed JSON body: {}", e)));
    }

    let message = serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string());

    Err(ApiError::from_status(status.as_u16(), message))
}
