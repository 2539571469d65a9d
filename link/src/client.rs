//! Admin backend client with builder pattern.
//!
//! Owns the transport, the operator credential and the route table, and
//! exposes one typed method per backend endpoint. Components above it
//! (guard, catalog, record loader, dispatcher) hold cheap clones.

use log::debug;
use parking_lot::RwLock;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthMode, Credential};
use crate::error::{ApiError, ConfigError, Result};
use crate::models::{
    CheckAuthResponse, LoginRequest, LoginResponse, Record, RecordId, TableDescriptor, UserStats,
};
use crate::routes::AdminRoutes;
use crate::timeouts::LinkTimeouts;
use crate::transport::{ApiPath, ApiRequest, ApiResponse, HttpTransport, Transport};

/// Default name of the backend's session cookie
pub const DEFAULT_SESSION_COOKIE: &str = "session";

/// Client for the admin REST surface.
///
/// # Examples
///
/// ```rust,no_run
/// use booking_link::{AdminClient, Credential};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AdminClient::builder()
///     .base_url("http://127.0.0.1:5000")
///     .timeout(std::time::Duration::from_secs(30))
///     .credential(Credential::session_cookie("session", "8f2c..."))
///     .build()?;
///
/// let tables = client.list_tables().await?;
/// println!("{} tables", tables.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdminClient {
    transport: Arc<dyn Transport>,
    credential: Arc<RwLock<Credential>>,
    auth_mode: AuthMode,
    cookie_name: String,
    routes: AdminRoutes,
    timeouts: LinkTimeouts,
}

/// Result of a successful login call.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub response: LoginResponse,

    /// Credential issued by the backend in this client's auth mode, if any
    pub credential: Option<Credential>,
}

impl AdminClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> AdminClientBuilder {
        AdminClientBuilder::new()
    }

    pub fn routes(&self) -> &AdminRoutes {
        &self.routes
    }

    pub fn timeouts(&self) -> &LinkTimeouts {
        &self.timeouts
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Snapshot of the credential attached to outgoing requests
    pub fn credential(&self) -> Credential {
        self.credential.read().clone()
    }

    /// Replace the operator credential.
    ///
    /// Rejects a credential of the other mechanism; `Credential::None` is always accepted.
    pub fn set_credential(&self, credential: Credential) -> std::result::Result<(), ConfigError> {
        if let Some(mode) = credential.mode() {
            if mode != self.auth_mode {
                return Err(ConfigError::Invalid(format!(
                    "credential uses {:?} auth but the client is configured for {:?}",
                    mode, self.auth_mode
                )));
            }
        }
        *self.credential.write() = credential;
        Ok(())
    }

    /// Send a request with the current credential attached.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request = request.with_credential(self.credential());
        self.transport.send(request).await
    }

    /// `request(method, path, body?)` returning the raw JSON body.
    pub async fn request(&self, method: Method, path: ApiPath, body: Option<JsonValue>) -> Result<JsonValue> {
        self.transport
            .request(method, path, body, self.credential())
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path.clone();
        let body = self.send(request).await?.body;
        decode(body).map_err(|e| {
            debug!("[ADMIN_HTTP] Unexpected body shape for {}: {}", path, e);
            e
        })
    }

    /// `GET check-auth`
    pub async fn check_auth(&self) -> Result<CheckAuthResponse> {
        self.get_json(ApiRequest::new(Method::GET, self.routes.check_auth_path()))
            .await
    }

    /// `GET tables`
    pub async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.get_json(ApiRequest::new(Method::GET, self.routes.tables_path()))
            .await
    }

    /// `GET tables/{table}`, optionally sorted server-side by `sort_by`.
    pub async fn fetch_records(&self, table: &str, sort_by: Option<&str>) -> Result<Vec<Record>> {
        let mut request = ApiRequest::new(Method::GET, self.routes.table_path(table)?);
        if let Some(column) = sort_by {
            request = request.with_query("sort_by", column);
        }
        self.get_json(request).await
    }

    /// `PUT tables/{table}/{id}` with the full record as body. The response body is ignored.
    pub async fn update_record(&self, table: &str, id: &RecordId, record: &Record) -> Result<()> {
        let request = ApiRequest::new(Method::PUT, self.routes.record_path(table, id)?)
            .with_body(record.clone().into_value());
        self.send(request).await.map(|_| ())
    }

    /// `DELETE tables/{table}/{id}`
    pub async fn delete_record(&self, table: &str, id: &RecordId) -> Result<()> {
        let request = ApiRequest::new(Method::DELETE, self.routes.record_path(table, id)?);
        self.send(request).await.map(|_| ())
    }

    /// `GET user-stats`
    pub async fn user_stats(&self) -> Result<UserStats> {
        self.get_json(ApiRequest::new(Method::GET, self.routes.user_stats_path()))
            .await
    }

    /// `POST login`. Does not change this client's credential.
    pub async fn login(&self, login: &LoginRequest) -> Result<LoginOutcome> {
        let body = serde_json::to_value(login)
            .map_err(|e| ApiError::InvalidResponseFormat(format!("cannot encode login: {}", e)))?;
        let response = self
            .send(ApiRequest::new(Method::POST, self.routes.login_path()).with_body(body))
            .await?;

        let credential = match self.auth_mode {
            AuthMode::Cookie => response
                .cookie(&self.cookie_name)
                .map(|cookie| Credential::session_cookie(&cookie.name, &cookie.value)),
            AuthMode::Bearer => None,
        };
        let response: LoginResponse = decode(response.body)?;
        let credential = credential.or_else(|| match self.auth_mode {
            AuthMode::Bearer => response.token.clone().map(Credential::bearer_token),
            AuthMode::Cookie => None,
        });

        Ok(LoginOutcome {
            response,
            credential,
        })
    }

    /// `POST logout`
    pub async fn logout(&self) -> Result<()> {
        self.send(ApiRequest::new(Method::POST, self.routes.logout_path()))
            .await
            .map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(body: JsonValue) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::InvalidResponseFormat(format!("unexpected response shape: {}", e)))
}

/// Builder for configuring [`AdminClient`] instances.
pub struct AdminClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    timeouts: LinkTimeouts,
    credential: Credential,
    auth_mode: Option<AuthMode>,
    cookie_name: String,
    routes: AdminRoutes,
    user_agent: String,
}

impl AdminClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            timeouts: LinkTimeouts::default(),
            credential: Credential::None,
            auth_mode: None,
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            routes: AdminRoutes::default(),
            user_agent: format!("booking-link/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the backend base URL (may include a path prefix)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the fixed per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set all timeouts at once. An explicit `timeout()` still wins for requests.
    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Initial operator credential; also fixes the auth mode unless set explicitly
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = Some(mode);
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn routes(mut self, routes: AdminRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn resolve_auth_mode(&self) -> std::result::Result<AuthMode, ConfigError> {
        match (self.auth_mode, self.credential.mode()) {
            (Some(explicit), Some(held)) if explicit != held => Err(ConfigError::Invalid(format!(
                "credential uses {:?} auth but auth mode is {:?}",
                held, explicit
            ))),
            (Some(explicit), _) => Ok(explicit),
            (None, Some(held)) => Ok(held),
            (None, None) => Ok(AuthMode::default()),
        }
    }

    /// Build the client over a reqwest [`HttpTransport`]
    pub fn build(self) -> std::result::Result<AdminClient, ConfigError> {
        let raw_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("base_url is required".into()))?;
        let base_url = Url::parse(raw_url)
            .map_err(|e| ConfigError::Invalid(format!("invalid base_url '{}': {}", raw_url, e)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url '{}' must be an http(s) URL",
                raw_url
            )));
        }

        let request_timeout = self.timeout.unwrap_or(self.timeouts.request_timeout);
        debug!(
            "[ADMIN_HTTP] base_url={} request_timeout={:?} connect_timeout={:?}",
            base_url, request_timeout, self.timeouts.connection_timeout
        );
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let transport = Arc::new(HttpTransport::new(base_url, http_client));
        self.build_with_transport(transport)
    }

    /// Build the client over any [`Transport`]; `base_url` is not consulted.
    pub fn build_with_transport(
        mut self,
        transport: Arc<dyn Transport>,
    ) -> std::result::Result<AdminClient, ConfigError> {
        let auth_mode = self.resolve_auth_mode()?;
        if let Some(timeout) = self.timeout {
            self.timeouts.request_timeout = timeout;
        }

        Ok(AdminClient {
            transport,
            credential: Arc::new(RwLock::new(self.credential)),
            auth_mode,
            cookie_name: self.cookie_name,
            routes: self.routes,
            timeouts: self.timeouts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let result = AdminClient::builder()
            .base_url("http://127.0.0.1:5000")
            .timeout(Duration::from_secs(10))
            .credential(Credential::bearer_token("test_token"))
            .build();

        let client = result.unwrap();
        assert_eq!(client.auth_mode(), AuthMode::Bearer);
        assert_eq!(client.timeouts().request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_missing_url() {
        let result = AdminClient::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_non_http_url() {
        assert!(AdminClient::builder().base_url("mailto:ops@x.com").build().is_err());
        assert!(AdminClient::builder().base_url("not a url").build().is_err());
    }

    #[test]
    fn test_builder_rejects_mixed_auth() {
        let result = AdminClient::builder()
            .base_url("http://127.0.0.1:5000")
            .auth_mode(AuthMode::Cookie)
            .credential(Credential::bearer_token("t"))
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_set_credential_keeps_one_mechanism() {
        let client = AdminClient::builder()
            .base_url("http://127.0.0.1:5000")
            .build()
            .unwrap();
        assert_eq!(client.auth_mode(), AuthMode::Cookie);

        assert!(client.set_credential(Credential::bearer_token("t")).is_err());
        assert!(client
            .set_credential(Credential::session_cookie("session", "v"))
            .is_ok());
        assert!(client.credential().is_authenticated());
        assert!(client.set_credential(Credential::None).is_ok());
        assert!(!client.credential().is_authenticated());
    }
}
