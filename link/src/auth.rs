//! Operator credentials attached to every backend request.
//!
//! A deployment picks exactly one mechanism, a session cookie or a bearer
//! token, through [`AuthMode`]. The transport never sends both.

use reqwest::header::COOKIE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which credential mechanism the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Server-side session identified by a cookie (`session=<sid>`)
    #[default]
    Cookie,

    /// `Authorization: Bearer <token>`
    Bearer,
}

/// Credential for the current operator.
///
/// # Examples
///
/// ```rust
/// use booking_link::{AuthMode, Credential};
///
/// let cookie = Credential::session_cookie("session", "8f2c...");
/// assert_eq!(cookie.mode(), Some(AuthMode::Cookie));
///
/// let token = Credential::bearer_token("eyJhbGc...");
/// assert_eq!(token.mode(), Some(AuthMode::Bearer));
///
/// assert!(!Credential::none().is_authenticated());
/// ```
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    SessionCookie { name: String, value: String },
    BearerToken { token: String },
    #[default]
    None,
}

impl Credential {
    pub fn session_cookie(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SessionCookie {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::BearerToken {
            token: token.into(),
        }
    }

    pub fn none() -> Self {
        Self::None
    }

    /// Mechanism this credential uses, `None` when no credential is held.
    pub fn mode(&self) -> Option<AuthMode> {
        match self {
            Self::SessionCookie { .. } => Some(AuthMode::Cookie),
            Self::BearerToken { .. } => Some(AuthMode::Bearer),
            Self::None => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Attach the credential to an outgoing request.
    ///
    /// - SessionCookie: `Cookie: <name>=<value>`
    /// - BearerToken: `Authorization: Bearer <token>`
    /// - None: no headers
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::SessionCookie { name, value } => {
                request.header(COOKIE, format!("{}={}", name, value))
            },
            Self::BearerToken { token } => request.bearer_auth(token),
            Self::None => request,
        }
    }
}

// Secrets stay out of debug output and logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionCookie { name, .. } => f
                .debug_struct("SessionCookie")
                .field("name", name)
                .field("value", &"***")
                .finish(),
            Self::BearerToken { .. } => f.debug_struct("BearerToken").field("token", &"***").finish(),
            Self::None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_modes() {
        assert_eq!(Credential::session_cookie("session", "abc").mode(), Some(AuthMode::Cookie));
        assert_eq!(Credential::bearer_token("t").mode(), Some(AuthMode::Bearer));
        assert_eq!(Credential::none().mode(), None);
        assert!(Credential::bearer_token("t").is_authenticated());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", Credential::session_cookie("session", "super-secret"));
        assert!(debug.contains("session"));
        assert!(!debug.contains("super-secret"));

        let debug = format!("{:?}", Credential::bearer_token("tok-123"));
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn test_apply_attaches_single_header() {
        let client = reqwest::Client::new();

        let request = Credential::session_cookie("session", "abc")
            .apply_to_request(client.get("http://localhost:5000/admin/tables"))
            .build()
            .unwrap();
        assert_eq!(request.headers().get(COOKIE).unwrap(), "session=abc");
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());

        let request = Credential::bearer_token("tok")
            .apply_to_request(client.get("http://localhost:5000/admin/tables"))
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer tok"
        );
        assert!(request.headers().get(COOKIE).is_none());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(Credential::bearer_token("t")).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "bearer_token", "token": "t" }));

        let parsed: Credential =
            serde_json::from_value(serde_json::json!({ "kind": "none" })).unwrap();
        assert_eq!(parsed, Credential::None);
    }
}
