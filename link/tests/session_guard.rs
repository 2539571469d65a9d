//! Session guard: entry checks, login/logout and credential persistence.

mod common;

use booking_link::{
    AdminClient, AdminSessionGuard, ApiError, ApiResponse, AuthFailure, AuthMode, Credential,
    CredentialStore, FileCredentialStore, MemoryCredentialStore, ResponseCookie, StoredCredential,
};
use common::*;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn login_reply_with_cookie(value: &str) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({ "message": "Login successful", "admin_id": 1 }),
        cookies: vec![ResponseCookie {
            name: "session".into(),
            value: value.into(),
        }],
    }
}

fn file_guard(fake: &Arc<FakeTransport>, dir: &TempDir, credential: Credential) -> AdminSessionGuard {
    let store = FileCredentialStore::with_path(dir.path().join("credentials.toml")).unwrap();
    AdminSessionGuard::new(client_over(fake, credential), Box::new(store), "local")
}

#[tokio::test]
async fn test_no_credential_skips_network() {
    init_logging();
    let fake = FakeTransport::new();
    let mut guard = guard_over(&fake, Credential::none());

    assert_eq!(guard.verify().await.unwrap_err(), AuthFailure::Unauthenticated);
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_admin_is_admitted() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply_json(Method::GET, "/admin/check-auth", admin_identity());
    let mut guard = guard_over(&fake, session());

    let identity = guard.verify().await.unwrap();
    assert_eq!(identity.name, "Ann Admin");
    assert_eq!(guard.identity(), Some(&identity));
    assert_eq!(fake.calls()[0].credential, session());
}

#[tokio::test]
async fn test_non_admin_without_redirect_is_unauthenticated() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply_json(
        Method::GET,
        "/admin/check-auth",
        json!({ "name": "Bob", "email": "bob@x.com", "role": "user" }),
    );
    let mut guard = guard_over(&fake, session());

    assert_eq!(guard.verify().await.unwrap_err(), AuthFailure::Unauthenticated);
    assert!(guard.identity().is_none());
}

#[tokio::test]
async fn test_redirect_wins_over_identity() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply_json(
        Method::GET,
        "/admin/check-auth",
        json!({ "name": "Bob", "role": "admin", "redirect": "/userdashboard" }),
    );
    let mut guard = guard_over(&fake, session());

    let failure = guard.verify().await.unwrap_err();
    assert_eq!(failure, AuthFailure::Redirect("/userdashboard".into()));
    assert_eq!(failure.destination(guard.login_path()), "/userdashboard");
}

#[tokio::test]
async fn test_forbidden_and_outage_both_go_to_login() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply(
        Method::GET,
        "/admin/check-auth",
        Err(ApiError::from_status(403, "Admins only")),
    );
    let mut guard = guard_over(&fake, session()).with_login_path("/admin/login-page");
    let failure = guard.verify().await.unwrap_err();
    assert_eq!(failure, AuthFailure::Unauthenticated);
    assert_eq!(failure.destination(guard.login_path()), "/admin/login-page");

    let fake = FakeTransport::new();
    fake.reply(
        Method::GET,
        "/admin/check-auth",
        Err(ApiError::NetworkUnreachable("connection refused".into())),
    );
    let mut guard = guard_over(&fake, session());
    let failure = guard.verify().await.unwrap_err();
    assert!(matches!(failure, AuthFailure::Transport(ApiError::NetworkUnreachable(_))));
    assert_eq!(failure.destination(guard.login_path()), "/login");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    init_logging();
    let fake = FakeTransport::new();
    let mut guard = guard_over(&fake, Credential::none());

    let err = guard.login("  ", "secret").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::BadRequest {
            message: "Email and password are required".into()
        }
    );
    assert!(guard.login("admin@x.com", "").await.is_err());
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_login_rejected_by_backend() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply(
        Method::POST,
        "/admin/login",
        Err(ApiError::from_status(401, "Invalid credentials")),
    );
    let mut guard = guard_over(&fake, Credential::none());

    let err = guard.login("admin@x.com", "wrong").await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(!guard.client().credential().is_authenticated());
}

#[tokio::test]
async fn test_cookie_login_persists_and_restores() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let fake = FakeTransport::new();
    fake.reply(Method::POST, "/admin/login", Ok(login_reply_with_cookie("sid-42")));
    fake.reply_json(Method::GET, "/admin/check-auth", admin_identity());

    let mut guard = file_guard(&fake, &dir, Credential::none());
    guard.login(" admin@x.com ", "secret").await.unwrap();

    let login_call = &fake.calls_to(Method::POST, "/admin/login")[0];
    assert_eq!(
        login_call.body,
        Some(json!({ "email": "admin@x.com", "password": "secret" }))
    );
    let expected = Credential::session_cookie("session", "sid-42");
    assert_eq!(guard.client().credential(), expected);
    assert!(guard.verify().await.is_ok());
    assert_eq!(fake.calls_to(Method::GET, "/admin/check-auth")[0].credential, expected);

    // A fresh guard over the same file starts with the saved session
    let restored = file_guard(&fake, &dir, Credential::none());
    assert_eq!(restored.client().credential(), expected);

    let on_disk = FileCredentialStore::with_path(dir.path().join("credentials.toml")).unwrap();
    let stored = on_disk.get_credentials("local").unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some("admin@x.com"));
}

#[tokio::test]
async fn test_cookie_login_without_cookie_fails() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply_json(Method::POST, "/admin/login", json!({ "message": "Login successful" }));
    let mut guard = guard_over(&fake, Credential::none());

    let err = guard.login("admin@x.com", "secret").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponseFormat(_)));
    assert!(!guard.client().credential().is_authenticated());
}

#[tokio::test]
async fn test_bearer_login_uses_token() {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply_json(
        Method::POST,
        "/admin/login",
        json!({ "message": "Login successful", "access_token": "tok-1" }),
    );
    let client = AdminClient::builder()
        .auth_mode(AuthMode::Bearer)
        .build_with_transport(fake.clone())
        .unwrap();
    let mut guard = AdminSessionGuard::new(client, Box::new(MemoryCredentialStore::new()), "local");

    guard.login("admin@x.com", "secret").await.unwrap();
    assert_eq!(guard.client().credential(), Credential::bearer_token("tok-1"));
}

#[tokio::test]
async fn test_stored_credential_of_other_mode_is_ignored() {
    init_logging();
    let fake = FakeTransport::new();
    let mut store = MemoryCredentialStore::new();
    store
        .set_credentials("local", &StoredCredential::new(Credential::bearer_token("tok")))
        .unwrap();

    let guard = AdminSessionGuard::new(client_over(&fake, Credential::none()), Box::new(store), "local");
    assert_eq!(guard.client().credential(), Credential::None);
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let fake = FakeTransport::new();
    fake.reply(Method::POST, "/admin/login", Ok(login_reply_with_cookie("sid-7")));
    fake.reply(
        Method::POST,
        "/admin/logout",
        Err(ApiError::from_status(500, "boom")),
    );

    let mut guard = file_guard(&fake, &dir, Credential::none());
    guard.login("admin@x.com", "secret").await.unwrap();
    assert!(guard.logout().await.is_err());

    assert_eq!(guard.client().credential(), Credential::None);
    let on_disk = FileCredentialStore::with_path(dir.path().join("credentials.toml")).unwrap();
    assert!(!on_disk.has_credentials("local").unwrap());
}
