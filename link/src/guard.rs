//! Admin session guard.
//!
//! Establishes that the operator is an administrator before any catalog or
//! record operation runs, and owns the persisted credential.

use log::{debug, info, warn};

use crate::client::AdminClient;
use crate::credentials::{CredentialStore, StoredCredential};
use crate::error::{ApiError, AuthFailure};
use crate::models::{AdminIdentity, LoginRequest};
use crate::Credential;

/// Default login route in the booking front end
pub const DEFAULT_LOGIN_PATH: &str = "/login";

pub struct AdminSessionGuard {
    client: AdminClient,
    store: Box<dyn CredentialStore>,
    instance: String,
    login_path: String,
    identity: Option<AdminIdentity>,
}

impl AdminSessionGuard {
    /// Create a guard and restore any credential saved for `instance`.
    ///
    /// A stored credential of the other auth mechanism is ignored.
    pub fn new(client: AdminClient, store: Box<dyn CredentialStore>, instance: impl Into<String>) -> Self {
        let instance = instance.into();
        let guard = Self {
            client,
            store,
            instance,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            identity: None,
        };
        guard.restore_credential();
        guard
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    fn restore_credential(&self) {
        if self.client.credential().is_authenticated() {
            return;
        }
        match self.store.get_credentials(&self.instance) {
            Ok(Some(stored)) => {
                if let Err(e) = self.client.set_credential(stored.credential) {
                    warn!("[ADMIN_GUARD] Ignoring stored credential for '{}': {}", self.instance, e);
                } else {
                    debug!("[ADMIN_GUARD] Restored credential for '{}'", self.instance);
                }
            },
            Ok(None) => {},
            Err(e) => warn!("[ADMIN_GUARD] Cannot read credential store: {}", e),
        }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Identity from the last successful [`verify`](Self::verify)
    pub fn identity(&self) -> Option<&AdminIdentity> {
        self.identity.as_ref()
    }

    /// Check the session against the backend.
    ///
    /// - admin → `Ok(identity)`
    /// - backend-supplied redirect → `Redirect(destination)`
    /// - no credential, 401/403, or a non-admin role without redirect → `Unauthenticated`
    /// - anything else → `Transport(err)`
    pub async fn verify(&mut self) -> Result<AdminIdentity, AuthFailure> {
        self.identity = None;

        if !self.client.credential().is_authenticated() {
            debug!("[ADMIN_GUARD] No credential held; skipping check");
            return Err(AuthFailure::Unauthenticated);
        }

        let response = match self.client.check_auth().await {
            Ok(response) => response,
            Err(e) if e.is_auth_error() => {
                info!("[ADMIN_GUARD] Session rejected: {}", e);
                return Err(AuthFailure::Unauthenticated);
            },
            Err(e) => {
                warn!("[ADMIN_GUARD] Session check failed: {}", e);
                return Err(AuthFailure::Transport(e));
            },
        };

        if let Some(target) = response.redirect_target() {
            info!("[ADMIN_GUARD] Backend redirected operator to {}", target);
            return Err(AuthFailure::Redirect(target.to_string()));
        }

        match response.into_identity() {
            Some(identity) => {
                debug!("[ADMIN_GUARD] Verified admin {}", identity.email);
                self.identity = Some(identity.clone());
                Ok(identity)
            },
            None => {
                info!("[ADMIN_GUARD] Operator is not an administrator");
                Err(AuthFailure::Unauthenticated)
            },
        }
    }

    /// Log in and persist the issued credential.
    ///
    /// Missing email or password fails locally without a network call.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if !request.is_complete() {
            return Err(ApiError::BadRequest {
                message: "Email and password are required".to_string(),
            });
        }

        let outcome = self.client.login(&request).await?;
        let credential = outcome.credential.ok_or_else(|| {
            ApiError::InvalidResponseFormat(format!(
                "login succeeded but no {:?} credential was issued",
                self.client.auth_mode()
            ))
        })?;

        self.client
            .set_credential(credential.clone())
            .map_err(|e| ApiError::InvalidResponseFormat(e.to_string()))?;
        self.identity = None;

        let stored = StoredCredential::new(credential).with_email(request.email.clone());
        if let Err(e) = self.store.set_credentials(&self.instance, &stored) {
            warn!("[ADMIN_GUARD] Logged in but could not persist credential: {}", e);
        }
        info!("[ADMIN_GUARD] Logged in as {}", request.email);
        Ok(())
    }

    /// Log out. The local credential is dropped even when the backend call fails.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let result = if self.client.credential().is_authenticated() {
            self.client.logout().await
        } else {
            Ok(())
        };

        // Credential::None never conflicts with the configured mode.
        let _ = self.client.set_credential(Credential::None);
        self.identity = None;
        if let Err(e) = self.store.delete_credentials(&self.instance) {
            warn!("[ADMIN_GUARD] Could not remove stored credential: {}", e);
        }
        result
    }
}
