//! Configuration file management for the admin client.
//!
//! # Configuration Format
//!
//! ```toml
//! [server]
//! url = "http://127.0.0.1:5000"  # Backend base URL
//! timeout = 30                    # Request timeout in seconds
//! connect_timeout = 10            # Connect timeout in seconds
//!
//! [auth]
//! mode = "cookie"                 # "cookie" or "bearer"
//! cookie_name = "session"
//!
//! [routes]
//! check_auth = "/admin/check-auth"
//! tables = "/admin/tables"
//!
//! [ui]
//! login_path = "/login"
//! ```
//!
//! `BOOKING_ADMIN_URL` overrides `server.url`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{AuthMode, Credential};
use crate::client::{AdminClientBuilder, DEFAULT_SESSION_COOKIE};
use crate::error::ConfigError;
use crate::routes::AdminRoutes;
use crate::timeouts::LinkTimeouts;
use crate::AdminClient;

/// Environment variable that overrides `server.url`
pub const URL_ENV_VAR: &str = "BOOKING_ADMIN_URL";

/// Admin client configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub routes: AdminRoutes,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Backend URL (e.g., http://127.0.0.1:5000)
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Session cookie name used in cookie mode
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Where the dashboard sends operators who fail the admin check
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Credential store key for this backend
    #[serde(default = "default_instance")]
    pub instance: String,
}

fn default_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_cookie_name() -> String {
    DEFAULT_SESSION_COOKIE.to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_instance() -> String {
    "local".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            instance: default_instance(),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|p| p.strip_prefix("~/")) {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

pub fn default_config_path() -> PathBuf {
    expand_config_path(Path::new("~/.booking/admin.toml"))
}

impl AdminConfig {
    /// Load configuration from file, then apply environment overrides.
    ///
    /// Returns the default configuration if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_config_path(path);
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
            toml::from_str(&contents)?
        } else {
            debug!("[CONFIG] {} not found, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var(URL_ENV_VAR) {
            config.apply_url_override(&url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let path = expand_config_path(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
            }
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::io(&path, e))
    }

    fn apply_url_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            debug!("[CONFIG] server.url overridden by {}", URL_ENV_VAR);
            self.server.url = url.to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigError::Invalid("server.url must not be empty".into()));
        }
        if self.server.timeout == 0 {
            return Err(ConfigError::Invalid("server.timeout must be at least 1 second".into()));
        }
        if self.server.connect_timeout == 0 {
            return Err(ConfigError::Invalid(
                "server.connect_timeout must be at least 1 second".into(),
            ));
        }
        if self.auth.mode == AuthMode::Cookie && self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.cookie_name is required in cookie mode".into(),
            ));
        }
        Ok(())
    }

    pub fn timeouts(&self) -> LinkTimeouts {
        LinkTimeouts::builder()
            .request_timeout(Duration::from_secs(self.server.timeout))
            .connection_timeout(Duration::from_secs(self.server.connect_timeout))
            .build()
    }

    /// Builder preloaded with this configuration.
    pub fn to_client_builder(&self, credential: Credential) -> AdminClientBuilder {
        AdminClient::builder()
            .base_url(self.server.url.clone())
            .timeouts(self.timeouts())
            .auth_mode(self.auth.mode)
            .cookie_name(self.auth.cookie_name.clone())
            .routes(self.routes.clone())
            .credential(credential)
    }
}
