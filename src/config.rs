//! Configuration management for the Gmail CLI
//!
//! All settings are environment-sourced; OAuth client id and secret are
//! required, everything else has a default.

use std::path::PathBuf;

use crate::error::{AuthError, ConfigError, Error, Result};

/// Default OAuth redirect URI (loopback capture)
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/oauth2callback";

/// Default Gmail scope (read/write mail)
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Configuration for the Gmail CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// OAuth redirect URI
    pub redirect_uri: String,

    /// Port the callback listener binds, derived from the redirect URI
    pub callback_port: u16,

    /// Path component of the redirect URI
    pub callback_path: String,

    /// Gmail API scopes
    pub scopes: Vec<String>,

    /// Path to stored credentials (access/refresh tokens)
    pub token_path: PathBuf,

    /// Account identifier used in API paths
    pub default_account: String,

    /// Whether the documentation cache is enabled
    pub docs_cache_enabled: bool,

    /// OAuth endpoint URLs (overridable for tests)
    pub endpoints: OAuthEndpoints,
}

/// OAuth endpoint URLs
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    /// Authorization (consent) endpoint
    pub auth_uri: String,

    /// Token exchange/refresh endpoint
    pub token_uri: String,

    /// Token introspection endpoint
    pub tokeninfo_uri: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            auth_uri: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            tokeninfo_uri: "https://oauth2.googleapis.com/tokeninfo".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self> {
        let client_id = require_env("GMAIL_CLIENT_ID")?;
        let client_secret = require_env("GMAIL_CLIENT_SECRET")?;

        let redirect_uri = std::env::var("GMAIL_REDIRECT_URI")
            .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string());

        let scopes = std::env::var("GMAIL_SCOPES")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![DEFAULT_SCOPE.to_string()]);

        let token_path = match std::env::var("GMAIL_TOKEN_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_token_path()?,
        };

        let default_account =
            std::env::var("GMAIL_DEFAULT_ACCOUNT").unwrap_or_else(|_| "me".to_string());

        let docs_cache_enabled = std::env::var("GMAIL_DOCS_CACHE")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        Self::build(
            client_id,
            client_secret,
            redirect_uri,
            scopes,
            token_path,
            default_account,
            docs_cache_enabled,
        )
    }

    /// Assemble a configuration, deriving the callback port and path from the
    /// redirect URI. Used directly by tests; `from_env` delegates here.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scopes: Vec<String>,
        token_path: PathBuf,
        default_account: String,
        docs_cache_enabled: bool,
    ) -> Result<Self> {
        if client_id.is_empty() {
            return Err(Error::Auth(AuthError::MissingClientConfig {
                var: "GMAIL_CLIENT_ID".to_string(),
            }));
        }
        if client_secret.is_empty() {
            return Err(Error::Auth(AuthError::MissingClientConfig {
                var: "GMAIL_CLIENT_SECRET".to_string(),
            }));
        }
        // GMAIL_SCOPES="," parses to nothing; catch it here rather than
        // sending an empty scope parameter to the consent endpoint.
        if scopes.is_empty() {
            return Err(Error::Config(ConfigError::InvalidConfig {
                message: "at least one OAuth scope is required".to_string(),
            }));
        }

        let (callback_port, callback_path) = parse_redirect_uri(&redirect_uri)?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            callback_port,
            callback_path,
            scopes,
            token_path,
            default_account,
            docs_cache_enabled,
            endpoints: OAuthEndpoints::default(),
        })
    }
}

fn require_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Auth(AuthError::MissingClientConfig {
            var: var.to_string(),
        })),
    }
}

fn default_token_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::Config(ConfigError::HomeDirNotFound))?;
    Ok(home.join(".gmail-cli").join("credentials.json"))
}

/// Extract (port, path) from a redirect URI like
/// `http://localhost:3000/oauth2callback`. Port defaults to 3000, path to
/// `/oauth2callback` when absent.
fn parse_redirect_uri(uri: &str) -> Result<(u16, String)> {
    let rest = uri
        .strip_prefix("http://")
        .or_else(|| uri.strip_prefix("https://"))
        .ok_or_else(|| {
            Error::Config(ConfigError::InvalidRedirectUri {
                uri: uri.to_string(),
            })
        })?;

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], rest[idx..].to_string()),
        None => (rest, "/oauth2callback".to_string()),
    };

    let port = match authority.rsplit_once(':') {
        Some((_, p)) => p.parse().map_err(|_| {
            Error::Config(ConfigError::InvalidRedirectUri {
                uri: uri.to_string(),
            })
        })?,
        None => 3000,
    };

    Ok((port, path))
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// System label IDs
    pub mod labels {
        pub const INBOX: &str = "INBOX";
        pub const UNREAD: &str = "UNREAD";
    }
}
