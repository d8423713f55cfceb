//! Error types for the Gmail CLI
//!
//! This module defines the error hierarchy for all operations in the crate.

use thiserror::Error;

/// Main error type for the Gmail CLI
#[derive(Error, Debug)]
pub enum Error {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Gmail API errors
    #[error("Gmail API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Short category tag used by the CLI error line
    pub fn category(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Api(_) => "api",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Http(_) => "http",
        }
    }
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing OAuth client configuration: {var}")]
    MissingClientConfig { var: String },

    #[error("Not authenticated. Please run 'gmail-cli auth login' first")]
    NotAuthenticated,

    #[error("Authorization was denied: {error}")]
    AccessDenied { error: String },

    #[error("No authorization code received")]
    NoAuthCode,

    #[error("Timed out waiting for OAuth callback after {seconds}s")]
    FlowTimeout { seconds: u64 },

    #[error("OAuth callback error: {message}")]
    CallbackError { message: String },

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },

    #[error("Failed to refresh access token: {message}")]
    TokenRefreshFailed { message: String },
}

/// Gmail API errors, carrying the remote status code
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: String },

    #[error("Draft not found: {draft_id}")]
    DraftNotFound { draft_id: String },

    #[error("API request failed ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("Invalid message payload: {message}")]
    InvalidPayload { message: String },

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Home directory could not be determined")]
    HomeDirNotFound,

    #[error("Invalid redirect URI: {uri}")]
    InvalidRedirectUri { uri: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for Gmail CLI operations
pub type Result<T> = std::result::Result<T, Error>;
