//! OAuth2 coordinator
//!
//! Produces a valid, non-expired credential, authenticating interactively if
//! necessary. Token-load and token-validation failures are absorbed and route
//! back through refresh or the interactive flow; they never abort the call.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::auth::callback::CallbackListener;
use crate::auth::token_store::{StoredCredentials, TokenStore};
use crate::config::Config;
use crate::error::{AuthError, Error, Result};

/// Refresh proactively when the token expires within this window (inclusive)
const REFRESH_THRESHOLD_SECS: i64 = 300;

/// Watchdog for the interactive flow
const FLOW_TIMEOUT: Duration = Duration::from_secs(300);

/// Token response from the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// OAuth coordinator
pub struct Authenticator {
    config: Config,
    http_client: reqwest::Client,
    token_store: TokenStore,
    credentials: Arc<RwLock<Option<StoredCredentials>>>,
    // Serializes interactive flows; held across the whole browser round-trip.
    flow_lock: Mutex<()>,
}

impl Authenticator {
    /// Create a new authenticator. Loads any persisted credential; no network
    /// or browser action happens here.
    pub fn new(config: Config) -> Self {
        let token_store = TokenStore::new(config.token_path.clone());
        let credentials = Arc::new(RwLock::new(token_store.load()));

        Self {
            config,
            http_client: reqwest::Client::new(),
            token_store,
            credentials,
            flow_lock: Mutex::new(()),
        }
    }

    /// Whether a credential is currently installed
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Snapshot of the installed credential, for status display
    pub async fn current_credentials(&self) -> Option<StoredCredentials> {
        self.credentials.read().await.clone()
    }

    /// Ensure a valid, non-expired credential is installed.
    ///
    /// Tries the persisted credential first (validated against the
    /// introspection endpoint, refreshed when expiry is within 5 minutes) and
    /// falls back to the interactive browser flow.
    pub async fn authenticate(&self) -> Result<()> {
        let existing = self.credentials.read().await.clone();

        if let Some(creds) = existing {
            if self.validate_token(&creds.access_token).await {
                if !Self::expiring_soon(&creds) {
                    return Ok(());
                }
                match self.refresh_token().await {
                    Ok(_) => return Ok(()),
                    Err(e) => tracing::warn!("token refresh failed, re-authenticating: {e}"),
                }
            } else if creds.refresh_token.is_some() {
                // Invalid access token but a refresh token on hand; one
                // refresh attempt before falling back to the browser.
                match self.refresh_token().await {
                    Ok(_) => return Ok(()),
                    Err(e) => tracing::warn!("token refresh failed, re-authenticating: {e}"),
                }
            }
        }

        self.interactive_flow().await
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn access_token(&self) -> Result<String> {
        // Clone out of the lock; refresh_token needs the write half.
        let creds = self.credentials.read().await.clone();

        match creds {
            Some(creds) if Self::expiring_soon(&creds) => self.refresh_token().await,
            Some(creds) => Ok(creds.access_token),
            None => Err(Error::Auth(AuthError::NotAuthenticated)),
        }
    }

    /// Remove the persisted and in-memory credential
    pub async fn logout(&self) -> Result<()> {
        self.token_store.delete()?;
        *self.credentials.write().await = None;
        Ok(())
    }

    fn expiring_soon(creds: &StoredCredentials) -> bool {
        match creds.expiry {
            Some(expiry) => expiry - now_unix() <= REFRESH_THRESHOLD_SECS,
            None => false,
        }
    }

    /// Check the access token against the introspection endpoint. Any failure,
    /// transport errors included, counts as invalid rather than fatal.
    async fn validate_token(&self, access_token: &str) -> bool {
        let url = format!(
            "{}?access_token={}",
            self.config.endpoints.tokeninfo_uri,
            urlencoding::encode(access_token)
        );

        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("token validation request failed: {e}");
                false
            }
        }
    }

    /// Refresh the access token using the refresh token
    async fn refresh_token(&self) -> Result<String> {
        let creds = self.credentials.read().await;
        let refresh_token = creds
            .as_ref()
            .and_then(|c| c.refresh_token.clone())
            .ok_or_else(|| {
                Error::Auth(AuthError::TokenRefreshFailed {
                    message: "No refresh token available".to_string(),
                })
            })?;
        drop(creds);

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.config.endpoints.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(AuthError::TokenRefreshFailed { message: text }));
        }

        let token_response: TokenResponse = response.json().await?;

        let new_credentials = StoredCredentials {
            access_token: token_response.access_token.clone(),
            // Google omits the refresh token on refresh responses; keep ours.
            refresh_token: token_response.refresh_token.or(Some(refresh_token)),
            token_type: token_response.token_type,
            scope: token_response.scope,
            expiry: token_response.expires_in.map(|e| now_unix() + e),
        };

        self.install(new_credentials.clone()).await?;
        Ok(new_credentials.access_token)
    }

    /// Generate the authorization URL
    pub fn generate_auth_url(&self) -> String {
        let scopes = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.config.endpoints.auth_uri,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scopes)
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.endpoints.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(AuthError::TokenExchangeFailed { message: text }));
        }

        let token_response: TokenResponse = response.json().await?;

        let credentials = StoredCredentials {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            token_type: token_response.token_type,
            scope: token_response.scope,
            expiry: token_response.expires_in.map(|e| now_unix() + e),
        };

        self.install(credentials.clone()).await?;
        Ok(credentials)
    }

    /// Persist and install a credential. Save failures are fatal to the
    /// authenticate call.
    async fn install(&self, credentials: StoredCredentials) -> Result<()> {
        self.token_store.save(&credentials)?;
        *self.credentials.write().await = Some(credentials);
        Ok(())
    }

    /// Run the interactive browser flow with the loopback listener. At most
    /// one flow runs at a time; concurrent callers queue here instead of
    /// racing for the callback port.
    async fn interactive_flow(&self) -> Result<()> {
        let _flow = self.flow_lock.lock().await;

        // A call that queued behind a completed flow can use its credential.
        if let Some(creds) = self.credentials.read().await.clone() {
            if !Self::expiring_soon(&creds) {
                return Ok(());
            }
        }

        // Bind before opening the browser so a port conflict fails early.
        let listener =
            CallbackListener::bind(self.config.callback_port, &self.config.callback_path).await?;

        let auth_url = self.generate_auth_url();
        eprintln!("\nPlease visit this URL to authenticate:");
        eprintln!("{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            tracing::warn!("could not open browser automatically: {e}");
            eprintln!("Could not open browser automatically; please open the URL manually.");
        }

        eprintln!(
            "Waiting for authentication callback on port {}...",
            listener.port()
        );

        let code = listener.wait_for_code(FLOW_TIMEOUT).await?;

        tracing::info!("received authorization code, exchanging for tokens");
        self.exchange_code(&code).await?;
        Ok(())
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SCOPE;

    fn test_config(dir: &std::path::Path) -> Config {
        Config::build(
            "test-client-id".to_string(),
            "test-secret".to_string(),
            "http://localhost:3000/oauth2callback".to_string(),
            vec![DEFAULT_SCOPE.to_string()],
            dir.join("credentials.json"),
            "me".to_string(),
            true,
        )
        .unwrap()
    }

    fn credentials_with_expiry(expiry: Option<i64>) -> StoredCredentials {
        StoredCredentials {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: "Bearer".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            expiry,
        }
    }

    #[test]
    fn test_auth_url_contains_offline_consent() {
        let dir = tempfile::tempdir().unwrap();
        let auth = Authenticator::new(test_config(dir.path()));
        let url = auth.generate_auth_url();

        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_expiring_soon_boundary() {
        // Inclusive boundary: exactly 300 s away still refreshes.
        let now = now_unix();
        assert!(Authenticator::expiring_soon(&credentials_with_expiry(
            Some(now + 300)
        )));
        assert!(!Authenticator::expiring_soon(&credentials_with_expiry(
            Some(now + 301)
        )));
        assert!(!Authenticator::expiring_soon(&credentials_with_expiry(None)));
    }

    #[tokio::test]
    async fn test_access_token_without_credentials_fails() {
        let dir = tempfile::tempdir().unwrap();
        let auth = Authenticator::new(test_config(dir.path()));

        assert!(!auth.is_authenticated().await);
        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_loads_persisted_credentials_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        TokenStore::new(config.token_path.clone())
            .save(&credentials_with_expiry(Some(now_unix() + 3600)))
            .unwrap();

        let auth = Authenticator::new(config);
        assert!(auth.is_authenticated().await);
        assert_eq!(auth.access_token().await.unwrap(), "token");
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let store = TokenStore::new(config.token_path.clone());
        store
            .save(&credentials_with_expiry(Some(now_unix() + 3600)))
            .unwrap();

        let auth = Authenticator::new(config);
        auth.logout().await.unwrap();

        assert!(!auth.is_authenticated().await);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_token_response_deserialize() {
        let json = r#"{"access_token":"at","refresh_token":"rt","token_type":"Bearer","expires_in":3599,"scope":"s"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "at");
        assert_eq!(resp.expires_in, Some(3599));
    }
}
