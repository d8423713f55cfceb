//! Loopback listener for the OAuth redirect
//!
//! A short-lived HTTP server that captures exactly one request on the
//! configured callback path. All exit paths (code received, error parameter,
//! missing code, timeout) converge on a single shutdown point so the port is
//! guaranteed to be free when `wait_for_code` returns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::Query, response::Html, routing::get, Router};
use tokio::sync::oneshot;

use crate::error::{AuthError, Error, Result};

/// How a callback request resolved the flow
#[derive(Debug)]
enum CallbackOutcome {
    Code(String),
    Denied(String),
    NoCode,
}

const SUCCESS_PAGE: &str = "<html><body><h1>Authentication successful!</h1>\
     <p>You can close this window and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h1>Authentication failed</h1>\
     <p>You can close this window and try again.</p></body></html>";
const ALREADY_RESOLVED_PAGE: &str =
    "<html><body><p>This authentication attempt has already completed.</p></body></html>";

/// One-shot OAuth callback listener
pub struct CallbackListener {
    listener: tokio::net::TcpListener,
    path: String,
}

impl CallbackListener {
    /// Bind the loopback port. Binding happens before the browser is opened
    /// so a port conflict fails the flow early.
    pub async fn bind(port: u16, path: &str) -> Result<Self> {
        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            Error::Auth(AuthError::CallbackError {
                message: format!("failed to bind callback port {port}: {e}"),
            })
        })?;
        Ok(Self {
            listener,
            path: path.to_string(),
        })
    }

    /// Port the listener is bound to
    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|a| a.port())
            .unwrap_or_default()
    }

    /// Serve until the first request on the callback path resolves the flow
    /// or the watchdog fires, then shut the server down and return the
    /// authorization code.
    ///
    /// Requests to other paths get a 404 and do not resolve the flow.
    pub async fn wait_for_code(self, timeout: Duration) -> Result<String> {
        let (tx, rx) = oneshot::channel::<CallbackOutcome>();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let handler = move |Query(params): Query<HashMap<String, String>>| {
            let tx = tx.clone();
            async move {
                let outcome = if let Some(error) = params.get("error") {
                    CallbackOutcome::Denied(error.clone())
                } else if let Some(code) = params.get("code") {
                    CallbackOutcome::Code(code.clone())
                } else {
                    CallbackOutcome::NoCode
                };

                let page = match &outcome {
                    CallbackOutcome::Code(_) => SUCCESS_PAGE,
                    _ => FAILURE_PAGE,
                };

                // First qualifying request wins; later ones see a stub page.
                match tx.lock().ok().and_then(|mut guard| guard.take()) {
                    Some(sender) => {
                        let _ = sender.send(outcome);
                        Html(page)
                    }
                    None => Html(ALREADY_RESOLVED_PAGE),
                }
            }
        };

        let app = Router::new().route(&self.path, get(handler));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(self.listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        let server_task = tokio::spawn(async move { server.await });

        let outcome = tokio::select! {
            received = rx => received.ok(),
            _ = tokio::time::sleep(timeout) => None,
        };

        // Single shutdown point; joining the task releases the port.
        let _ = shutdown_tx.send(());
        if let Ok(Err(e)) = server_task.await {
            tracing::warn!("callback server error during shutdown: {e}");
        }

        match outcome {
            Some(CallbackOutcome::Code(code)) => Ok(code),
            Some(CallbackOutcome::Denied(error)) => {
                Err(Error::Auth(AuthError::AccessDenied { error }))
            }
            Some(CallbackOutcome::NoCode) => Err(Error::Auth(AuthError::NoAuthCode)),
            None => Err(Error::Auth(AuthError::FlowTimeout {
                seconds: timeout.as_secs(),
            })),
        }
    }
}
