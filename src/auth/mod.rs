//! OAuth authentication for the Gmail API
//!
//! Contains the coordinator for the authorization-code flow, the loopback
//! callback listener, and persistent token storage.

pub mod callback;
pub mod oauth;
pub mod token_store;

pub use callback::CallbackListener;
pub use oauth::Authenticator;
pub use token_store::{StoredCredentials, TokenStore};
