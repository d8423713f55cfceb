//! Gmail CLI library
//!
//! OAuth2-authenticated Gmail operations (messages, drafts, labels, threads)
//! with a TTL-cached advisory documentation lookup.

pub mod auth;
pub mod cli;
pub mod config;
pub mod context7;
pub mod error;
pub mod gmail;

pub use config::Config;
pub use error::{Error, Result};
