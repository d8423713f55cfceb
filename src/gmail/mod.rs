//! Gmail API module
//!
//! Contains the wire types, MIME helpers, and client for the Gmail API.

pub mod client;
pub mod mime;
pub mod types;

pub use client::{GmailClient, MessageSummary};
