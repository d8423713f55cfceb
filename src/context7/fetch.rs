//! Documentation fetch strategy
//!
//! The fetcher is an injectable trait so a real lookup service can be
//! substituted without touching the cache or the service wiring. The default
//! implementation serves canned documentation selected by substring match.

use async_trait::async_trait;

use crate::error::{ApiError, Error, Result};

/// A function from search term to documentation
#[async_trait]
pub trait DocFetcher: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<String>;
}

/// Canned documentation fetcher
#[derive(Debug, Default)]
pub struct MockDocFetcher;

/// (substring, documentation) pairs checked in order
const TOPICS: &[(&str, &str)] = &[
    (
        "send",
        "users.messages.send: POST the base64url-encoded RFC822 message in the \
         'raw' field; include 'threadId' to keep replies in the same thread.",
    ),
    (
        "draft",
        "users.drafts: create wraps a message in a draft envelope; drafts.send \
         takes the draft id and delivers the stored message.",
    ),
    (
        "batch",
        "users.messages.batchModify: applies addLabelIds/removeLabelIds to up \
         to 1000 ids in one call; a successful response has an empty body.",
    ),
    (
        "label",
        "users.labels.list: returns system labels (INBOX, UNREAD, ...) and user \
         labels; label ids, not names, are what modify operations expect.",
    ),
    (
        "thread",
        "users.threads.get: returns the thread with its messages; each message \
         carries its own labelIds and payload.",
    ),
    (
        "list",
        "users.messages.list: supports Gmail search syntax in 'q' (from:, \
         is:unread, has:attachment); returns ids only, fetch metadata per id.",
    ),
    (
        "auth",
        "OAuth2 installed-app flow: request offline access and prompt=consent \
         to be issued a refresh token; exchange the code on the token endpoint.",
    ),
];

#[async_trait]
impl DocFetcher for MockDocFetcher {
    async fn fetch(&self, query: &str) -> Result<String> {
        let query_lower = query.to_lowercase();

        for (topic, docs) in TOPICS {
            if query_lower.contains(topic) {
                return Ok(docs.to_string());
            }
        }

        Err(Error::Api(ApiError::Request {
            status: 404,
            message: format!("no documentation found for '{query}'"),
        }))
    }
}
