//! Gmail API client
//!
//! Thin façade over the Gmail REST API. Every call acquires a fresh access
//! token from the authenticator (which refreshes when needed) and translates
//! non-success responses into `ApiError` with the remote status code.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::gmail::API_BASE_URL;
use crate::error::{ApiError, Error, Result};
use crate::gmail::mime::{create_email_message, encode_raw_message, find_header, EmailParams};
use crate::gmail::types::*;

/// Gmail API client
pub struct GmailClient {
    http_client: reqwest::Client,
    authenticator: Arc<Authenticator>,
    account: String,
}

impl GmailClient {
    /// Create a new Gmail client for the given account identifier
    pub fn new(authenticator: Arc<Authenticator>, account: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
            account: account.into(),
        }
    }

    async fn access_token(&self) -> Result<String> {
        self.authenticator.access_token().await
    }

    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", API_BASE_URL, self.account)
    }

    fn drafts_url(&self) -> String {
        format!("{}/users/{}/drafts", API_BASE_URL, self.account)
    }

    fn labels_url(&self) -> String {
        format!("{}/users/{}/labels", API_BASE_URL, self.account)
    }

    fn threads_url(&self) -> String {
        format!("{}/users/{}/threads", API_BASE_URL, self.account)
    }

    async fn request_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Error::Api(ApiError::Request { status, message })
    }

    // ==================== Message Operations ====================

    /// List messages matching a query, hydrated with display metadata
    pub async fn list_messages(
        &self,
        query: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<Vec<MessageSummary>> {
        let token = self.access_token().await?;
        let max = max_results.unwrap_or(10);

        let mut url = format!("{}?maxResults={}", self.messages_url(), max);
        if let Some(q) = query {
            url.push_str(&format!("&q={}", urlencoding::encode(q)));
        }

        let response = self.http_client.get(&url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            return Err(Self::request_error(response).await);
        }

        let message_list: MessageList = response.json().await?;

        let mut results = Vec::new();
        for msg_ref in message_list.messages {
            let url = format!(
                "{}/{}?format=metadata&metadataHeaders=Subject&metadataHeaders=From&metadataHeaders=Date",
                self.messages_url(),
                msg_ref.id
            );

            let response = self.http_client.get(&url).bearer_auth(&token).send().await?;
            if !response.status().is_success() {
                tracing::debug!("skipping message {} metadata fetch", msg_ref.id);
                continue;
            }

            let message: Message = response.json().await?;
            let payload = message.payload.as_ref();

            results.push(MessageSummary {
                id: message.id,
                thread_id: msg_ref.thread_id,
                subject: payload
                    .and_then(|p| find_header(p, "subject"))
                    .unwrap_or("")
                    .to_string(),
                from: payload
                    .and_then(|p| find_header(p, "from"))
                    .unwrap_or("")
                    .to_string(),
                date: payload
                    .and_then(|p| find_header(p, "date"))
                    .unwrap_or("")
                    .to_string(),
                snippet: message.snippet.unwrap_or_default(),
            });
        }

        Ok(results)
    }

    /// Get a full message by ID
    pub async fn get_message(&self, message_id: &str) -> Result<Message> {
        let token = self.access_token().await?;
        let url = format!("{}/{}?format=full", self.messages_url(), message_id);

        let response = self.http_client.get(&url).bearer_auth(&token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status().as_u16() == 404 {
            Err(Error::Api(ApiError::MessageNotFound {
                message_id: message_id.to_string(),
            }))
        } else {
            Err(Self::request_error(response).await)
        }
    }

    /// Send an email
    pub async fn send_email(&self, params: EmailParams) -> Result<Message> {
        let token = self.access_token().await?;

        let raw_message = create_email_message(&params)?;
        let request = SendMessageRequest {
            raw: encode_raw_message(&raw_message),
            thread_id: params.thread_id,
        };

        let url = format!("{}/send", self.messages_url());
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::request_error(response).await)
        }
    }

    /// Modify labels on many messages in one request (messages.batchModify)
    pub async fn batch_modify_messages(
        &self,
        message_ids: Vec<String>,
        add_label_ids: Option<Vec<String>>,
        remove_label_ids: Option<Vec<String>>,
    ) -> Result<()> {
        if message_ids.is_empty() {
            return Ok(());
        }

        let token = self.access_token().await?;
        let url = format!("{}/batchModify", self.messages_url());

        let request = BatchModifyRequest {
            ids: message_ids,
            add_label_ids,
            remove_label_ids,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        // Success is an empty 204 body.
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::request_error(response).await)
        }
    }

    // ==================== Draft Operations ====================

    /// List drafts
    pub async fn list_drafts(&self, max_results: Option<u32>) -> Result<DraftList> {
        let token = self.access_token().await?;
        let url = format!("{}?maxResults={}", self.drafts_url(), max_results.unwrap_or(10));

        let response = self.http_client.get(&url).bearer_auth(&token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::request_error(response).await)
        }
    }

    /// Create a draft
    pub async fn create_draft(&self, params: EmailParams) -> Result<Draft> {
        let token = self.access_token().await?;

        let raw_message = create_email_message(&params)?;
        let request = CreateDraftRequest {
            message: SendMessageRequest {
                raw: encode_raw_message(&raw_message),
                thread_id: params.thread_id,
            },
        };

        let response = self
            .http_client
            .post(self.drafts_url())
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::request_error(response).await)
        }
    }

    /// Send an existing draft
    pub async fn send_draft(&self, draft_id: &str) -> Result<Message> {
        let token = self.access_token().await?;
        let url = format!("{}/send", self.drafts_url());

        let request = SendDraftRequest {
            id: draft_id.to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status().as_u16() == 404 {
            Err(Error::Api(ApiError::DraftNotFound {
                draft_id: draft_id.to_string(),
            }))
        } else {
            Err(Self::request_error(response).await)
        }
    }

    // ==================== Label / Thread Operations ====================

    /// List all labels
    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        let token = self.access_token().await?;

        let response = self
            .http_client
            .get(self.labels_url())
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            let list: LabelList = response.json().await?;
            Ok(list.labels)
        } else {
            Err(Self::request_error(response).await)
        }
    }

    /// Get a thread with its messages
    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", self.threads_url(), thread_id);

        let response = self.http_client.get(&url).bearer_auth(&token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::request_error(response).await)
        }
    }
}

/// Display metadata for a listed message
#[derive(Debug, Clone)]
pub struct MessageSummary {
    pub id: String,
    pub thread_id: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub snippet: String,
}
