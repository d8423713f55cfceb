//! MIME message construction
//!
//! Builds the raw RFC822 messages the Gmail API expects and the base64url
//! encoding helpers around them.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{ApiError, Error, Result};
use crate::gmail::types::MessagePart;

/// Validate an email address
pub fn validate_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);

    !local.is_empty()
        && !domain.is_empty()
        && !local.contains(' ')
        && !domain.contains(' ')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Encode text for a MIME header (RFC 2047)
pub fn encode_mime_header(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '\r' && c != '\n') {
        return text.to_string();
    }

    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
    )
}

/// Encode a raw email message for the Gmail API (base64url, no padding)
pub fn encode_raw_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Decode base64url data from the Gmail API, padded or not
pub fn decode_base64url_string(data: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(data))
        .map_err(|e| {
            Error::Api(ApiError::InvalidPayload {
                message: format!("invalid base64 data: {e}"),
            })
        })?;
    String::from_utf8(bytes).map_err(|e| {
        Error::Api(ApiError::InvalidPayload {
            message: format!("non-UTF-8 data: {e}"),
        })
    })
}

/// Recursively extract the first text/plain body from a MIME tree
pub fn extract_plain_text(part: &MessagePart) -> Option<String> {
    if part.mime_type.as_deref() == Some("text/plain") {
        if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
            if let Ok(text) = decode_base64url_string(data) {
                return Some(text);
            }
        }
    }

    part.parts.iter().find_map(extract_plain_text)
}

/// Find a header value by name (case-insensitive)
pub fn find_header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Parameters for creating an email message
#[derive(Debug, Clone, Default)]
pub struct EmailParams {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
    pub thread_id: Option<String>,
    pub in_reply_to: Option<String>,
}

/// Create a raw RFC822 email message
pub fn create_email_message(params: &EmailParams) -> Result<String> {
    for email in &params.to {
        if !validate_email(email) {
            return Err(Error::Api(ApiError::InvalidEmail {
                email: email.clone(),
            }));
        }
    }

    let mut lines = Vec::new();

    lines.push("From: me".to_string());
    lines.push(format!("To: {}", params.to.join(", ")));

    if let Some(ref cc) = params.cc {
        if !cc.is_empty() {
            lines.push(format!("Cc: {}", cc.join(", ")));
        }
    }

    if let Some(ref bcc) = params.bcc {
        if !bcc.is_empty() {
            lines.push(format!("Bcc: {}", bcc.join(", ")));
        }
    }

    lines.push(format!("Subject: {}", encode_mime_header(&params.subject)));

    if let Some(ref in_reply_to) = params.in_reply_to {
        lines.push(format!("In-Reply-To: {}", in_reply_to));
        lines.push(format!("References: {}", in_reply_to));
    }

    lines.push("MIME-Version: 1.0".to_string());

    if let Some(ref html) = params.html_body {
        // Plain + HTML alternative
        let boundary = format!("----=_NextPart_{}", generate_boundary());
        lines.push(format!(
            "Content-Type: multipart/alternative; boundary=\"{}\"",
            boundary
        ));
        lines.push(String::new());

        lines.push(format!("--{}", boundary));
        lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
        lines.push("Content-Transfer-Encoding: 7bit".to_string());
        lines.push(String::new());
        lines.push(params.body.clone());
        lines.push(String::new());

        lines.push(format!("--{}", boundary));
        lines.push("Content-Type: text/html; charset=UTF-8".to_string());
        lines.push("Content-Transfer-Encoding: 7bit".to_string());
        lines.push(String::new());
        lines.push(html.clone());
        lines.push(String::new());

        lines.push(format!("--{}--", boundary));
    } else {
        lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
        lines.push("Content-Transfer-Encoding: 7bit".to_string());
        lines.push(String::new());
        lines.push(params.body.clone());
    }

    Ok(lines.join("\r\n"))
}

/// Generate a boundary string for multipart messages
fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::types::Header;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com"));
        assert!(validate_email("user.name@domain.co.uk"));
        assert!(validate_email("a@b.co"));
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("@domain.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email("user@domain."));
    }

    #[test]
    fn test_encode_mime_header_ascii() {
        assert_eq!(encode_mime_header("Hello World"), "Hello World");
    }

    #[test]
    fn test_encode_mime_header_unicode() {
        let encoded = encode_mime_header("Héllo Wörld");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_encode_raw_message_no_padding() {
        let encoded = encode_raw_message("Hello World");
        assert_eq!(encoded, "SGVsbG8gV29ybGQ");
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_decode_base64url() {
        assert_eq!(
            decode_base64url_string("SGVsbG8gV29ybGQ").unwrap(),
            "Hello World"
        );
    }

    #[test]
    fn test_extract_plain_text_from_nested_parts() {
        use crate::gmail::types::MessagePartBody;

        let part = MessagePart {
            mime_type: Some("multipart/alternative".to_string()),
            parts: vec![MessagePart {
                mime_type: Some("text/plain".to_string()),
                body: Some(MessagePartBody {
                    size: 11,
                    data: Some("SGVsbG8gV29ybGQ".to_string()),
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(extract_plain_text(&part).as_deref(), Some("Hello World"));
    }

    #[test]
    fn test_find_header_case_insensitive() {
        let part = MessagePart {
            headers: vec![Header {
                name: "Subject".to_string(),
                value: "Hi".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(find_header(&part, "subject"), Some("Hi"));
        assert_eq!(find_header(&part, "from"), None);
    }

    #[test]
    fn test_create_plain_email() {
        let params = EmailParams {
            to: vec!["test@example.com".to_string()],
            subject: "Test Subject".to_string(),
            body: "Test body".to_string(),
            ..Default::default()
        };
        let message = create_email_message(&params).unwrap();
        assert!(message.contains("To: test@example.com"));
        assert!(message.contains("Subject: Test Subject"));
        assert!(message.contains("Content-Type: text/plain"));
        assert!(message.contains("Test body"));
    }

    #[test]
    fn test_create_html_email() {
        let params = EmailParams {
            to: vec!["test@example.com".to_string()],
            subject: "HTML".to_string(),
            body: "plain version".to_string(),
            html_body: Some("<h1>HTML version</h1>".to_string()),
            ..Default::default()
        };
        let message = create_email_message(&params).unwrap();
        assert!(message.contains("multipart/alternative"));
        assert!(message.contains("plain version"));
        assert!(message.contains("<h1>HTML version</h1>"));
    }

    #[test]
    fn test_create_email_with_reply_headers() {
        let params = EmailParams {
            to: vec!["to@example.com".to_string()],
            subject: "Re: Original".to_string(),
            body: "Reply".to_string(),
            in_reply_to: Some("<original@example.com>".to_string()),
            ..Default::default()
        };
        let message = create_email_message(&params).unwrap();
        assert!(message.contains("In-Reply-To: <original@example.com>"));
        assert!(message.contains("References: <original@example.com>"));
    }

    #[test]
    fn test_create_email_rejects_invalid_recipient() {
        let params = EmailParams {
            to: vec!["invalid".to_string()],
            subject: "x".to_string(),
            body: "y".to_string(),
            ..Default::default()
        };
        assert!(create_email_message(&params).is_err());
    }
}
