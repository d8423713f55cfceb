//! CLI command handlers
//!
//! Each invocation builds one `App` and threads it through the handler for
//! the selected subcommand; there is no global state.

use std::sync::Arc;

use colored::Colorize;

use crate::auth::Authenticator;
use crate::config::{gmail::labels, Config};
use crate::context7::Context7Service;
use crate::error::Result;
use crate::gmail::mime::{extract_plain_text, find_header, EmailParams};
use crate::gmail::GmailClient;

/// Per-invocation application context
pub struct App {
    pub config: Config,
    pub authenticator: Arc<Authenticator>,
    pub gmail: GmailClient,
    pub docs: Context7Service,
}

impl App {
    /// Build the context from the environment
    pub fn bootstrap() -> Result<Self> {
        let config = Config::from_env()?;
        let authenticator = Arc::new(Authenticator::new(config.clone()));
        let gmail = GmailClient::new(authenticator.clone(), config.default_account.clone());
        let docs = Context7Service::new(config.docs_cache_enabled);

        Ok(Self {
            config,
            authenticator,
            gmail,
            docs,
        })
    }

    /// Print an advisory documentation note for an operation, if available
    async fn print_docs(&self, operation: &str) {
        if let Some(docs) = self.docs.lookup(operation, None).await {
            println!("{}", format!("docs: {docs}").dimmed());
        }
    }
}

// ==================== auth ====================

pub async fn auth_login(app: &App) -> Result<()> {
    app.authenticator.authenticate().await?;
    println!("{}", "Authentication completed successfully.".green());
    Ok(())
}

pub async fn auth_logout(app: &App) -> Result<()> {
    app.authenticator.logout().await?;
    println!("Logged out; stored credentials removed.");
    Ok(())
}

pub async fn auth_status(app: &App) -> Result<()> {
    match app.authenticator.current_credentials().await {
        Some(creds) => {
            println!("{}", "Authenticated".green().bold());
            println!("  account:    {}", app.config.default_account);
            println!("  token file: {}", app.config.token_path.display());
            println!("  scope:      {}", creds.scope);
            match creds.expiry {
                Some(expiry) => {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs() as i64;
                    if expiry > now {
                        println!("  expires in: {}s", expiry - now);
                    } else {
                        println!("  expires in: expired (will refresh on next call)");
                    }
                }
                None => println!("  expires in: unknown"),
            }
        }
        None => {
            println!("{}", "Not authenticated".yellow().bold());
            println!("Run 'gmail-cli auth login' to authenticate.");
        }
    }
    Ok(())
}

// ==================== messages ====================

pub async fn messages_list(app: &App, query: Option<&str>, max: Option<u32>) -> Result<()> {
    app.print_docs("messages.list").await;

    let messages = app.gmail.list_messages(query, max).await?;
    if messages.is_empty() {
        println!("No messages found.");
        return Ok(());
    }

    for msg in messages {
        println!(
            "{}  {}  {}",
            msg.id.yellow(),
            msg.from.bold(),
            msg.subject
        );
        if !msg.snippet.is_empty() {
            println!("    {}", msg.snippet.dimmed());
        }
    }
    Ok(())
}

pub async fn messages_get(app: &App, message_id: &str) -> Result<()> {
    app.print_docs("messages.get").await;

    let message = app.gmail.get_message(message_id).await?;
    let payload = message.payload.as_ref();

    for header in ["From", "To", "Date", "Subject"] {
        if let Some(value) = payload.and_then(|p| find_header(p, header)) {
            println!("{}: {}", header.bold(), value);
        }
    }
    println!();

    let body = payload
        .and_then(extract_plain_text)
        .or(message.snippet)
        .unwrap_or_default();
    println!("{body}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn messages_send(
    app: &App,
    to: Vec<String>,
    subject: String,
    body: String,
    html_body: Option<String>,
    cc: Option<Vec<String>>,
    bcc: Option<Vec<String>>,
) -> Result<()> {
    app.print_docs("messages.send").await;

    let params = EmailParams {
        to,
        subject,
        body,
        html_body,
        cc,
        bcc,
        ..Default::default()
    };

    let message = app.gmail.send_email(params).await?;
    println!("{} {}", "Sent message".green(), message.id);
    Ok(())
}

// ==================== drafts ====================

pub async fn drafts_list(app: &App, max: Option<u32>) -> Result<()> {
    app.print_docs("drafts.list").await;

    let drafts = app.gmail.list_drafts(max).await?;
    if drafts.drafts.is_empty() {
        println!("No drafts found.");
        return Ok(());
    }

    for draft in drafts.drafts {
        println!("{}  message {}", draft.id.yellow(), draft.message.id);
    }
    Ok(())
}

pub async fn drafts_create(
    app: &App,
    to: Vec<String>,
    subject: String,
    body: String,
) -> Result<()> {
    app.print_docs("drafts.create").await;

    let params = EmailParams {
        to,
        subject,
        body,
        ..Default::default()
    };

    let draft = app.gmail.create_draft(params).await?;
    println!("{} {}", "Created draft".green(), draft.id);
    Ok(())
}

pub async fn drafts_send(app: &App, draft_id: &str) -> Result<()> {
    app.print_docs("drafts.send").await;

    let message = app.gmail.send_draft(draft_id).await?;
    println!("{} {}", "Sent draft as message".green(), message.id);
    Ok(())
}

// ==================== batch ====================

pub async fn batch_mark_read(app: &App, message_ids: Vec<String>) -> Result<()> {
    app.print_docs("messages.batchModify").await;

    let count = message_ids.len();
    app.gmail
        .batch_modify_messages(message_ids, None, Some(vec![labels::UNREAD.to_string()]))
        .await?;
    println!("{} {count} message(s)", "Marked read:".green());
    Ok(())
}

pub async fn batch_archive(app: &App, message_ids: Vec<String>) -> Result<()> {
    app.print_docs("messages.batchModify").await;

    let count = message_ids.len();
    app.gmail
        .batch_modify_messages(message_ids, None, Some(vec![labels::INBOX.to_string()]))
        .await?;
    println!("{} {count} message(s)", "Archived:".green());
    Ok(())
}

// ==================== labels ====================

pub async fn labels_list(app: &App) -> Result<()> {
    app.print_docs("labels.list").await;

    let all = app.gmail.list_labels().await?;
    let (system, user): (Vec<_>, Vec<_>) = all
        .into_iter()
        .partition(|l| l.label_type.as_deref() == Some("system"));

    println!("{} ({})", "System labels".bold(), system.len());
    for label in &system {
        println!("  {}  {}", label.id.yellow(), label.name);
    }
    println!("{} ({})", "User labels".bold(), user.len());
    for label in &user {
        println!("  {}  {}", label.id.yellow(), label.name);
    }
    Ok(())
}

// ==================== threads ====================

pub async fn threads_get(app: &App, thread_id: &str) -> Result<()> {
    app.print_docs("threads.get").await;

    let thread = app.gmail.get_thread(thread_id).await?;
    println!(
        "{} {} ({} messages)",
        "Thread".bold(),
        thread.id,
        thread.messages.len()
    );
    for message in thread.messages {
        let subject = message
            .payload
            .as_ref()
            .and_then(|p| find_header(p, "subject"))
            .unwrap_or("");
        println!("  {}  {}", message.id.yellow(), subject);
    }
    Ok(())
}

// ==================== stats / docs ====================

pub async fn stats(app: &App) -> Result<()> {
    let authenticated = app.authenticator.is_authenticated().await;
    let cache = app.docs.stats();

    println!("{}", "gmail-cli status".bold());
    println!("  authenticated:  {authenticated}");
    println!("  docs cache:     {}", if app.docs.is_enabled() { "enabled" } else { "disabled" });
    println!("  cached entries: {}", cache.size);
    Ok(())
}

pub async fn docs_status(app: &App) -> Result<()> {
    let stats = app.docs.stats();
    println!(
        "Documentation cache: {}",
        if app.docs.is_enabled() {
            "enabled".green()
        } else {
            "disabled".yellow()
        }
    );
    println!("  entries: {}", stats.size);
    for key in stats.keys {
        println!("  - {key}");
    }
    Ok(())
}

pub async fn docs_get(app: &App, operation: &str, context: Option<&str>) -> Result<()> {
    match app.docs.lookup(operation, context).await {
        Some(docs) => println!("{docs}"),
        None => println!("No documentation available for '{operation}'."),
    }
    Ok(())
}

pub async fn docs_clear(app: &App) -> Result<()> {
    app.docs.clear();
    println!("Documentation cache cleared.");
    Ok(())
}
