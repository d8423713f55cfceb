//! Gmail CLI
//!
//! Command-line access to Gmail: OAuth login, message and draft operations,
//! batch label changes, and cached documentation lookups.

use clap::{Parser, Subcommand};
use colored::Colorize;

use gmail_cli::cli::{self, App};
use gmail_cli::error::Result;

/// Gmail CLI
#[derive(Parser)]
#[command(name = "gmail-cli")]
#[command(author, version, about = "Gmail from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage authentication
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Work with messages
    Messages {
        #[command(subcommand)]
        action: MessagesAction,
    },

    /// Work with drafts
    Drafts {
        #[command(subcommand)]
        action: DraftsAction,
    },

    /// Batch operations over message ids
    Batch {
        #[command(subcommand)]
        action: BatchAction,
    },

    /// List labels
    Labels,

    /// Show a thread with its messages
    Thread {
        /// Thread ID
        thread_id: String,
    },

    /// Show overall status
    Stats,

    /// Documentation cache
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Run the interactive OAuth flow
    Login,
    /// Remove stored credentials
    Logout,
    /// Show authentication status
    Status,
}

#[derive(Subcommand)]
enum MessagesAction {
    /// List messages
    List {
        /// Gmail search query (e.g. "is:unread from:alice@example.com")
        #[arg(long)]
        query: Option<String>,

        /// Maximum number of results
        #[arg(long)]
        max: Option<u32>,
    },
    /// Show a message
    Get {
        /// Message ID
        message_id: String,
    },
    /// Send an email
    Send {
        /// Recipient addresses
        #[arg(long, required = true)]
        to: Vec<String>,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,

        /// Optional HTML body (sent as multipart/alternative)
        #[arg(long)]
        html_body: Option<String>,

        #[arg(long)]
        cc: Vec<String>,

        #[arg(long)]
        bcc: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DraftsAction {
    /// List drafts
    List {
        #[arg(long)]
        max: Option<u32>,
    },
    /// Create a draft
    Create {
        #[arg(long, required = true)]
        to: Vec<String>,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,
    },
    /// Send an existing draft
    Send {
        /// Draft ID
        draft_id: String,
    },
}

#[derive(Subcommand)]
enum BatchAction {
    /// Remove the UNREAD label from messages
    MarkRead {
        /// Message IDs
        #[arg(required = true)]
        message_ids: Vec<String>,
    },
    /// Remove the INBOX label from messages
    Archive {
        /// Message IDs
        #[arg(required = true)]
        message_ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    /// Show cache status and live keys
    Status,
    /// Look up documentation for an operation
    Get {
        /// Operation name (e.g. "messages.send")
        operation: String,

        /// Optional context qualifier
        #[arg(long)]
        context: Option<String>,
    },
    /// Clear the cache
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}: {e}", format!("error[{}]", e.category()).red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::bootstrap()?;

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login => cli::auth_login(&app).await,
            AuthAction::Logout => cli::auth_logout(&app).await,
            AuthAction::Status => cli::auth_status(&app).await,
        },
        Commands::Messages { action } => match action {
            MessagesAction::List { query, max } => {
                cli::messages_list(&app, query.as_deref(), max).await
            }
            MessagesAction::Get { message_id } => cli::messages_get(&app, &message_id).await,
            MessagesAction::Send {
                to,
                subject,
                body,
                html_body,
                cc,
                bcc,
            } => {
                let cc = (!cc.is_empty()).then_some(cc);
                let bcc = (!bcc.is_empty()).then_some(bcc);
                cli::messages_send(&app, to, subject, body, html_body, cc, bcc).await
            }
        },
        Commands::Drafts { action } => match action {
            DraftsAction::List { max } => cli::drafts_list(&app, max).await,
            DraftsAction::Create { to, subject, body } => {
                cli::drafts_create(&app, to, subject, body).await
            }
            DraftsAction::Send { draft_id } => cli::drafts_send(&app, &draft_id).await,
        },
        Commands::Batch { action } => match action {
            BatchAction::MarkRead { message_ids } => cli::batch_mark_read(&app, message_ids).await,
            BatchAction::Archive { message_ids } => cli::batch_archive(&app, message_ids).await,
        },
        Commands::Labels => cli::labels_list(&app).await,
        Commands::Thread { thread_id } => cli::threads_get(&app, &thread_id).await,
        Commands::Stats => cli::stats(&app).await,
        Commands::Docs { action } => match action {
            DocsAction::Status => cli::docs_status(&app).await,
            DocsAction::Get { operation, context } => {
                cli::docs_get(&app, &operation, context.as_deref()).await
            }
            DocsAction::Clear => cli::docs_clear(&app).await,
        },
    }
}
