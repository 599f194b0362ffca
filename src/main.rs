//! Sentinel CLI
//!
//! Command-line front end for the Sentinel console:
//! - Sign in / out and inspect the account
//! - Upload, list, download and delete training documents
//! - Browse chat logs by visitor

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel::config::{generate_default_config, Config, LoggingConfig};
use sentinel::{
    AlwaysConfirm, Confirm, Dashboard, FetchOutcome, NotificationKind, PendingFile, Sender,
};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator console for the Sentinel chatbot service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/sentinel/config.toml or ./config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the access token
    Login {
        email: String,
        /// Password (prompted on stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create a tenant account
    Register {
        /// Organisation name
        tenant: String,
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Show the signed-in profile
    Whoami,

    /// Show the tenant API key
    ApiKey,

    /// Upload one or more documents
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Skip the review prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage uploaded documents
    Documents {
        #[command(subcommand)]
        action: Option<DocumentCommand>,
    },

    /// Browse chat logs
    Chats {
        #[command(subcommand)]
        action: Option<ChatCommand>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommand {
    /// List documents
    List,
    /// Delete a document
    Delete {
        id: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Download a document
    Download {
        id: String,
        /// Target directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ChatCommand {
    /// List conversations, most recent first
    List,
    /// Show one visitor's conversation
    Show { visitor: String },
}

/// Yes/no on the terminal
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        prompt_line(&format!("{} [y/N] ", prompt))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }
}

fn prompt_line(prompt: &str) -> std::io::Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("sentinel={}", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!(api = %config.api.base_url, "Sentinel CLI v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut dashboard = Dashboard::from_config(&config)?;
    let json = cli.format == "json";

    let ok = match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_line("Password: ")?,
            };
            dashboard.login(&email, &password).await.is_ok()
        }

        Commands::Register {
            tenant,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_line("Password: ")?,
            };
            dashboard.register(&tenant, &email, &password).await.is_ok()
        }

        Commands::Logout => dashboard.logout().is_ok(),

        Commands::Whoami => match dashboard.profile().await {
            Some(profile) if json => {
                println!("{}", serde_json::to_string_pretty(&profile)?);
                true
            }
            Some(profile) => {
                println!("Email:   {}", profile.email);
                println!("Role:    {}", profile.role);
                println!("User:    {}", profile.user_id);
                println!("Tenant:  {}", profile.tenant_id);
                if profile.tenant_ids.len() > 1 {
                    println!("Tenants: {}", profile.tenant_ids.join(", "));
                }
                true
            }
            None => false,
        },

        Commands::ApiKey => match dashboard.api_key().await {
            Some(key) => {
                println!("{}", key);
                true
            }
            None => false,
        },

        Commands::Upload { files, yes } => upload(&mut dashboard, files, yes).await?,

        Commands::Documents { action } => match action.unwrap_or(DocumentCommand::List) {
            DocumentCommand::List => {
                let outcome = dashboard.refresh_documents().await;
                print_documents(&dashboard, json)?;
                outcome == FetchOutcome::Applied
            }
            DocumentCommand::Delete { id, yes } => {
                // Load the table first so the prompt can name the document
                dashboard.refresh_documents().await;
                if yes {
                    dashboard.delete_document(&AlwaysConfirm, &id).await
                } else {
                    dashboard.delete_document(&StdinConfirm, &id).await
                }
            }
            DocumentCommand::Download { id, output } => {
                dashboard.refresh_documents().await;
                let dest = output.unwrap_or_else(|| PathBuf::from("."));
                match dashboard.download_document(&id, &dest).await {
                    Some(path) => {
                        println!("Saved {}", path.display());
                        true
                    }
                    None => false,
                }
            }
        },

        Commands::Chats { action } => {
            let outcome = dashboard.refresh_chats().await;
            match action.unwrap_or(ChatCommand::List) {
                ChatCommand::List => {
                    print_conversations(&dashboard, json)?;
                    outcome == FetchOutcome::Applied
                }
                ChatCommand::Show { visitor } => {
                    if outcome != FetchOutcome::Applied {
                        false
                    } else if !dashboard.chats_mut().select(&visitor) {
                        eprintln!("No conversation for visitor {}", visitor);
                        false
                    } else {
                        print_thread(&dashboard, json)?;
                        true
                    }
                }
            }
        }

        Commands::Config { .. } => true,
    };

    for notification in dashboard.notifier_mut().drain() {
        match notification.kind {
            NotificationKind::Success => println!("{}", notification),
            NotificationKind::Error => eprintln!("{}", notification),
        }
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn upload(dashboard: &mut Dashboard, paths: Vec<PathBuf>, yes: bool) -> anyhow::Result<bool> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match PendingFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                eprintln!("Cannot read {:?}: {}", path, e);
                return Ok(false);
            }
        }
    }

    let wizard = dashboard.wizard_mut();
    wizard.add_files(files)?;
    wizard.next()?;

    println!("Review ({} file(s)):", wizard.pending().len());
    for file in wizard.pending() {
        println!("  {:<40} {}", file.name, sentinel::format_bytes(file.size));
    }

    if !yes && !StdinConfirm.confirm("Upload these files?") {
        wizard.back()?;
        println!("Upload cancelled.");
        return Ok(true);
    }

    let report = dashboard.process_upload().await?;
    for (name, error) in &report.failed {
        eprintln!("  failed: {} ({})", name, error);
    }
    Ok(report.is_complete())
}

fn print_documents(dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    let rows = dashboard.documents().rows();

    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        if dashboard.documents().last_error().is_some() {
            println!("Documents could not be loaded.");
        } else {
            println!("No documents uploaded yet.");
            println!();
            println!("Upload your first document with:");
            println!("  sentinel upload ./faq.pdf");
        }
        return Ok(());
    }

    println!(
        "{:<38} {:<36} {:>10}  {:<12} {}",
        "ID", "Name", "Size", "Uploaded", "Status"
    );
    println!("{}", "-".repeat(110));
    for row in rows {
        println!(
            "{:<38} {:<36} {:>10}  {:<12} {}",
            row.id, row.name, row.size, row.uploaded_on, row.status
        );
    }
    Ok(())
}

fn print_conversations(dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    let conversations = dashboard.chats().conversations();

    if json {
        println!("{}", serde_json::to_string_pretty(conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }

    for conversation in conversations {
        println!(
            "{:<24} {:<12} {:>4} msg  {}",
            conversation.display_name,
            conversation.label,
            conversation.entries * 2,
            truncate(&conversation.last_message, 60)
        );
    }
    Ok(())
}

fn print_thread(dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    let thread = dashboard.chats().thread();

    if json {
        println!("{}", serde_json::to_string_pretty(&thread)?);
        return Ok(());
    }

    for message in &thread {
        let who = match message.sender {
            Sender::User => "Visitor",
            Sender::Bot => "Bot",
        };
        println!("[{:>8}] {:<7} {}", message.clock(), who, message.text);
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
