//! # Sentinel
//!
//! Operator console for an AI chatbot service: training documents, chat logs
//! and account access, all over the Sentinel HTTP API.
//!
//! ## Modules
//!
//! - [`client`]: Typed API client, one method per endpoint
//! - [`session`]: The bearer token and where it is persisted
//! - [`auth`]: Login, registration and logout
//! - [`upload`]: The document upload wizard
//! - [`documents`]: Document table with delete and download
//! - [`chats`]: Chat logs grouped into per-visitor conversations
//! - [`notify`]: Transient success/error notifications
//! - [`dashboard`]: Everything above, wired together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sentinel::{Config, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let mut dashboard = Dashboard::from_config(&config)?;
//!
//!     dashboard.login("ops@example.com", "password").await?;
//!     dashboard.refresh_documents().await;
//!
//!     for row in dashboard.documents().rows() {
//!         println!("{} {} {}", row.name, row.size, row.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chats;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod documents;
mod inflight;
pub mod notify;
pub mod session;
pub mod upload;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use client::{
    ApiDocument, ChatLogEntry, ClientConfig, ClientError, ClientResult, DashboardApi,
    DocumentQuery, Profile, SentinelClient,
};

pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};

pub use auth::AuthError;

pub use upload::{BatchReport, PendingFile, UploadWizard, WizardError, WizardStep};

pub use documents::{
    format_bytes, AlwaysConfirm, Confirm, DisplayStatus, DocumentList, DocumentRow, FetchOutcome,
};

pub use chats::{ChatLogViewer, ConversationSummary, Sender, ThreadMessage};

pub use notify::{Notification, NotificationKind, Notifier};

pub use dashboard::{Dashboard, DashboardError};

pub use config::{Config, ConfigError, LoggingConfig};
