//! Document Management
//!
//! The server-side set of uploaded training documents, as a table of display
//! rows with delete and download actions.
//!
//! The rows are always a pure function of the last successful listing: nothing
//! is edited locally, every mutation is followed by a full re-fetch.

mod format;
mod list;

pub use format::{format_bytes, format_upload_date};
pub use list::{AlwaysConfirm, Confirm, DocumentList, FetchOutcome};

use serde::Serialize;

use crate::client::ApiDocument;

/// Status badge shown for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DisplayStatus {
    Processed,
    Pending,
    Error,
}

impl DisplayStatus {
    /// Map the raw server status onto the three badges
    pub fn from_raw(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => DisplayStatus::Processed,
            "failed" | "error" => DisplayStatus::Error,
            _ => DisplayStatus::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Processed => "Processed",
            DisplayStatus::Pending => "Pending",
            DisplayStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub size: String,
    pub uploaded_on: String,
    pub status: DisplayStatus,
}

impl From<&ApiDocument> for DocumentRow {
    fn from(doc: &ApiDocument) -> Self {
        Self {
            id: doc.document_id.clone(),
            name: doc.filename.clone(),
            size: format_bytes(doc.file_size),
            uploaded_on: format_upload_date(doc.uploaded_at),
            status: DisplayStatus::from_raw(&doc.status),
        }
    }
}
