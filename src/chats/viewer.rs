//! Chat log view state

use chrono::Utc;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

use super::{group_by_visitor, render_thread, summarize, ConversationSummary, ThreadMessage};
use crate::client::{ChatLogEntry, DashboardApi};
use crate::documents::FetchOutcome;
use crate::notify::Notifier;
use crate::session::Session;

/// Conversations grouped by visitor, plus the selected thread
#[derive(Debug)]
pub struct ChatLogViewer {
    limit: u32,
    groups: HashMap<String, Vec<ChatLogEntry>>,
    conversations: Vec<ConversationSummary>,
    selected: Option<String>,
    last_error: Option<String>,
    cancel: CancellationToken,
}

impl ChatLogViewer {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            groups: HashMap::new(),
            conversations: Vec::new(),
            selected: None,
            last_error: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Fetch every entry and rebuild the grouping from scratch
    pub async fn refresh(
        &mut self,
        api: &dyn DashboardApi,
        session: &Session,
        notifier: &mut Notifier,
    ) -> FetchOutcome {
        if self.cancel.is_cancelled() {
            return FetchOutcome::Discarded;
        }

        let cancel = self.cancel.clone();
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Chat viewer torn down; dropping chat log response");
                return FetchOutcome::Discarded;
            }
            result = api.list_chat_logs(session, self.limit) => result,
        };

        match result {
            Ok(entries) => {
                tracing::debug!(entries = entries.len(), "Loaded chat logs");
                self.groups = group_by_visitor(entries);
                self.conversations = summarize(&self.groups, Utc::now());
                self.last_error = None;

                let still_present = self
                    .selected
                    .as_ref()
                    .is_some_and(|v| self.groups.contains_key(v));
                if !still_present {
                    self.selected = self.conversations.first().map(|c| c.visitor_id.clone());
                }
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching chat logs");
                self.last_error = Some(e.to_string());
                notifier.error("Failed to load chat logs.");
                FetchOutcome::Failed
            }
        }
    }

    /// Switch the thread to another visitor; no network involved
    pub fn select(&mut self, visitor_id: &str) -> bool {
        if self.groups.contains_key(visitor_id) {
            self.selected = Some(visitor_id.to_string());
            true
        } else {
            false
        }
    }

    /// Messages of the selected visitor, oldest first
    pub fn thread(&self) -> Vec<ThreadMessage> {
        self.selected
            .as_ref()
            .and_then(|v| self.groups.get(v))
            .map(|entries| render_thread(entries))
            .unwrap_or_default()
    }
}
