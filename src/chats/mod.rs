//! Chat Log Viewer
//!
//! Chat log entries carry no conversation id of their own; conversations are a
//! client-side projection keyed by the visitor identifier.
//!
//! ## Data Flow
//!
//! 1. One request fetches every entry (capped server-side)
//! 2. [`group_by_visitor`] buckets them per visitor
//! 3. [`summarize`] derives the conversation list, most recent first
//! 4. [`render_thread`] expands the selected visitor's entries into messages

mod thread;
mod viewer;

pub use thread::{format_clock, render_thread, Sender, ThreadMessage};
pub use viewer::ChatLogViewer;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::client::ChatLogEntry;

/// Number of distinct pseudo-avatars
const AVATAR_COUNT: u64 = 50;

/// One row of the conversation list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub visitor_id: String,
    pub display_name: String,
    pub last_message: String,
    pub last_activity: DateTime<Utc>,
    pub label: String,
    pub avatar: u32,
    pub entries: usize,
}

impl ConversationSummary {
    pub fn avatar_url(&self) -> String {
        format!("https://i.pravatar.cc/150?img={}", self.avatar)
    }
}

/// Bucket entries by visitor; every entry lands in exactly one group
pub fn group_by_visitor(entries: Vec<ChatLogEntry>) -> HashMap<String, Vec<ChatLogEntry>> {
    let mut groups: HashMap<String, Vec<ChatLogEntry>> = HashMap::new();
    for entry in entries {
        groups
            .entry(entry.user_identifier.clone())
            .or_default()
            .push(entry);
    }
    groups
}

/// "Today", "Yesterday" or "<n> days ago", by whole days elapsed
pub fn relative_label(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - ts).num_days() {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d => format!("{} days ago", d),
    }
}

/// Deterministic avatar number in `1..=50` from the characters of `key`
pub fn avatar_index(key: &str) -> u32 {
    let checksum: u64 = key.chars().map(|c| c as u64).sum();
    (checksum % AVATAR_COUNT) as u32 + 1
}

/// Conversation list sorted by most recent activity, newest first
pub fn summarize(
    groups: &HashMap<String, Vec<ChatLogEntry>>,
    now: DateTime<Utc>,
) -> Vec<ConversationSummary> {
    let mut summaries: Vec<ConversationSummary> = groups
        .iter()
        .filter_map(|(visitor, entries)| {
            let latest = entries.iter().max_by_key(|e| e.created_at)?;
            let last_message = if latest.bot_response.is_empty() {
                latest.user_message.clone()
            } else {
                latest.bot_response.clone()
            };

            Some(ConversationSummary {
                visitor_id: visitor.clone(),
                display_name: format!("Visitor #{}", visitor),
                last_message,
                last_activity: latest.created_at,
                label: relative_label(latest.created_at, now),
                avatar: avatar_index(visitor),
                entries: entries.len(),
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.visitor_id.cmp(&b.visitor_id))
    });
    summaries
}
