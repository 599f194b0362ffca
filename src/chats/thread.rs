//! Message thread rendering

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::client::ChatLogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One bubble in the thread
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadMessage {
    pub sender: Sender,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ThreadMessage {
    /// Local hour:minute label
    pub fn clock(&self) -> String {
        format_clock(self.at, &Local)
    }
}

pub fn format_clock<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%-I:%M %p").to_string()
}

/// Expand a visitor's entries into alternating user/bot messages, oldest first
pub fn render_thread(entries: &[ChatLogEntry]) -> Vec<ThreadMessage> {
    let mut ordered: Vec<&ChatLogEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.created_at);

    ordered
        .into_iter()
        .flat_map(|entry| {
            [
                ThreadMessage {
                    sender: Sender::User,
                    text: entry.user_message.clone(),
                    at: entry.created_at,
                },
                ThreadMessage {
                    sender: Sender::Bot,
                    text: entry.bot_response.clone(),
                    at: entry.updated_at,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::chat_entry;
    use chrono::Duration;

    #[test]
    fn test_thread_order() {
        let base = Utc.with_ymd_and_hms(2024, 7, 20, 11, 1, 0).unwrap();
        let entries = vec![
            chat_entry("3", "v", base + Duration::minutes(10)),
            chat_entry("1", "v", base),
            chat_entry("2", "v", base + Duration::minutes(1)),
        ];

        let thread = render_thread(&entries);
        assert_eq!(thread.len(), 6);

        let senders: Vec<Sender> = thread.iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::User, Sender::Bot, Sender::User, Sender::Bot, Sender::User, Sender::Bot]
        );
        assert_eq!(thread[0].text, "question 1");
        assert_eq!(thread[1].text, "answer 1");
        assert_eq!(thread[5].text, "answer 3");

        // User messages follow creation time
        let user_times: Vec<_> = thread
            .iter()
            .filter(|m| m.sender == Sender::User)
            .map(|m| m.at)
            .collect();
        assert!(user_times.windows(2).all(|w| w[0] <= w[1]));
        // Bot replies carry the entry's update time
        assert_eq!(thread[1].at, base + Duration::seconds(2));
    }

    #[test]
    fn test_equal_timestamps_keep_fetch_order() {
        let base = Utc.with_ymd_and_hms(2024, 7, 20, 11, 1, 0).unwrap();
        let entries = vec![chat_entry("a", "v", base), chat_entry("b", "v", base)];
        let thread = render_thread(&entries);
        assert_eq!(thread[0].text, "question a");
        assert_eq!(thread[2].text, "question b");
    }

    #[test]
    fn test_format_clock() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 20, 11, 2, 0).unwrap();
        assert_eq!(format_clock(ts, &Utc), "11:02 AM");
        let ts = Utc.with_ymd_and_hms(2024, 7, 20, 15, 45, 0).unwrap();
        assert_eq!(format_clock(ts, &Utc), "3:45 PM");
    }
}
