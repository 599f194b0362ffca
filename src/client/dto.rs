//! Data Transfer Objects
//!
//! Request and response bodies exchanged with the Sentinel API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest<'a> {
    pub tenant_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Registration body; some deployments log the new tenant in directly
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Tenant/user/role information for the signed-in account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub role: String,
    pub email: String,
    #[serde(default)]
    pub tenant_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiKeyResponse {
    pub api_key: String,
}

/// Error body shape used by the auth endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================
// DOCUMENT DTOs
// ============================================

/// Listing parameters for `GET /documents`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    pub limit: u32,
    pub offset: u32,
    pub status: String,
    pub sort_by: String,
    pub sort_order: String,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            status: "completed".to_string(),
            sort_by: "filename".to_string(),
            sort_order: "asc".to_string(),
        }
    }
}

/// A document as stored server-side
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiDocument {
    pub document_id: String,
    pub filename: String,
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub chunks_count: u32,
    #[serde(deserialize_with = "de_timestamp")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentListResponse {
    #[serde(default)]
    pub documents: Vec<ApiDocument>,
}

// ============================================
// CHAT LOG DTOs
// ============================================

/// One user message and the bot's reply to it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatLogEntry {
    pub id: String,
    pub user_identifier: String,
    pub user_message: String,
    pub bot_response: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChatLogsResponse {
    List(Vec<ChatLogEntry>),
    Wrapped { chatlogs: Vec<ChatLogEntry> },
}

impl ChatLogsResponse {
    pub fn into_entries(self) -> Vec<ChatLogEntry> {
        match self {
            ChatLogsResponse::List(entries) => entries,
            ChatLogsResponse::Wrapped { chatlogs } => chatlogs,
        }
    }
}

// ============================================
// Timestamps
// ============================================

/// Parse RFC 3339, falling back to a naive ISO-8601 timestamp taken as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
