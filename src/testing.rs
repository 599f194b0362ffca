//! In-memory [`DashboardApi`] used by the view tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::{
    ApiDocument, ChatLogEntry, ClientError, ClientResult, DashboardApi, DocumentQuery,
    LoginResponse, Profile, RegisterResponse,
};
use crate::session::Session;
use crate::upload::PendingFile;

#[derive(Default)]
pub struct FakeApi {
    pub documents: Mutex<Vec<ApiDocument>>,
    pub chat_logs: Mutex<Vec<ChatLogEntry>>,
    pub uploaded: Mutex<Vec<String>>,
    pub reject_uploads: Mutex<HashSet<String>>,
    pub login_token: Mutex<Option<String>>,

    pub list_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub in_flight_uploads: AtomicUsize,
    pub max_in_flight_uploads: AtomicUsize,

    pub fail_lists: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_downloads: AtomicBool,
    pub fail_chats: AtomicBool,
    pub list_delay_ms: AtomicU64,
    pub upload_delay_ms: AtomicU64,
    pub download_delay_ms: AtomicU64,
}

impl FakeApi {
    pub fn with_documents(documents: Vec<ApiDocument>) -> Self {
        let api = Self::default();
        *api.documents.lock().unwrap() = documents;
        api
    }

    pub fn with_chat_logs(entries: Vec<ChatLogEntry>) -> Self {
        let api = Self::default();
        *api.chat_logs.lock().unwrap() = entries;
        api
    }

    pub fn reject_upload(&self, name: &str) {
        self.reject_uploads.lock().unwrap().insert(name.to_string());
    }

    /// Every authenticated request that reached the "wire"
    pub fn calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.delete_calls.load(Ordering::SeqCst)
            + self.download_calls.load(Ordering::SeqCst)
            + self.upload_calls.load(Ordering::SeqCst)
            + self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        if email.is_empty() || password != "secret" {
            return Err(ClientError::request_failed("Invalid credentials"));
        }
        Ok(LoginResponse {
            access_token: self.login_token.lock().unwrap().clone(),
        })
    }

    async fn register(
        &self,
        _tenant_name: &str,
        email: &str,
        _password: &str,
    ) -> ClientResult<RegisterResponse> {
        if email.is_empty() {
            return Err(ClientError::request_failed("Email is required"));
        }
        Ok(RegisterResponse {
            access_token: self.login_token.lock().unwrap().clone(),
            message: None,
        })
    }

    async fn profile(&self, session: &Session) -> ClientResult<Profile> {
        session.bearer()?;
        Ok(Profile {
            user_id: "u1".to_string(),
            tenant_id: "t-acme".to_string(),
            role: "admin".to_string(),
            email: "ops@acme.io".to_string(),
            tenant_ids: vec!["t-acme".to_string()],
        })
    }

    async fn api_key(&self, session: &Session) -> ClientResult<String> {
        session.bearer()?;
        Ok("sk-test".to_string())
    }

    async fn upload_document(&self, session: &Session, file: &PendingFile) -> ClientResult<()> {
        session.bearer()?;
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        let in_flight = self.in_flight_uploads.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight_uploads
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = self.upload_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.in_flight_uploads.fetch_sub(1, Ordering::SeqCst);

        if self.reject_uploads.lock().unwrap().contains(&file.name) {
            return Err(ClientError::request_failed("Upload failed (500)"));
        }
        self.uploaded.lock().unwrap().push(file.name.clone());
        Ok(())
    }

    async fn list_documents(
        &self,
        session: &Session,
        _query: &DocumentQuery,
    ) -> ClientResult<Vec<ApiDocument>> {
        session.bearer()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ClientError::request_failed("Failed to fetch documents"));
        }
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn delete_document(&self, session: &Session, document_id: &str) -> ClientResult<()> {
        session.bearer()?;
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ClientError::request_failed("Delete failed"));
        }
        self.documents
            .lock()
            .unwrap()
            .retain(|d| d.document_id != document_id);
        Ok(())
    }

    async fn download_document(
        &self,
        session: &Session,
        document_id: &str,
    ) -> ClientResult<Vec<u8>> {
        session.bearer()?;
        self.download_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.download_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(ClientError::request_failed("Download failed"));
        }
        Ok(format!("bytes-of-{}", document_id).into_bytes())
    }

    async fn list_chat_logs(
        &self,
        session: &Session,
        limit: u32,
    ) -> ClientResult<Vec<ChatLogEntry>> {
        session.bearer()?;
        self.chat_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_chats.load(Ordering::SeqCst) {
            return Err(ClientError::request_failed("Failed to fetch chat logs"));
        }
        let entries = self.chat_logs.lock().unwrap();
        Ok(entries.iter().take(limit as usize).cloned().collect())
    }
}

pub fn document(id: &str, name: &str, size: u64, status: &str) -> ApiDocument {
    ApiDocument {
        document_id: id.to_string(),
        filename: name.to_string(),
        file_size: size,
        mime_type: None,
        status: status.to_string(),
        chunks_count: 0,
        uploaded_at: Utc.with_ymd_and_hms(2024, 7, 15, 9, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub fn chat_entry(id: &str, visitor: &str, created_at: DateTime<Utc>) -> ChatLogEntry {
    ChatLogEntry {
        id: id.to_string(),
        user_identifier: visitor.to_string(),
        user_message: format!("question {}", id),
        bot_response: format!("answer {}", id),
        created_at,
        updated_at: created_at + chrono::Duration::seconds(2),
    }
}
