//! Sentinel REST API Client
//!
//! HTTP client for the Sentinel backend. One method per endpoint; every
//! authenticated call checks the session before anything goes on the wire.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use std::time::Duration;

use super::dto::{
    ApiDocument, ApiKeyResponse, ChatLogEntry, ChatLogsResponse, DocumentListResponse,
    DocumentQuery, ErrorBody, LoginRequest, LoginResponse, Profile, RegisterRequest,
    RegisterResponse,
};
use super::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::upload::PendingFile;

/// Default API host
pub const DEFAULT_API_BASE: &str = "https://api.nswebassistant.site";

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";

/// The operations the console performs against the backend
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse>;

    /// `POST /auth/register`
    async fn register(
        &self,
        tenant_name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<RegisterResponse>;

    /// `GET /auth/profile`
    async fn profile(&self, session: &Session) -> ClientResult<Profile>;

    /// `GET /auth/tenant/api-key`
    async fn api_key(&self, session: &Session) -> ClientResult<String>;

    /// `POST /upload` with the file as multipart field `file`
    async fn upload_document(&self, session: &Session, file: &PendingFile) -> ClientResult<()>;

    /// `GET /documents`
    async fn list_documents(
        &self,
        session: &Session,
        query: &DocumentQuery,
    ) -> ClientResult<Vec<ApiDocument>>;

    /// `DELETE /documents/{id}`
    async fn delete_document(&self, session: &Session, document_id: &str) -> ClientResult<()>;

    /// `GET /download/{id}`
    async fn download_document(&self, session: &Session, document_id: &str)
        -> ClientResult<Vec<u8>>;

    /// `GET /chatlogs?group_by=user_identifier`
    async fn list_chat_logs(&self, session: &Session, limit: u32)
        -> ClientResult<Vec<ChatLogEntry>>;
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. "https://api.nswebassistant.site"
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// reqwest-backed implementation of [`DashboardApi`]
pub struct SentinelClient {
    client: Client,
    base_url: String,
}

impl SentinelClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("sentinel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into `RequestFailed`, preferring the
    /// server's own `message` over the endpoint's fallback text.
    async fn failure(response: Response, fallback: &str) -> ClientError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text, fallback);

        tracing::warn!(status = status.as_u16(), %message, "API request failed");
        ClientError::RequestFailed(message)
    }

    async fn check(response: Response, fallback: &str) -> ClientResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::failure(response, fallback).await)
        }
    }
}

#[async_trait]
impl DashboardApi for SentinelClient {
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let url = self.url("/auth/login");
        tracing::debug!(%url, "POST login");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = Self::check(response, LOGIN_FAILED).await?;

        let body: LoginResponse = response.json().await?;
        match body.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(body),
            _ => Err(ClientError::request_failed(
                "Login failed: No access token received.",
            )),
        }
    }

    async fn register(
        &self,
        tenant_name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<RegisterResponse> {
        let url = self.url("/auth/register");
        tracing::debug!(%url, "POST register");

        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest {
                tenant_name,
                email,
                password,
            })
            .send()
            .await?;
        let response = Self::check(response, REGISTER_FAILED).await?;

        // An empty or non-JSON success body is still a successful registration
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    async fn profile(&self, session: &Session) -> ClientResult<Profile> {
        let token = session.bearer()?;
        let url = self.url("/auth/profile");
        tracing::debug!(%url, "GET profile");

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check(response, "Failed to fetch profile").await?;
        Ok(response.json().await?)
    }

    async fn api_key(&self, session: &Session) -> ClientResult<String> {
        let token = session.bearer()?;
        let url = self.url("/auth/tenant/api-key");
        tracing::debug!(%url, "GET api key");

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check(response, "Failed to fetch API key").await?;
        let body: ApiKeyResponse = response.json().await?;
        Ok(body.api_key)
    }

    async fn upload_document(&self, session: &Session, file: &PendingFile) -> ClientResult<()> {
        let token = session.bearer()?;
        let url = self.url("/upload");
        tracing::debug!(%url, file = %file.name, size = file.size, "POST upload");

        let part = multipart::Part::bytes(file.content.to_vec()).file_name(file.name.clone());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::check(response, "Upload failed").await?;
        Ok(())
    }

    async fn list_documents(
        &self,
        session: &Session,
        query: &DocumentQuery,
    ) -> ClientResult<Vec<ApiDocument>> {
        let token = session.bearer()?;
        let url = self.url("/documents");
        tracing::debug!(%url, ?query, "GET documents");

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check(response, "Failed to fetch documents").await?;
        let body: DocumentListResponse = response.json().await?;
        Ok(body.documents)
    }

    async fn delete_document(&self, session: &Session, document_id: &str) -> ClientResult<()> {
        let token = session.bearer()?;
        let url = self.url(&format!("/documents/{}", urlencoding::encode(document_id)));
        tracing::debug!(%url, "DELETE document");

        let response = self.client.delete(&url).bearer_auth(token).send().await?;
        Self::check(response, "Delete failed").await?;
        Ok(())
    }

    async fn download_document(
        &self,
        session: &Session,
        document_id: &str,
    ) -> ClientResult<Vec<u8>> {
        let token = session.bearer()?;
        let url = self.url(&format!("/download/{}", urlencoding::encode(document_id)));
        tracing::debug!(%url, "GET download");

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check(response, "Download failed").await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn list_chat_logs(
        &self,
        session: &Session,
        limit: u32,
    ) -> ClientResult<Vec<ChatLogEntry>> {
        let token = session.bearer()?;
        let url = self.url("/chatlogs");
        tracing::debug!(%url, limit, "GET chat logs");

        let response = self
            .client
            .get(&url)
            .query(&[("group_by", "user_identifier".to_string()), ("limit", limit.to_string())])
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check(response, "Failed to fetch chat logs").await?;
        let body: ChatLogsResponse = response.json().await?;
        Ok(body.into_entries())
    }
}

/// Body `message` when the body is JSON carrying one, else `fallback`
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.nswebassistant.site");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = SentinelClient::new(ClientConfig {
            base_url: "http://localhost:9000/".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
        assert_eq!(client.url("/upload"), "http://localhost:9000/upload");
    }

    #[test]
    fn test_error_message_prefers_body() {
        assert_eq!(
            error_message(r#"{"message":"Invalid credentials"}"#, LOGIN_FAILED),
            "Invalid credentials"
        );
        assert_eq!(error_message(r#"{"detail":"nope"}"#, LOGIN_FAILED), LOGIN_FAILED);
        assert_eq!(error_message(r#"{"message":""}"#, REGISTER_FAILED), REGISTER_FAILED);
        assert_eq!(
            error_message("<html>502</html>", "Failed to fetch documents"),
            "Failed to fetch documents"
        );
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        // Nothing listens on this port; a request would fail with RequestFailed.
        let client = SentinelClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap();
        let session = Session::anonymous();

        assert_eq!(
            client.list_documents(&session, &DocumentQuery::default()).await,
            Err(ClientError::MissingCredential)
        );
        assert_eq!(
            client.delete_document(&session, "d1").await,
            Err(ClientError::MissingCredential)
        );
        assert_eq!(
            client.list_chat_logs(&session, 100).await,
            Err(ClientError::MissingCredential)
        );
    }
}
