//! Dashboard composition
//!
//! Owns the session, the notifier and the three views, and threads the session
//! explicitly into every API call. The only cross-view coupling is that a
//! fully successful upload batch triggers one document list refresh.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::{self, AuthError};
use crate::chats::ChatLogViewer;
use crate::client::{ClientError, DashboardApi, Profile, SentinelClient};
use crate::config::Config;
use crate::documents::{Confirm, DocumentList, FetchOutcome};
use crate::notify::Notifier;
use crate::session::{FileTokenStore, Session, SessionError, TokenStore};
use crate::upload::{BatchReport, UploadWizard, WizardError};

/// Errors building a dashboard
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Failed to build API client: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct Dashboard {
    api: Arc<dyn DashboardApi>,
    store: Arc<dyn TokenStore>,
    session: Session,
    notifier: Notifier,
    documents: DocumentList,
    wizard: UploadWizard,
    chats: ChatLogViewer,
}

impl Dashboard {
    /// Wire a dashboard to the given backend and token store
    pub fn new(
        config: &Config,
        api: Arc<dyn DashboardApi>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, SessionError> {
        let session = Session::restore(store.as_ref())?;
        tracing::debug!(authenticated = session.is_authenticated(), "Restored session");

        Ok(Self {
            api,
            store,
            session,
            notifier: Notifier::new(),
            documents: DocumentList::new(config.documents.query()),
            wizard: UploadWizard::new(),
            chats: ChatLogViewer::new(config.chats.limit),
        })
    }

    /// Real HTTP client plus the file-backed token store from `config`
    pub fn from_config(config: &Config) -> Result<Self, DashboardError> {
        let api = Arc::new(SentinelClient::new(config.api.client_config())?);
        let store = Arc::new(FileTokenStore::new(&config.session.token_file));
        Ok(Self::new(config, api, store)?)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    pub fn wizard(&self) -> &UploadWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut UploadWizard {
        &mut self.wizard
    }

    pub fn chats(&self) -> &ChatLogViewer {
        &self.chats
    }

    pub fn chats_mut(&mut self) -> &mut ChatLogViewer {
        &mut self.chats
    }

    // ---- account ----

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.session = auth::login(
            self.api.as_ref(),
            self.store.as_ref(),
            &mut self.notifier,
            email,
            password,
        )
        .await?;
        Ok(())
    }

    pub async fn register(
        &mut self,
        tenant_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.session = auth::register(
            self.api.as_ref(),
            self.store.as_ref(),
            &mut self.notifier,
            self.session.clone(),
            tenant_name,
            email,
            password,
        )
        .await?;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        auth::logout(&mut self.session, self.store.as_ref(), &mut self.notifier)
    }

    pub async fn profile(&mut self) -> Option<Profile> {
        match self.api.profile(&self.session).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                self.notifier.error(e.to_string());
                None
            }
        }
    }

    pub async fn api_key(&mut self) -> Option<String> {
        match self.api.api_key(&self.session).await {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching API key");
                self.notifier.error("Failed to load API key.");
                None
            }
        }
    }

    // ---- documents ----

    pub async fn refresh_documents(&mut self) -> FetchOutcome {
        self.documents
            .refresh(self.api.as_ref(), &self.session, &mut self.notifier)
            .await
    }

    pub async fn delete_document(&mut self, confirm: &dyn Confirm, id: &str) -> bool {
        self.documents
            .delete(self.api.as_ref(), &self.session, &mut self.notifier, confirm, id)
            .await
    }

    pub async fn download_document(&mut self, id: &str, dest_dir: &Path) -> Option<PathBuf> {
        self.documents
            .download(self.api.as_ref(), &self.session, &mut self.notifier, id, dest_dir)
            .await
    }

    // ---- upload ----

    /// Submit the wizard's batch; a complete batch refreshes the document list once
    pub async fn process_upload(&mut self) -> Result<BatchReport, WizardError> {
        let report = self
            .wizard
            .submit(self.api.as_ref(), &self.session, &mut self.notifier)
            .await?;

        if report.is_complete() {
            self.refresh_documents().await;
        }
        Ok(report)
    }

    // ---- chats ----

    pub async fn refresh_chats(&mut self) -> FetchOutcome {
        self.chats
            .refresh(self.api.as_ref(), &self.session, &mut self.notifier)
            .await
    }

    /// Stop applying late responses to every view
    pub fn teardown(&self) {
        self.documents.teardown();
        self.chats.teardown();
    }
}
