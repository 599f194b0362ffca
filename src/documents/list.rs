//! Document list view state

use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use super::DocumentRow;
use crate::client::{DashboardApi, DocumentQuery};
use crate::inflight::InFlight;
use crate::notify::Notifier;
use crate::session::Session;

/// Interactive yes/no before destructive actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything (`--yes`)
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// What happened to a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the view state
    Applied,
    /// The request failed; the last-good state is kept
    Failed,
    /// The view was torn down; the response was dropped
    Discarded,
}

/// Table of uploaded documents
#[derive(Debug)]
pub struct DocumentList {
    query: DocumentQuery,
    rows: Vec<DocumentRow>,
    loading: bool,
    last_error: Option<String>,
    downloading: Option<String>,
    cancel: CancellationToken,
}

impl DocumentList {
    pub fn new(query: DocumentQuery) -> Self {
        Self {
            query,
            rows: Vec::new(),
            loading: true,
            last_error: None,
            downloading: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn rows(&self) -> &[DocumentRow] {
        &self.rows
    }

    pub fn query(&self) -> &DocumentQuery {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the row's download action is currently disabled
    pub fn is_downloading(&self, id: &str) -> bool {
        self.downloading.as_deref() == Some(id)
    }

    /// Handle that tears the view down from elsewhere
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop applying responses to this view
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Re-fetch the listing and replace the rows wholesale
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
                tracing::debug!("Document list torn down; dropping listing response");
                return FetchOutcome::Discarded;
            }
            result = api.list_documents(session, &self.query) => result,
        };
        self.loading = false;

        match result {
            Ok(documents) => {
                self.rows = documents.iter().map(DocumentRow::from).collect();
                self.last_error = None;
                tracing::debug!(count = self.rows.len(), "Loaded documents");
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching documents");
                self.last_error = Some(e.to_string());
                notifier.error("Failed to load documents.");
                FetchOutcome::Failed
            }
        }
    }

    /// Delete a document after confirmation; returns whether it was deleted
    pub async fn delete(
        &mut self,
        api: &dyn DashboardApi,
        session: &Session,
        notifier: &mut Notifier,
        confirm: &dyn Confirm,
        id: &str,
    ) -> bool {
        let name = self.display_name(id);
        if !confirm.confirm(&format!("Are you sure you want to delete \"{}\"?", name)) {
            tracing::debug!(document = %id, "Delete cancelled");
            return false;
        }

        match api.delete_document(session, id).await {
            Ok(()) => {
                tracing::info!(document = %id, "Deleted document");
                notifier.success("Document deleted successfully!");
                self.refresh(api, session, notifier).await;
                true
            }
            Err(e) => {
                tracing::warn!(document = %id, error = %e, "Delete failed");
                notifier.error("Delete failed. Please try again.");
                false
            }
        }
    }

    /// Fetch a document's bytes into `dest_dir`; returns the written path
    pub async fn download(
        &mut self,
        api: &dyn DashboardApi,
        session: &Session,
        notifier: &mut Notifier,
        id: &str,
        dest_dir: &Path,
    ) -> Option<PathBuf> {
        let name = self.display_name(id);
        let downloading = InFlight::enter(&mut self.downloading, Some(id.to_string()));

        let result = match api.download_document(session, id).await {
            Ok(bytes) => save_download(dest_dir.to_path_buf(), name, bytes).await,
            Err(e) => Err(e.to_string()),
        };
        drop(downloading);

        match result {
            Ok(path) => {
                tracing::info!(document = %id, path = ?path, "Downloaded document");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(document = %id, error = %e, "Download failed");
                notifier.error("Download failed. Please try again.");
                None
            }
        }
    }

    fn display_name(&self, id: &str) -> String {
        self.rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// Stage the bytes in a temporary file next to the target, then move it into
/// place. The temporary file is removed on every failure path.
async fn save_download(
    dest_dir: PathBuf,
    name: String,
    bytes: Vec<u8>,
) -> Result<PathBuf, String> {
    tokio::task::spawn_blocking(move || write_staged(&dest_dir, &name, &bytes))
        .await
        .map_err(|e| e.to_string())?
}

fn write_staged(dest_dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, String> {
    let file_name = Path::new(name)
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| format!("Invalid file name: {}", name))?;
    let target = dest_dir.join(file_name);

    let mut staged = tempfile::NamedTempFile::new_in(dest_dir).map_err(|e| e.to_string())?;
    staged.write_all(bytes).map_err(|e| e.to_string())?;
    staged.flush().map_err(|e| e.to_string())?;
    staged.persist(&target).map_err(|e| e.error.to_string())?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document, FakeApi};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct Decline;

    impl Confirm for Decline {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    fn session() -> Session {
        Session::with_token("t1")
    }

    #[tokio::test]
    async fn test_refresh_maps_rows() {
        let api = FakeApi::with_documents(vec![
            document("d1", "faq.pdf", 1536, "completed"),
            document("d2", "manual.pdf", 0, "processing"),
        ]);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();

        assert!(list.is_loading());
        assert_eq!(
            list.refresh(&api, &session(), &mut notifier).await,
            FetchOutcome::Applied
        );
        assert!(!list.is_loading());
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.rows()[0].size, "1.5 KB");
        assert_eq!(list.rows()[1].status.label(), "Pending");
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_last_good_rows() {
        let api = FakeApi::with_documents(vec![document("d1", "faq.pdf", 10, "completed")]);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();
        list.refresh(&api, &session(), &mut notifier).await;

        api.fail_lists.store(true, Ordering::SeqCst);
        assert_eq!(
            list.refresh(&api, &session(), &mut notifier).await,
            FetchOutcome::Failed
        );
        assert_eq!(list.rows().len(), 1);
        assert!(list.last_error().is_some());
        assert_eq!(notifier.last().unwrap().message, "Failed to load documents.");
    }

    #[tokio::test]
    async fn test_refresh_without_token() {
        let api = FakeApi::default();
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();

        let outcome = list.refresh(&api, &Session::anonymous(), &mut notifier).await;
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(list.last_error(), Some("Access token not found"));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_delete_changes_nothing() {
        let api = FakeApi::with_documents(vec![document("d1", "faq.pdf", 10, "completed")]);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();
        list.refresh(&api, &session(), &mut notifier).await;

        let before = list.rows().to_vec();
        let calls_before = api.calls();

        let deleted = list
            .delete(&api, &session(), &mut notifier, &Decline, "d1")
            .await;

        assert!(!deleted);
        assert_eq!(list.rows(), before.as_slice());
        assert_eq!(api.calls(), calls_before);
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_delete_refetches() {
        let api = FakeApi::with_documents(vec![
            document("d1", "faq.pdf", 10, "completed"),
            document("d2", "pricing.xlsx", 20, "completed"),
        ]);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();
        list.refresh(&api, &session(), &mut notifier).await;

        let deleted = list
            .delete(&api, &session(), &mut notifier, &AlwaysConfirm, "d1")
            .await;

        assert!(deleted);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(list.rows().len(), 1);
        assert_eq!(list.rows()[0].id, "d2");
        assert_eq!(
            notifier.last().unwrap().message,
            "Document deleted successfully!"
        );
    }

    #[tokio::test]
    async fn test_failed_delete_is_not_optimistic() {
        let api = FakeApi::with_documents(vec![document("d1", "faq.pdf", 10, "completed")]);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();
        list.refresh(&api, &session(), &mut notifier).await;

        api.fail_deletes.store(true, Ordering::SeqCst);
        let deleted = list
            .delete(&api, &session(), &mut notifier, &AlwaysConfirm, "d1")
            .await;

        assert!(!deleted);
        assert_eq!(list.rows().len(), 1);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            notifier.last().unwrap().message,
            "Delete failed. Please try again."
        );
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let dir = tempdir().unwrap();
        let api = FakeApi::with_documents(vec![document("d1", "faq.pdf", 5, "completed")]);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();
        list.refresh(&api, &session(), &mut notifier).await;

        let path = list
            .download(&api, &session(), &mut notifier, "d1", dir.path())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("faq.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes-of-d1");
        assert!(!list.is_downloading("d1"));
        // Only the target remains; the staging file is gone
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_download_failure_cleans_up() {
        let dir = tempdir().unwrap();
        let api = FakeApi::default();
        api.fail_downloads.store(true, Ordering::SeqCst);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();

        let path = list
            .download(&api, &session(), &mut notifier, "d9", dir.path())
            .await;

        assert!(path.is_none());
        assert!(!list.is_downloading("d9"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(
            notifier.last().unwrap().message,
            "Download failed. Please try again."
        );
    }

    #[tokio::test]
    async fn test_cancelled_download_reenables_row() {
        let dir = tempdir().unwrap();
        let api = FakeApi::with_documents(vec![document("d1", "faq.pdf", 5, "completed")]);
        api.download_delay_ms.store(500, Ordering::SeqCst);
        let mut list = DocumentList::new(DocumentQuery::default());
        let mut notifier = Notifier::new();
        list.refresh(&api, &session(), &mut notifier).await;

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            list.download(&api, &session(), &mut notifier, "d1", dir.path()),
        )
        .await
        .is_err();

        assert!(timed_out);
        assert!(!list.is_downloading("d1"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        api.download_delay_ms.store(0, Ordering::SeqCst);
        let path = list
            .download(&api, &session(), &mut notifier, "d1", dir.path())
            .await;
        assert_eq!(path, Some(dir.path().join("faq.pdf")));
    }

    #[tokio::test]
    async fn test_save_download_strips_directories() {
        let dir = tempdir().unwrap();
        let path = save_download(
            dir.path().to_path_buf(),
            "../../etc/passwd".to_string(),
            b"x".to_vec(),
        )
        .await
        .unwrap();
        assert_eq!(path, dir.path().join("passwd"));
    }

    #[tokio::test]
    async fn test_teardown_discards_late_response() {
        let api = Arc::new(FakeApi::with_documents(vec![document(
            "d1", "faq.pdf", 10, "completed",
        )]));
        api.list_delay_ms.store(200, Ordering::SeqCst);

        let mut list = DocumentList::new(DocumentQuery::default());
        let handle = list.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            handle.cancel();
        });

        let mut notifier = Notifier::new();
        let outcome = list.refresh(api.as_ref(), &session(), &mut notifier).await;

        assert_eq!(outcome, FetchOutcome::Discarded);
        assert!(list.rows().is_empty());

        // Torn-down views never fetch again
        assert_eq!(
            list.refresh(api.as_ref(), &session(), &mut notifier).await,
            FetchOutcome::Discarded
        );
    }
}
