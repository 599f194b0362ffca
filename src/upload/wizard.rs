//! Upload wizard state machine
//!
//! `Selecting -> Reviewing -> Done`, with `processing` set while a batch is in
//! flight. A batch issues one request per pending file, all of them before any
//! is awaited, and waits for every one to settle.

use futures_util::future::join_all;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::PendingFile;
use crate::client::{ClientError, DashboardApi};
use crate::inflight::InFlight;
use crate::notify::Notifier;
use crate::session::Session;

/// Delay before a closed wizard forgets its state
pub const RESET_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Selecting,
    Reviewing,
    Done,
}

impl WizardStep {
    /// 1-based position shown in the step indicator
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Selecting => 1,
            WizardStep::Reviewing => 2,
            WizardStep::Done => 3,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Add at least one file before continuing")]
    NoFiles,

    #[error("Not available while {actual:?} (needs {expected:?})")]
    InvalidStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("An upload is already in progress")]
    Busy,
}

/// Per-file outcome of one submitted batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<(String, ClientError)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Client-side state of the upload dialog
#[derive(Debug)]
pub struct UploadWizard {
    step: WizardStep,
    pending: Vec<PendingFile>,
    processing: bool,
}

impl Default for UploadWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Selecting,
            pending: Vec::new(),
            processing: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn can_proceed_to_review(&self) -> bool {
        self.step == WizardStep::Selecting && !self.pending.is_empty()
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Append files to the pending list; no de-duplication, no validation
    pub fn add_files(
        &mut self,
        files: impl IntoIterator<Item = PendingFile>,
    ) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Selecting)?;
        self.pending.extend(files);
        Ok(())
    }

    /// Remove exactly one pending file; returns whether it was present
    pub fn remove_file(&mut self, id: Uuid) -> bool {
        if self.step != WizardStep::Selecting {
            return false;
        }
        let before = self.pending.len();
        self.pending.retain(|f| f.id != id);
        self.pending.len() != before
    }

    /// Selecting -> Reviewing
    pub fn next(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Selecting)?;
        if self.pending.is_empty() {
            return Err(WizardError::NoFiles);
        }
        self.step = WizardStep::Reviewing;
        Ok(())
    }

    /// Reviewing -> Selecting, pending list untouched
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Reviewing)?;
        if self.processing {
            return Err(WizardError::Busy);
        }
        self.step = WizardStep::Selecting;
        Ok(())
    }

    /// Upload every pending file concurrently and wait for all of them.
    ///
    /// On full success the list is cleared and the wizard is `Done`. Otherwise
    /// it stays in `Reviewing` holding only the files that failed.
    pub async fn submit(
        &mut self,
        api: &dyn DashboardApi,
        session: &Session,
        notifier: &mut Notifier,
    ) -> Result<BatchReport, WizardError> {
        self.expect_step(WizardStep::Reviewing)?;
        if self.processing {
            return Err(WizardError::Busy);
        }

        if let Err(e) = session.bearer() {
            tracing::warn!("Upload attempted without an access token");
            notifier.error("Upload failed. Please try again.");
            return Ok(BatchReport {
                uploaded: Vec::new(),
                failed: self
                    .pending
                    .iter()
                    .map(|f| (f.name.clone(), e.clone()))
                    .collect(),
            });
        }

        tracing::info!(files = self.pending.len(), "Uploading batch");

        let processing = InFlight::enter(&mut self.processing, true);
        let results = join_all(self.pending.iter().map(|file| async move {
            let result = api.upload_document(session, file).await;
            (file.id, file.name.clone(), result)
        }))
        .await;
        drop(processing);

        let mut report = BatchReport::default();
        let mut failed_ids = Vec::new();
        for (id, name, result) in results {
            match result {
                Ok(()) => report.uploaded.push(name),
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Upload failed");
                    failed_ids.push(id);
                    report.failed.push((name, e));
                }
            }
        }

        if report.is_complete() {
            self.pending.clear();
            self.step = WizardStep::Done;
            notifier.success("Files uploaded successfully!");
        } else {
            self.pending.retain(|f| failed_ids.contains(&f.id));
            let names: Vec<&str> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
            notifier.error(format!(
                "Upload failed for {} of {} file(s): {}. Please try again.",
                report.failed.len(),
                report.failed.len() + report.uploaded.len(),
                names.join(", ")
            ));
        }

        Ok(report)
    }

    /// Close the dialog; state resets once the close transition is over
    pub async fn close(&mut self) {
        tokio::time::sleep(RESET_DELAY).await;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.step = WizardStep::Selecting;
        self.pending.clear();
        self.processing = false;
    }
}
