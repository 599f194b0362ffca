//! Document Upload
//!
//! A three-step wizard: pick files, review them, submit them as one batch of
//! independent uploads.

mod pending;
mod wizard;

pub use pending::PendingFile;
pub use wizard::{BatchReport, UploadWizard, WizardError, WizardStep, RESET_DELAY};
