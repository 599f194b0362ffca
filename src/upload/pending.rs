//! Files waiting to be uploaded

use std::path::Path;
use uuid::Uuid;

/// A user-selected file held in memory until submission
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Identity within the pending list; two selections of the same file differ
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

impl PendingFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Read a file from disk, named after its final path component
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, content))
    }
}
