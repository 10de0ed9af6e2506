//! On-disk staging for fetched section payloads.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::DownloadError;

/// Directory of section payload files for one download in progress.
///
/// Payloads are staged in a hidden directory next to the destination and the
/// whole directory is removed once the download finishes, whether it
/// succeeded or failed.
#[derive(Debug, Clone)]
pub struct SectionStore {
    root: PathBuf,
}

impl SectionStore {
    /// Creates the staging directory for `filename` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the directory cannot be created.
    pub async fn create(dir: &Path, filename: &str) -> Result<Self, DownloadError> {
        let root = dir.join(format!(".{filename}.sections"));
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| DownloadError::io(&root, e))?;
        debug!(root = %root.display(), "section store created");
        Ok(Self { root })
    }

    /// Path of the payload file for the given section ordinal.
    #[must_use]
    pub fn section_path(&self, ordinal: usize) -> PathBuf {
        self.root.join(format!("section-{ordinal}.tmp"))
    }

    /// Writes a section payload, replacing any previous payload for the ordinal.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the payload file cannot be written.
    pub async fn write(&self, ordinal: usize, payload: &[u8]) -> Result<(), DownloadError> {
        let path = self.section_path(ordinal);
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| DownloadError::io(&path, e))
    }

    /// Reads a section payload back into memory.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the payload file cannot be read.
    pub async fn read(&self, ordinal: usize) -> Result<Vec<u8>, DownloadError> {
        let path = self.section_path(ordinal);
        tokio::fs::read(&path)
            .await
            .map_err(|e| DownloadError::io(&path, e))
    }

    /// Deletes a section payload once it has been merged.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the payload file cannot be removed.
    pub async fn delete(&self, ordinal: usize) -> Result<(), DownloadError> {
        let path = self.section_path(ordinal);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DownloadError::io(&path, e))
    }

    /// Removes the staging directory and anything left inside it.
    ///
    /// A missing directory is not an error: cleanup runs on both success and
    /// failure paths and must be safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the directory exists but cannot be
    /// removed.
    pub async fn remove(&self) -> Result<(), DownloadError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DownloadError::io(&self.root, e)),
        }
    }

    /// Root of the staging directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
