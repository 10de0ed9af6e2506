//! Merging fetched sections into the destination file.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::error::DownloadError;
use super::plan::Section;
use super::storage::SectionStore;

/// Concatenates section payloads in ordinal order into the destination file.
///
/// The merged bytes go to a staging file next to the destination and are
/// renamed into place at the end, so the destination is never left truncated
/// by a failed merge. A pre-existing destination file is replaced. Each
/// section payload is deleted from the store as soon as it has been merged.
///
/// Returns the destination path and the number of bytes written.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] if a payload cannot be read or the
/// destination cannot be written. The staging file is removed on failure.
#[instrument(skip(store, sections), fields(filename = %filename, sections = sections.len()))]
pub async fn merge_sections(
    store: &SectionStore,
    sections: &[Section],
    dir: &Path,
    filename: &str,
) -> Result<(PathBuf, u64), DownloadError> {
    let staging = dir.join(format!(".{filename}.partial"));
    let destination = dir.join(filename);

    let bytes_written = match write_staging(store, sections, &staging).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&staging, &destination).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(DownloadError::io(&destination, e));
    }

    debug!(path = %destination.display(), bytes = bytes_written, "sections merged");
    Ok((destination, bytes_written))
}

/// Writes all section payloads into the staging file, in ordinal order.
async fn write_staging(
    store: &SectionStore,
    sections: &[Section],
    staging: &Path,
) -> Result<u64, DownloadError> {
    let file = File::create(staging)
        .await
        .map_err(|e| DownloadError::io(staging, e))?;
    let mut writer = BufWriter::new(file);
    let mut bytes_written = 0_u64;

    for section in sections {
        let payload = store.read(section.ordinal).await?;
        writer
            .write_all(&payload)
            .await
            .map_err(|e| DownloadError::io(staging, e))?;
        bytes_written += payload.len() as u64;
        store.delete(section.ordinal).await?;
        debug!(
            ordinal = section.ordinal,
            bytes = payload.len(),
            "section merged"
        );
    }

    // Everything must reach the file before the rename.
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(staging, e))?;

    Ok(bytes_written)
}
