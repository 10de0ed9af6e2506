//! Download orchestration: probe, plan, fetch, and merge.
//!
//! # Example
//!
//! ```no_run
//! use segfetch::{DownloadRequest, Downloader};
//!
//! # async fn run() -> Result<(), segfetch::DownloadError> {
//! let request = DownloadRequest::new("https://example.com/big.iso", ".", "big.iso")
//!     .with_workers(8);
//! let report = Downloader::new(request).download().await?;
//! println!("saved {} bytes to {}", report.bytes_written, report.path.display());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::HttpClient;
use super::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_SECTION_SIZE, DEFAULT_WORKERS, READ_TIMEOUT_SECS,
};
use super::error::DownloadError;
use super::fetch::fetch_sections;
use super::merge::merge_sections;
use super::plan::{SplitStrategy, plan_sections};
use super::storage::SectionStore;

/// Everything needed to download one resource to disk.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    url: String,
    dir: PathBuf,
    filename: String,
    workers: usize,
    section_size: u64,
    strategy: SplitStrategy,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
}

impl DownloadRequest {
    /// Creates a request with the default worker limit and split strategy.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        dir: impl Into<PathBuf>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            dir: dir.into(),
            filename: filename.into(),
            workers: DEFAULT_WORKERS,
            section_size: DEFAULT_SECTION_SIZE,
            strategy: SplitStrategy::default(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }

    /// Sets the maximum number of concurrent section fetches.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the section size used by [`SplitStrategy::SectionSize`].
    #[must_use]
    pub fn with_section_size(mut self, section_size: u64) -> Self {
        self.section_size = section_size;
        self
    }

    /// Sets how the resource is split into sections.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the HTTP connect and read timeouts, in seconds.
    #[must_use]
    pub fn with_timeouts(mut self, connect_secs: u64, read_secs: u64) -> Self {
        self.connect_timeout_secs = connect_secs;
        self.read_timeout_secs = read_secs;
        self
    }
}

/// Summary of a finished download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Where the merged file was written.
    pub path: PathBuf,
    /// Number of bytes in the merged file.
    pub bytes_written: u64,
    /// Number of sections the resource was split into.
    pub sections: usize,
    /// Highest number of section fetches that ran at the same time.
    pub peak_in_flight: usize,
}

/// Downloads one resource by fetching sections concurrently and merging them.
#[derive(Debug)]
pub struct Downloader {
    request: DownloadRequest,
    client: HttpClient,
}

impl Downloader {
    /// Creates a downloader with its own HTTP client, using the request's
    /// timeouts.
    #[must_use]
    pub fn new(request: DownloadRequest) -> Self {
        let client =
            HttpClient::with_timeouts(request.connect_timeout_secs, request.read_timeout_secs);
        Self::with_client(request, client)
    }

    /// Creates a downloader reusing an existing HTTP client.
    ///
    /// Clones of a client share one connection pool, so callers downloading
    /// several files should create one client and pass clones here. The
    /// client keeps its own timeouts; the request's are ignored.
    #[must_use]
    pub fn with_client(request: DownloadRequest, client: HttpClient) -> Self {
        Self { request, client }
    }

    /// Runs the download to completion.
    ///
    /// Probes the resource, splits it into sections, fetches them under the
    /// worker limit, and merges the payloads into the destination file. On
    /// failure nothing of the attempt remains on disk: section payloads, the
    /// staging file, and the store directory are all removed.
    ///
    /// # Errors
    ///
    /// Returns the first error of the pipeline: an invalid URL or worker
    /// limit, a failed probe, the lowest-ordinal section failure, or an IO
    /// error while staging or merging.
    #[instrument(skip(self), fields(url = %self.request.url, filename = %self.request.filename))]
    pub async fn download(self) -> Result<DownloadReport, DownloadError> {
        // Reject malformed URLs before any network traffic.
        if Url::parse(&self.request.url).is_err() {
            return Err(DownloadError::invalid_url(&self.request.url));
        }

        let resource = self.client.probe(&self.request.url).await?;
        info!(
            size = resource.size,
            accepts_ranges = resource.accepts_ranges,
            "starting download"
        );

        let sections = plan_sections(
            &resource,
            self.request.strategy,
            self.request.workers,
            self.request.section_size,
        )?;
        debug!(sections = sections.len(), "sections planned");

        let store = SectionStore::create(&self.request.dir, &self.request.filename).await?;

        let stats = match fetch_sections(
            &self.client,
            &self.request.url,
            &sections,
            self.request.workers,
            &store,
        )
        .await
        {
            Ok(stats) => stats,
            Err(e) => {
                remove_store(&store).await;
                return Err(e);
            }
        };

        let merged =
            merge_sections(&store, &sections, &self.request.dir, &self.request.filename).await;
        // The store goes away on success and failure alike.
        remove_store(&store).await;
        let (path, bytes_written) = merged?;

        if resource.size > 0 && bytes_written != resource.size {
            warn!(
                expected = resource.size,
                written = bytes_written,
                "merged file length differs from the probed size"
            );
        }

        info!(
            path = %path.display(),
            bytes = bytes_written,
            sections = sections.len(),
            peak_in_flight = stats.peak_in_flight(),
            "download complete"
        );

        Ok(DownloadReport {
            path,
            bytes_written,
            sections: sections.len(),
            peak_in_flight: stats.peak_in_flight(),
        })
    }
}

/// Removes the section store, logging instead of failing on cleanup errors.
async fn remove_store(store: &SectionStore) {
    if let Err(e) = store.remove().await {
        warn!(error = %e, "failed to remove the section store");
    }
}
