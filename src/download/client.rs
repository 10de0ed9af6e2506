//! HTTP client: resource probing and section fetching.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::plan::Section;

/// What a metadata probe learned about a remote resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceInfo {
    /// Size in bytes, or zero when the server did not report one.
    pub size: u64,
    /// Whether the server advertises byte-range requests.
    pub accepts_ranges: bool,
}

/// HTTP client for probing resources and fetching sections.
///
/// Cloning is cheap and clones share the underlying connection pool, so
/// callers downloading several files should create one client and clone it.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with the default connect and read timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised. The builder receives
    /// only static configuration, so this does not happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit connect and read timeouts, in seconds.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised. The builder receives
    /// only static configuration, so this does not happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_secs: u64, read_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_secs))
            .timeout(Duration::from_secs(read_secs))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Probes a resource with a metadata-only request.
    ///
    /// Returns the reported content length (zero when the server does not
    /// report one) and whether the server advertises byte-range support.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Timeout`] or [`DownloadError::Network`] if
    /// the request fails, and [`DownloadError::HttpStatus`] if the server
    /// answers with a non-success status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn probe(&self, url: &str) -> Result<ResourceInfo, DownloadError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let accepts_ranges = response
            .headers()
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("bytes"));

        debug!(size, accepts_ranges, "resource probed");
        Ok(ResourceInfo {
            size,
            accepts_ranges,
        })
    }

    /// Fetches one section of a resource, returning its payload in memory.
    ///
    /// Ranged sections send a `Range` header for their byte range; unranged
    /// sections request the whole resource.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Timeout`] or [`DownloadError::Network`] if
    /// the request fails, and [`DownloadError::SectionStatus`] if the server
    /// answers with a non-success status.
    #[instrument(skip(self, section), fields(url = %url, ordinal = section.ordinal))]
    pub async fn fetch_section(
        &self,
        url: &str,
        section: &Section,
    ) -> Result<Bytes, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(range) = &section.range {
            request = request.header(RANGE, range.header_value());
        }

        let response = request.send().await.map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::section_status(
                url,
                section.ordinal,
                status.as_u16(),
            ));
        }
        if section.range.is_some() && status != StatusCode::PARTIAL_CONTENT {
            warn!(status = status.as_u16(), "expected 206 for a ranged request");
        }

        let payload = response.bytes().await.map_err(|e| request_error(url, e))?;

        if let Some(range) = &section.range
            && payload.len() as u64 != range.byte_count()
        {
            warn!(
                expected = range.byte_count(),
                received = payload.len(),
                "section payload length differs from the requested range"
            );
        }

        debug!(bytes = payload.len(), "section fetched");
        Ok(payload)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a transport failure to a timeout or network error for `url`.
fn request_error(url: &str, source: reqwest::Error) -> DownloadError {
    if source.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::network(url, source)
    }
}
