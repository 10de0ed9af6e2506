//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while probing, fetching, or assembling a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// A network request failed (connection refused, DNS failure, etc.).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that was being requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// A request exceeded the configured timeout.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered the metadata probe with a non-success status.
    #[error("HTTP {status} probing {url}")]
    HttpStatus {
        /// The URL that was probed.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The server answered a section request with a non-success status.
    #[error("HTTP {status} fetching section {ordinal} of {url}")]
    SectionStatus {
        /// The URL the section was requested from.
        url: String,
        /// Position of the failed section in the download plan.
        ordinal: usize,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The given URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The malformed URL.
        url: String,
    },

    /// The worker limit is outside the accepted range.
    #[error("invalid worker limit {value}: must be at least 1")]
    InvalidWorkers {
        /// The rejected value.
        value: usize,
    },

    /// The section size is outside the accepted range.
    #[error("invalid section size {value}: must be at least 1 byte")]
    InvalidSectionSize {
        /// The rejected value.
        value: u64,
    },

    /// A filesystem operation failed.
    #[error("IO error at {}: {}", .path.display(), .source)]
    Io {
        /// The path the operation was acting on.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The concurrency semaphore was closed while tasks were waiting.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,

    /// A spawned section task panicked or was cancelled.
    #[error("section task failed: {source}")]
    Join {
        /// The join error from the runtime.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl DownloadError {
    /// Creates a network error for the given URL.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error for the given URL.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error for a failed probe.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an HTTP status error for a failed section fetch.
    pub fn section_status(url: impl Into<String>, ordinal: usize, status: u16) -> Self {
        Self::SectionStatus {
            url: url.into(),
            ordinal,
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error tagged with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No From<reqwest::Error> or From<std::io::Error> impls: the variants need
// context (url, ordinal, path) that the source errors alone cannot supply.
// The helper constructors are the conversion points instead.
