//! Segmented HTTP downloader.
//!
//! Fetches a file in concurrent byte-range sections and reassembles them
//! into a byte-exact copy on disk. Servers that do not advertise range
//! support, or that do not report a size, are downloaded in one piece
//! through the same pipeline.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;

#[cfg(test)]
pub mod test_support;

pub use download::{
    DEFAULT_SECTION_SIZE, DEFAULT_WORKERS, DownloadError, DownloadReport, DownloadRequest,
    Downloader, HttpClient, ResourceInfo, Section, SplitStrategy, filename_from_url,
};
