//! Segmented downloading: probe a resource, split it into byte-range
//! sections, fetch them concurrently, and merge the payloads into one file.
//!
//! [`Downloader`] drives the whole pipeline. The stages are also usable on
//! their own through [`HttpClient`], [`plan_sections`], [`fetch_sections`],
//! and [`merge_sections`].

mod client;
mod constants;
mod engine;
mod error;
mod fetch;
mod filename;
mod merge;
mod plan;
mod storage;

pub use client::{HttpClient, ResourceInfo};
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_SECTION_SIZE, DEFAULT_WORKERS, READ_TIMEOUT_SECS,
};
pub use engine::{DownloadReport, DownloadRequest, Downloader};
pub use error::DownloadError;
pub use fetch::{FetchStats, fetch_sections};
pub use filename::{filename_from_url, sanitize_filename};
pub use merge::merge_sections;
pub use plan::{ByteRange, Section, SplitStrategy, plan_sections};
pub use storage::SectionStore;
