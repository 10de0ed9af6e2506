//! Constants used throughout the download module.

/// Default number of concurrent section fetches per download.
pub const DEFAULT_WORKERS: usize = 10;

/// Default section size in bytes when splitting by size (1 MiB).
pub const DEFAULT_SECTION_SIZE: u64 = 1024 * 1024;

/// Timeout in seconds for establishing an HTTP connection.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Timeout in seconds for completing an HTTP request, including the body.
pub const READ_TIMEOUT_SECS: u64 = 300;
