//! Concurrent section fetching under a worker limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::client::HttpClient;
use super::error::DownloadError;
use super::plan::Section;
use super::storage::SectionStore;

/// Counters collected while fetching sections.
#[derive(Debug, Default)]
pub struct FetchStats {
    fetched: AtomicUsize,
    skipped: AtomicUsize,
    bytes_fetched: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FetchStats {
    /// Creates a zeroed set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sections fetched and written to the store.
    #[must_use]
    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::SeqCst)
    }

    /// Number of sections that started but were abandoned after a failure.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Total payload bytes written to the store.
    #[must_use]
    pub fn bytes_fetched(&self) -> u64 {
        self.bytes_fetched.load(Ordering::SeqCst)
    }

    /// Highest number of section fetches that ran at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record_fetched(&self, bytes: u64) {
        self.fetched.fetch_add(1, Ordering::SeqCst);
        self.bytes_fetched.fetch_add(bytes, Ordering::SeqCst);
    }

    fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }
}

/// RAII guard tracking how many section fetches are in flight.
struct FlightGuard<'a> {
    stats: &'a FetchStats,
}

impl<'a> FlightGuard<'a> {
    fn enter(stats: &'a FetchStats) -> Self {
        let current = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        Self { stats }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fetches all sections concurrently, writing each payload to the store.
///
/// At most `workers` requests run at once. The first failure aborts the
/// download: sections not yet admitted are abandoned, sections already in
/// flight are drained with their payloads discarded, and the function
/// returns only once every spawned task has finished. When several sections
/// fail, the error of the lowest ordinal is returned.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidWorkers`] if `workers` is zero, otherwise
/// the failure of the lowest-ordinal section that did not complete.
#[instrument(skip(client, sections, store), fields(url = %url, sections = sections.len(), workers))]
pub async fn fetch_sections(
    client: &HttpClient,
    url: &str,
    sections: &[Section],
    workers: usize,
    store: &SectionStore,
) -> Result<FetchStats, DownloadError> {
    if workers == 0 {
        return Err(DownloadError::InvalidWorkers { value: workers });
    }

    let semaphore = Arc::new(Semaphore::new(workers));
    let abort = Arc::new(AtomicBool::new(false));
    let stats = Arc::new(FetchStats::new());

    let mut handles: Vec<JoinHandle<(usize, Result<(), DownloadError>)>> =
        Vec::with_capacity(sections.len());

    for section in sections.iter().copied() {
        // Acquire before spawning so admission itself respects the limit.
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DownloadError::SemaphoreClosed)?;

        if abort.load(Ordering::SeqCst) {
            debug!(ordinal = section.ordinal, "halting admission after a failure");
            drop(permit);
            break;
        }

        let client = client.clone();
        let url = url.to_string();
        let store = store.clone();
        let abort = Arc::clone(&abort);
        let stats = Arc::clone(&stats);

        handles.push(tokio::spawn(async move {
            // Hold the permit for the lifetime of the task.
            let _permit = permit;
            let _flight = FlightGuard::enter(&stats);

            if abort.load(Ordering::SeqCst) {
                stats.record_skipped();
                return (section.ordinal, Ok(()));
            }

            let payload = match client.fetch_section(&url, &section).await {
                Ok(payload) => payload,
                Err(e) => {
                    abort.store(true, Ordering::SeqCst);
                    return (section.ordinal, Err(e));
                }
            };

            // Another section may have failed while this request was in
            // flight; its payload is discarded, not written.
            if abort.load(Ordering::SeqCst) {
                stats.record_skipped();
                return (section.ordinal, Ok(()));
            }

            let bytes = payload.len() as u64;
            if let Err(e) = store.write(section.ordinal, &payload).await {
                abort.store(true, Ordering::SeqCst);
                return (section.ordinal, Err(e));
            }

            stats.record_fetched(bytes);
            (section.ordinal, Ok(()))
        }));
    }

    // Completion barrier: join every spawned task before returning, so no
    // request keeps running after a failure is reported.
    let mut first_error: Option<DownloadError> = None;
    for handle in handles {
        match handle.await {
            Ok((_, Ok(_))) => {}
            Ok((ordinal, Err(e))) => {
                warn!(ordinal, error = %e, "section fetch failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                abort.store(true, Ordering::SeqCst);
                warn!(error = %e, "section task did not finish");
                if first_error.is_none() {
                    first_error = Some(DownloadError::Join { source: e });
                }
            }
        }
    }

    debug!(
        fetched = stats.fetched(),
        skipped = stats.skipped(),
        bytes = stats.bytes_fetched(),
        peak_in_flight = stats.peak_in_flight(),
        "section fetching finished"
    );

    if let Some(error) = first_error {
        return Err(error);
    }

    // Every task has been joined, so the fallback copy is unreachable in
    // practice.
    Ok(Arc::try_unwrap(stats).unwrap_or_else(|shared| FetchStats {
        fetched: AtomicUsize::new(shared.fetched()),
        skipped: AtomicUsize::new(shared.skipped()),
        bytes_fetched: AtomicU64::new(shared.bytes_fetched()),
        in_flight: AtomicUsize::new(0),
        peak_in_flight: AtomicUsize::new(shared.peak_in_flight()),
    }))
}
