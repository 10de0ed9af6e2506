//! Section planning: splitting a resource into contiguous byte ranges.

use tracing::debug;

use super::client::ResourceInfo;
use super::error::DownloadError;

/// An inclusive range of bytes within a remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Offset of the first byte, counted from zero.
    pub start: u64,
    /// Offset of the last byte, inclusive.
    pub end: u64,
}

impl ByteRange {
    /// Creates a range covering bytes `start..=end`.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes the range covers.
    #[must_use]
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Renders the range as an HTTP `Range` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// One unit of a download plan: a slice of the resource to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Position of this section in the plan; sections are merged in this order.
    pub ordinal: usize,
    /// Byte range to request, or `None` to fetch the whole resource.
    pub range: Option<ByteRange>,
}

impl Section {
    /// Creates a section covering the given byte range.
    #[must_use]
    pub fn ranged(ordinal: usize, start: u64, end: u64) -> Self {
        Self {
            ordinal,
            range: Some(ByteRange::new(start, end)),
        }
    }

    /// Creates a section that fetches the whole resource in one request.
    #[must_use]
    pub fn unranged(ordinal: usize) -> Self {
        Self {
            ordinal,
            range: None,
        }
    }
}

/// How a resource is split into sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitStrategy {
    /// One section per worker, each roughly `size / workers` bytes.
    #[default]
    WorkerCount,
    /// Fixed-size sections of the configured byte count.
    SectionSize,
}

/// Splits a resource into contiguous sections that cover every byte exactly once.
///
/// Resources with unknown size or without byte-range support yield a single
/// unranged section. The last section absorbs the division remainder, so it
/// may be up to one share larger than the others.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidWorkers`] if `workers` is zero and
/// [`DownloadError::InvalidSectionSize`] if `section_size` is zero, regardless
/// of which strategy is selected.
pub fn plan_sections(
    resource: &ResourceInfo,
    strategy: SplitStrategy,
    workers: usize,
    section_size: u64,
) -> Result<Vec<Section>, DownloadError> {
    if workers == 0 {
        return Err(DownloadError::InvalidWorkers { value: workers });
    }
    if section_size == 0 {
        return Err(DownloadError::InvalidSectionSize {
            value: section_size,
        });
    }

    if resource.size == 0 || !resource.accepts_ranges {
        debug!(
            size = resource.size,
            accepts_ranges = resource.accepts_ranges,
            "planning a single unranged section"
        );
        return Ok(vec![Section::unranged(0)]);
    }

    let size = resource.size;
    let (share, count) = match strategy {
        SplitStrategy::WorkerCount => (size / workers as u64, workers as u64),
        SplitStrategy::SectionSize => (section_size, size / section_size),
    };

    // A resource smaller than one share is fetched as a single ranged section.
    if share == 0 || count == 0 {
        debug!(size, ?strategy, "resource smaller than one share");
        return Ok(vec![Section::ranged(0, 0, size - 1)]);
    }

    let mut sections = Vec::with_capacity(count as usize);
    let mut start = 0u64;
    for ordinal in 0..count {
        // The last section absorbs the division remainder.
        let end = if ordinal == count - 1 {
            size - 1
        } else {
            start + share - 1
        };
        sections.push(Section::ranged(ordinal as usize, start, end));
        start = end + 1;
    }

    debug!(sections = sections.len(), share, ?strategy, "download plan ready");
    Ok(sections)
}
