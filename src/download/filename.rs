//! Deriving destination filenames from URLs.

use tracing::debug;
use url::Url;

/// Derives a destination filename from the last path segment of a URL.
///
/// Percent-escapes are decoded and the result is sanitised for use as a
/// filename. Returns `None` when the URL does not parse or its path has no
/// final segment, as for `http://host/` or `http://host`.
#[must_use]
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    let last = segments.next_back()?;
    if last.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(last).unwrap_or_else(|e| {
        debug!(segment = last, error = %e, "keeping raw segment after decode failure");
        last.into()
    });
    Some(sanitize_filename(&decoded))
}

/// Replaces characters that are unsafe in filenames with underscores.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        sanitized
    }
}
