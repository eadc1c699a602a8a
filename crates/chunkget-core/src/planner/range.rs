//! Chunk type and range planning.

use super::concurrency_for;

/// A single chunk: byte range `[start, end]` (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    /// Length of this chunk in bytes (never 0).
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}", self.curl_range())
    }

    /// Range in the form libcurl's `CURLOPT_RANGE` expects: `start-end`.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Plans chunks for `total_size` bytes using the size policy (`concurrency_for`).
pub fn plan_chunks(total_size: u64) -> Vec<Chunk> {
    plan_with(total_size, concurrency_for(total_size))
}

/// Splits `[0, total_size - 1]` into `concurrency` contiguous chunks of
/// `total_size / concurrency` bytes; the last chunk absorbs the remainder.
///
/// `concurrency` is clamped to `total_size` so no chunk is ever empty.
/// Returns an empty vec if `total_size` or `concurrency` is 0.
pub fn plan_with(total_size: u64, concurrency: usize) -> Vec<Chunk> {
    if total_size == 0 || concurrency == 0 {
        return Vec::new();
    }

    let count = (concurrency as u64).min(total_size);
    let chunk_size = total_size / count;

    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let start = i * chunk_size;
        let end = if i == count - 1 {
            total_size - 1
        } else {
            start + chunk_size - 1
        };
        out.push(Chunk { start, end });
    }

    out
}
