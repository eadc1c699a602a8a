//! Chunk planning: how many chunks, and where each one starts and ends.
//!
//! Chunks use inclusive byte bounds and exactly partition `[0, total_size - 1]`.

mod range;

pub use range::{plan_chunks, plan_with, Chunk};

/// Files strictly larger than this get `LARGE_FILE_CHUNKS` chunks.
pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024 * 1024;
pub const LARGE_FILE_CHUNKS: usize = 8;
pub const DEFAULT_CHUNKS: usize = 4;

/// Chunk count for a resource of `total_size` bytes.
pub fn concurrency_for(total_size: u64) -> usize {
    if total_size > LARGE_FILE_THRESHOLD {
        LARGE_FILE_CHUNKS
    } else {
        DEFAULT_CHUNKS
    }
}
