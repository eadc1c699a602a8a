//! Chunk fetcher: one ranged GET written at absolute offsets into the shared artifact.
//!
//! The status line is checked before any body byte is written, so a server
//! that ignores `Range` and answers 200 never scribbles over other chunks.

use std::cell::{Cell, RefCell};
use std::str;
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::http;
use crate::planner::Chunk;
use crate::progress::TransferProgress;
use crate::request::TransferRequest;
use crate::storage::StorageWriter;

const PARTIAL_CONTENT: u32 = 206;

/// Everything a chunk worker shares with its siblings. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChunkContext {
    pub request: Arc<TransferRequest>,
    pub config: Arc<TransferConfig>,
    pub storage: StorageWriter,
    pub progress: TransferProgress,
    pub cancel: CancelToken,
}

/// Fetches `chunk` (the `index`-th of the plan) and writes it into `ctx.storage`.
/// Returns the number of bytes written, which always equals `chunk.len()`.
///
/// Blocks the current thread. Never creates, renames or removes the artifact.
pub fn fetch_chunk(index: usize, chunk: Chunk, ctx: &ChunkContext) -> Result<u64, TransferError> {
    if ctx.cancel.is_cancelled() {
        return Err(TransferError::Cancelled);
    }

    let expected = chunk.len();
    let status: Cell<Option<u32>> = Cell::new(None);
    let written = Cell::new(0u64);
    let failure: RefCell<Option<TransferError>> = RefCell::new(None);

    let mut easy = http::new_easy(&ctx.request.url, &ctx.request.headers, &ctx.config)?;
    easy.range(&chunk.curl_range())?;
    // Lets the progress callback below abort a stalled request once cancelled.
    easy.progress(true)?;

    tracing::debug!(chunk = index, range = %chunk.range_header_value(), "chunk request");

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = str::from_utf8(line).ok().and_then(http::parse_status_line) {
                status.set(Some(code));
            }
            true
        })?;
        transfer.write_function(|data| {
            if ctx.cancel.is_cancelled() {
                *failure.borrow_mut() = Some(TransferError::Cancelled);
                return Ok(0);
            }
            match status.get() {
                Some(PARTIAL_CONTENT) => {}
                other => {
                    *failure.borrow_mut() = Some(TransferError::BadChunkResponse {
                        chunk: index,
                        status: other.unwrap_or(0),
                    });
                    return Ok(0);
                }
            }
            let offset = written.get();
            let len = data.len() as u64;
            if offset + len > expected {
                *failure.borrow_mut() = Some(TransferError::ChunkOverrun {
                    chunk: index,
                    expected,
                });
                return Ok(0);
            }
            if let Err(source) = ctx.storage.write_at(chunk.start + offset, data) {
                *failure.borrow_mut() = Some(TransferError::ChunkIo {
                    chunk: index,
                    source,
                });
                return Ok(0);
            }
            written.set(offset + len);
            ctx.progress.add(len);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !ctx.cancel.is_cancelled())?;
        transfer.perform()
    };

    if let Some(err) = failure.take() {
        return Err(err);
    }
    if let Err(source) = perform_result {
        if ctx.cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }
        return Err(TransferError::ChunkTransport {
            chunk: index,
            source,
        });
    }

    let code = easy.response_code()?;
    if code != PARTIAL_CONTENT {
        return Err(TransferError::BadChunkResponse {
            chunk: index,
            status: code,
        });
    }

    let received = written.get();
    if received != expected {
        return Err(TransferError::ShortChunk {
            chunk: index,
            expected,
            received,
        });
    }

    tracing::debug!(chunk = index, bytes = received, "chunk complete");
    Ok(received)
}
