//! Transfer coordinator.
//!
//! Probing → {Sequential | ChunkPlanning} → Fetching → {Committing | Aborting} → Done.
//!
//! Chunk workers run on their own OS threads and report `(index, result)` over
//! a channel. The first error received wins and cancels the group; the rest are
//! dropped. All workers (and the reporter) are joined before the outcome is
//! decided. On any failure after the `.tmp` artifact exists it is removed.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::fetcher::{self, ChunkContext};
use crate::planner::{self, Chunk};
use crate::probe::{self, ResourceMetadata};
use crate::progress::{self, TransferProgress};
use crate::request::TransferRequest;
use crate::sequential;
use crate::storage::{self, StorageWriter, StorageWriterBuilder};

/// How the bytes were fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Chunked { chunks: usize },
    Sequential,
}

/// Result of a successful transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub mode: TransferMode,
    pub metadata: ResourceMetadata,
    /// Bytes written to the output file.
    pub bytes: u64,
    pub path: PathBuf,
}

/// Downloads `request` with the default (never cancelled) token.
pub fn download(
    request: &TransferRequest,
    cfg: &TransferConfig,
) -> Result<TransferOutcome, TransferError> {
    download_with_cancel(request, cfg, &CancelToken::new())
}

/// Downloads `request`; cancelling `cancel` from another thread aborts the
/// transfer with `TransferError::Cancelled`. Blocks the current thread.
pub fn download_with_cancel(
    request: &TransferRequest,
    cfg: &TransferConfig,
    cancel: &CancelToken,
) -> Result<TransferOutcome, TransferError> {
    validate_url(&request.url)?;

    let metadata = probe::probe(&request.url, &request.headers, cfg)?;
    tracing::info!(
        url = %request.url,
        total_size = metadata.total_size,
        supports_range = metadata.supports_range,
        "probed resource"
    );
    if request.verbose {
        println!("Range requests supported: {}", metadata.supports_range);
    }

    if !metadata.allows_chunking() {
        let bytes = sequential::download_sequential(request, cfg, cancel)?;
        return Ok(TransferOutcome {
            mode: TransferMode::Sequential,
            metadata,
            bytes,
            path: request.output.clone(),
        });
    }

    let chunks = planner::plan_chunks(metadata.total_size);
    let temp_path = request.temp_path();
    let storage = create_artifact(&temp_path, metadata.total_size, cfg)?;

    let ctx = ChunkContext {
        request: Arc::new(request.clone()),
        config: Arc::new(cfg.clone()),
        storage,
        progress: TransferProgress::new(),
        cancel: cancel.clone(),
    };
    let fetched = run_chunks(&ctx, &chunks, metadata.total_size);

    let ChunkContext {
        storage, progress, ..
    } = ctx;
    let committed = fetched.and_then(|()| commit(storage, &temp_path, &request.output));

    match committed {
        Ok(()) => {
            tracing::info!(
                output = %request.output.display(),
                bytes = progress.bytes(),
                chunks = chunks.len(),
                "chunked download committed"
            );
            Ok(TransferOutcome {
                mode: TransferMode::Chunked {
                    chunks: chunks.len(),
                },
                metadata,
                bytes: progress.bytes(),
                path: request.output.clone(),
            })
        }
        Err(err) => {
            tracing::warn!(error = %err, "transfer aborted, removing {}", temp_path.display());
            if let Err(e) = storage::discard(&temp_path) {
                tracing::warn!("could not remove {}: {}", temp_path.display(), e);
            }
            Err(err)
        }
    }
}

/// Only absolute http(s) URLs are accepted; nothing touches the network before this passes.
fn validate_url(raw: &str) -> Result<(), TransferError> {
    let invalid = |reason: String| TransferError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {:?}", other))),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}

fn create_artifact(
    temp_path: &Path,
    total_size: u64,
    cfg: &TransferConfig,
) -> Result<StorageWriter, TransferError> {
    let mut builder = StorageWriterBuilder::new(temp_path);
    if cfg.preallocate {
        builder = builder.preallocate(total_size);
    }
    builder.open().map_err(|source| TransferError::ArtifactCreate {
        path: temp_path.to_path_buf(),
        source,
    })
}

fn commit(storage: StorageWriter, temp_path: &Path, output: &Path) -> Result<(), TransferError> {
    storage
        .finalize(output)
        .map_err(|source| TransferError::Commit {
            from: temp_path.to_path_buf(),
            to: output.to_path_buf(),
            source,
        })
}

/// Runs one worker thread per chunk plus the reporter (if verbose), waits for
/// all of them, and returns the first error observed.
fn run_chunks(ctx: &ChunkContext, chunks: &[Chunk], total_size: u64) -> Result<(), TransferError> {
    let started = Instant::now();
    let (tx, rx) = mpsc::channel::<(usize, Result<u64, TransferError>)>();

    let mut handles = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().copied().enumerate() {
        let tx = tx.clone();
        let ctx = ctx.clone();
        handles.push(thread::spawn(move || {
            let res = fetcher::fetch_chunk(index, chunk, &ctx);
            let _ = tx.send((index, res));
        }));
    }
    drop(tx);

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let reporter = ctx.request.verbose.then(|| {
        let progress = ctx.progress.clone();
        let cancel = ctx.cancel.clone();
        let interval = ctx.config.progress_interval();
        thread::spawn(move || {
            progress::run_reporter(
                &mut std::io::stdout(),
                &progress,
                total_size,
                started,
                interval,
                &cancel,
                &stop_rx,
            )
        })
    });

    let mut first_error: Option<TransferError> = None;
    for (index, res) in rx {
        match res {
            Ok(bytes) => tracing::debug!(chunk = index, bytes, "chunk finished"),
            Err(e) if first_error.is_none() => {
                tracing::warn!(chunk = index, error = %e, "chunk failed, cancelling transfer");
                ctx.cancel.cancel();
                first_error = Some(e);
            }
            Err(e) => tracing::debug!(chunk = index, error = %e, "discarding later chunk error"),
        }
    }

    for (index, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() && first_error.is_none() {
            ctx.cancel.cancel();
            first_error = Some(TransferError::Worker { chunk: index });
        }
    }

    drop(stop_tx);
    if let Some(reporter) = reporter {
        let _ = reporter.join();
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
