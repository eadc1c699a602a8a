//! Error taxonomy for a single transfer.
//!
//! Every fatal condition of the probe, the chunked path and the sequential
//! path maps to one `TransferError` variant. The coordinator surfaces only the
//! first error it observes; `kind()` gives callers a fieldless value to match on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fieldless classification of a `TransferError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    Probe,
    UnexpectedStatus,
    ArtifactCreate,
    BadChunkResponse,
    ChunkIo,
    ChunkTransport,
    ShortChunk,
    ChunkOverrun,
    Commit,
    BadStatus,
    SequentialIo,
    SequentialTransport,
    Cancelled,
    Worker,
    Http,
}

#[derive(Debug, Error)]
pub enum TransferError {
    /// The URL could not be parsed or is not http(s). No request was sent.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HEAD probe could not be sent or completed.
    #[error("HEAD request failed: {0}")]
    Probe(#[source] curl::Error),

    /// The HEAD probe answered with something other than 200.
    #[error("HEAD returned HTTP {0}, expected 200")]
    UnexpectedStatus(u32),

    /// The `.tmp` artifact could not be created or preallocated.
    #[error("failed to create temp file {}: {source}", path.display())]
    ArtifactCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("chunk {chunk}: server answered HTTP {status}, expected 206")]
    BadChunkResponse { chunk: usize, status: u32 },

    #[error("chunk {chunk}: write failed: {source}")]
    ChunkIo {
        chunk: usize,
        #[source]
        source: io::Error,
    },

    #[error("chunk {chunk}: transfer failed: {source}")]
    ChunkTransport {
        chunk: usize,
        #[source]
        source: curl::Error,
    },

    #[error("chunk {chunk}: body ended early, expected {expected} bytes, got {received}")]
    ShortChunk {
        chunk: usize,
        expected: u64,
        received: u64,
    },

    #[error("chunk {chunk}: server sent more than the requested {expected} bytes")]
    ChunkOverrun { chunk: usize, expected: u64 },

    /// All bytes arrived but the temp file could not be renamed into place.
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Commit {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sequential GET answered with something other than 200.
    #[error("GET returned HTTP {0}, expected 200")]
    BadStatus(u32),

    #[error("failed to write {}: {source}", path.display())]
    SequentialIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("GET request failed: {0}")]
    SequentialTransport(#[source] curl::Error),

    #[error("transfer cancelled")]
    Cancelled,

    #[error("chunk {chunk}: worker thread panicked")]
    Worker { chunk: usize },

    /// A curl handle option could not be applied (bad URL syntax, TLS option, ...).
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] curl::Error),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            TransferError::Probe(_) => ErrorKind::Probe,
            TransferError::UnexpectedStatus(_) => ErrorKind::UnexpectedStatus,
            TransferError::ArtifactCreate { .. } => ErrorKind::ArtifactCreate,
            TransferError::BadChunkResponse { .. } => ErrorKind::BadChunkResponse,
            TransferError::ChunkIo { .. } => ErrorKind::ChunkIo,
            TransferError::ChunkTransport { .. } => ErrorKind::ChunkTransport,
            TransferError::ShortChunk { .. } => ErrorKind::ShortChunk,
            TransferError::ChunkOverrun { .. } => ErrorKind::ChunkOverrun,
            TransferError::Commit { .. } => ErrorKind::Commit,
            TransferError::BadStatus(_) => ErrorKind::BadStatus,
            TransferError::SequentialIo { .. } => ErrorKind::SequentialIo,
            TransferError::SequentialTransport(_) => ErrorKind::SequentialTransport,
            TransferError::Cancelled => ErrorKind::Cancelled,
            TransferError::Worker { .. } => ErrorKind::Worker,
            TransferError::Http(_) => ErrorKind::Http,
        }
    }
}
