//! chunkget core: chunked HTTP(S) transfer engine.
//!
//! Probes a resource with HEAD, splits it into byte-range chunks fetched on
//! parallel threads into one `<output>.tmp` file, and renames it into place
//! once every chunk has arrived. Servers without range support (or without a
//! declared size) get a single streaming GET instead.

pub mod cancel;
pub mod config;
pub mod error;
pub mod fetcher;
mod http;
pub mod logging;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod request;
pub mod sequential;
pub mod storage;
pub mod transfer;
pub mod units;

pub use cancel::CancelToken;
pub use config::TransferConfig;
pub use error::{ErrorKind, TransferError};
pub use request::{HeaderList, TransferRequest};
pub use transfer::{download, download_with_cancel, TransferMode, TransferOutcome};
