//! Capability probe: HEAD request for total size and range support.
//!
//! Applies the caller's extra headers, follows redirects, and reads
//! `Content-Length` and `Accept-Ranges` from the final response only.

mod parse;

use std::str;

use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::http;
use crate::request::HeaderList;

/// What the server told us about the resource. Read-only after the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Declared `Content-Length`; 0 when absent or unparsable.
    pub total_size: u64,
    /// True only if the server sent `Accept-Ranges: bytes`.
    pub supports_range: bool,
}

impl ResourceMetadata {
    /// Chunked mode needs both a known size and advertised range support.
    pub fn allows_chunking(&self) -> bool {
        self.supports_range && self.total_size > 0
    }
}

/// Performs a HEAD request and returns parsed metadata.
/// Blocks the current thread.
pub fn probe(
    url: &str,
    headers: &HeaderList,
    cfg: &TransferConfig,
) -> Result<ResourceMetadata, TransferError> {
    let mut lines: Vec<String> = Vec::new();

    let mut easy = http::new_easy(url, headers, cfg)?;
    easy.nobody(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                // A new status line starts a new response (redirect hop); drop the old headers.
                if http::parse_status_line(s).is_some() {
                    lines.clear();
                }
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform().map_err(TransferError::Probe)?;
    }

    let code = easy.response_code()?;
    if code != 200 {
        return Err(TransferError::UnexpectedStatus(code));
    }

    let meta = parse::parse_headers(&lines);
    tracing::debug!(
        url,
        total_size = meta.total_size,
        supports_range = meta.supports_range,
        "probe complete"
    );
    Ok(meta)
}
