//! Transfer inputs: target URL, output path, extra request headers, verbosity.

use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage;

/// Ordered list of extra request headers. Duplicate names are kept and all
/// of them are sent, so multi-value headers survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses a comma-separated `Key:Value` list (e.g. `User-Agent:custom,X-Test:1`).
///
/// Each pair is split at its first `:` and both sides are trimmed. Pairs
/// without a `:` are skipped.
impl FromStr for HeaderList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut list = HeaderList::new();
        for pair in s.split(',') {
            match pair.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    list.push(name.trim(), value.trim());
                }
                _ => {
                    if !pair.trim().is_empty() {
                        tracing::debug!(pair, "skipping malformed header pair");
                    }
                }
            }
        }
        Ok(list)
    }
}

/// One download: immutable once the transfer starts.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub url: String,
    pub output: PathBuf,
    pub headers: HeaderList,
    pub verbose: bool,
}

impl TransferRequest {
    /// New request with no extra headers and progress output enabled.
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
            headers: HeaderList::new(),
            verbose: true,
        }
    }

    pub fn with_headers(mut self, headers: HeaderList) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// `<output>.tmp`, the staging path used in chunked mode.
    pub fn temp_path(&self) -> PathBuf {
        storage::temp_path(&self.output)
    }
}
