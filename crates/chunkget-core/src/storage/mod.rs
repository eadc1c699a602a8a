//! Output artifact lifecycle for chunked transfers.
//!
//! The coordinator creates `<output>.tmp` (truncating any leftover from an
//! earlier run), optionally preallocates it, shares one `StorageWriter` with
//! every chunk worker for positional writes, then either renames it into
//! place or discards it.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the commit rename.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Path for the temp file: appends `.tmp` to the final path (e.g. `file.iso` → `file.iso.tmp`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Remove a temp artifact. A missing file is not an error.
pub fn discard(temp_path: &Path) -> io::Result<()> {
    match std::fs::remove_file(temp_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
