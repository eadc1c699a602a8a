//! Opens the temp artifact for a chunked transfer.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::writer::StorageWriter;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Describes the artifact to open: where it lives and how much space to reserve.
///
/// `open` truncates anything already at the path (there is no resume) and, if
/// the reservation fails, removes the half-made file before returning the error.
#[derive(Debug, Clone)]
pub struct StorageWriterBuilder {
    temp_path: PathBuf,
    reserve: Option<u64>,
}

impl StorageWriterBuilder {
    pub fn new(temp_path: &Path) -> Self {
        StorageWriterBuilder {
            temp_path: temp_path.to_path_buf(),
            reserve: None,
        }
    }

    /// Reserve `size` bytes on disk when the file is opened.
    pub fn preallocate(mut self, size: u64) -> Self {
        self.reserve = Some(size);
        self
    }

    pub fn open(self) -> io::Result<StorageWriter> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)?;
        if let Some(size) = self.reserve {
            if let Err(e) = reserve(&file, size) {
                drop(file);
                let _ = super::discard(&self.temp_path);
                return Err(e);
            }
        }
        Ok(StorageWriter::from_file_and_path(file, self.temp_path))
    }
}

/// Real block allocation via `posix_fallocate` where available, else a sparse `set_len`.
fn reserve(file: &File, size: u64) -> io::Result<()> {
    #[cfg(unix)]
    {
        let r = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, size as libc::off_t) };
        if r == 0 {
            return Ok(());
        }
        tracing::debug!(errno = r, size, "posix_fallocate unavailable, using set_len");
    }
    file.set_len(size)
}
