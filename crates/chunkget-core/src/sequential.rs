//! Single-stream GET (fallback when the server does not advertise ranges or size).
//!
//! Writes straight to the final path with no temp file and no rename. The file
//! is only created once a 200 status has been seen; a failure mid-body leaves
//! the partial file in place.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{self, Write};
use std::str;
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::http;
use crate::progress::ProgressSnapshot;
use crate::request::TransferRequest;

const OK: u32 = 200;

/// Downloads `request.url` with one unranged GET into `request.output`.
/// Returns the number of bytes written. Blocks the current thread.
pub fn download_sequential(
    request: &TransferRequest,
    cfg: &TransferConfig,
    cancel: &CancelToken,
) -> Result<u64, TransferError> {
    if cancel.is_cancelled() {
        return Err(TransferError::Cancelled);
    }

    let output = request.output.as_path();
    let status: Cell<Option<u32>> = Cell::new(None);
    let written = Cell::new(0u64);
    let file: RefCell<Option<File>> = RefCell::new(None);
    let failure: RefCell<Option<TransferError>> = RefCell::new(None);
    let started = Instant::now();

    let io_error = |source: io::Error| TransferError::SequentialIo {
        path: output.to_path_buf(),
        source,
    };

    let mut easy = http::new_easy(&request.url, &request.headers, cfg)?;
    easy.progress(true)?;

    tracing::debug!(url = %request.url, output = %output.display(), "sequential GET");

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = str::from_utf8(line).ok().and_then(http::parse_status_line) {
                status.set(Some(code));
            }
            true
        })?;
        transfer.write_function(|data| {
            if cancel.is_cancelled() {
                *failure.borrow_mut() = Some(TransferError::Cancelled);
                return Ok(0);
            }
            match status.get() {
                Some(OK) => {}
                other => {
                    *failure.borrow_mut() = Some(TransferError::BadStatus(other.unwrap_or(0)));
                    return Ok(0);
                }
            }
            let mut slot = file.borrow_mut();
            if slot.is_none() {
                match File::create(output) {
                    Ok(f) => *slot = Some(f),
                    Err(e) => {
                        *failure.borrow_mut() = Some(io_error(e));
                        return Ok(0);
                    }
                }
            }
            if let Some(f) = slot.as_mut() {
                if let Err(e) = f.write_all(data) {
                    *failure.borrow_mut() = Some(io_error(e));
                    return Ok(0);
                }
            }
            let done = written.get() + data.len() as u64;
            written.set(done);
            if request.verbose {
                let snap = ProgressSnapshot {
                    bytes_done: done,
                    total_bytes: None,
                    elapsed_secs: started.elapsed().as_secs_f64(),
                };
                let mut stdout = io::stdout().lock();
                let _ = write!(stdout, "\r{}", snap.render());
                let _ = stdout.flush();
            }
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.perform()
    };

    if request.verbose && written.get() > 0 {
        println!();
    }
    if let Some(err) = failure.take() {
        return Err(err);
    }
    if let Err(source) = perform_result {
        if cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }
        return Err(TransferError::SequentialTransport(source));
    }

    let code = easy.response_code()?;
    if code != OK {
        return Err(TransferError::BadStatus(code));
    }

    // Empty body: nothing was written, but the output must still exist.
    match file.take() {
        Some(f) => f.sync_all().map_err(io_error)?,
        None => {
            File::create(output).map_err(io_error)?;
        }
    }

    let bytes = written.get();
    tracing::info!(output = %output.display(), bytes, "sequential download complete");
    Ok(bytes)
}
