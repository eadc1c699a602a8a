//! Periodic progress line for chunked transfers.

use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use super::{ProgressSnapshot, TransferProgress};
use crate::cancel::CancelToken;

/// Redraws `\r<progress line>` on `out` every `interval` until `stop` fires
/// (message or disconnect) or `cancel` is set, whichever comes first.
///
/// Write errors are ignored; the reporter never affects the transfer outcome.
pub fn run_reporter<W: Write>(
    out: &mut W,
    progress: &TransferProgress,
    total_bytes: u64,
    started: Instant,
    interval: Duration,
    cancel: &CancelToken,
    stop: &Receiver<()>,
) {
    let snapshot = || ProgressSnapshot {
        bytes_done: progress.bytes(),
        total_bytes: Some(total_bytes),
        elapsed_secs: started.elapsed().as_secs_f64(),
    };

    loop {
        if cancel.is_cancelled() {
            let _ = writeln!(out);
            let _ = out.flush();
            return;
        }
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let _ = write!(out, "\r{}", snapshot().render());
                let _ = out.flush();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Completed: leave the final totals on screen.
    let _ = writeln!(out, "\r{}", snapshot().render());
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn stops_on_disconnect_with_final_line() {
        let progress = TransferProgress::new();
        progress.add(512);
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);
        let mut out = Vec::new();
        run_reporter(
            &mut out,
            &progress,
            1024,
            Instant::now(),
            Duration::from_secs(60),
            &CancelToken::new(),
            &rx,
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with('\r'));
        assert!(text.contains("512 B / 1.0 KiB (50.0%)"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn returns_promptly_when_cancelled() {
        let progress = TransferProgress::new();
        let (_tx, rx) = mpsc::channel::<()>();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        let begun = Instant::now();
        run_reporter(
            &mut out,
            &progress,
            10,
            Instant::now(),
            Duration::from_secs(60),
            &cancel,
            &rx,
        );
        assert!(begun.elapsed() < Duration::from_secs(5));
        assert_eq!(out, b"\n");
    }

    #[test]
    fn ticks_until_stopped() {
        let progress = TransferProgress::new();
        let (tx, rx) = mpsc::channel::<()>();
        let cancel = CancelToken::new();
        let handle = std::thread::spawn(move || {
            let mut out = Vec::new();
            run_reporter(
                &mut out,
                &progress,
                100,
                Instant::now(),
                Duration::from_millis(5),
                &cancel,
                &rx,
            );
            out
        });
        std::thread::sleep(Duration::from_millis(50));
        tx.send(()).unwrap();
        let out = String::from_utf8(handle.join().unwrap()).unwrap();
        assert!(out.matches('\r').count() >= 2, "output: {:?}", out);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn output_errors_are_ignored() {
        let (tx, rx) = mpsc::channel::<()>();
        tx.send(()).unwrap();
        run_reporter(
            &mut FailingWriter,
            &TransferProgress::new(),
            1,
            Instant::now(),
            Duration::from_millis(1),
            &CancelToken::new(),
            &rx,
        );
    }
}
