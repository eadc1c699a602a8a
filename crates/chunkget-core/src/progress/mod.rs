//! Shared progress accounting and the console progress line.
//!
//! Chunk workers add to one `TransferProgress` counter after every write; the
//! reporter samples it on a fixed interval without ever blocking them.

mod reporter;

pub use reporter::run_reporter;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::units::{format_size, mib_per_sec};

/// Cumulative bytes written for the current transfer. Cloning shares the counter.
#[derive(Debug, Clone, Default)]
pub struct TransferProgress(Arc<AtomicU64>);

impl TransferProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, bytes: u64) {
        self.0.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn bytes(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of a transfer, used to render the progress line.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub bytes_done: u64,
    /// Total size, or `None` when unknown (sequential path).
    pub total_bytes: Option<u64>,
    /// Seconds since the transfer started.
    pub elapsed_secs: f64,
}

impl ProgressSnapshot {
    /// Cumulative average rate in bytes per second (0 if no time has elapsed).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Fraction complete in [0.0, 1.0], if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                (self.bytes_done as f64 / total as f64).min(1.0)
            }
        })
    }

    /// `1.5 MiB / 4.0 MiB (37.5%) | 2.10 MiB/s`, or `1.5 MiB | 2.10 MiB/s` without a total.
    pub fn render(&self) -> String {
        let rate = mib_per_sec(self.bytes_per_sec());
        match (self.total_bytes, self.fraction()) {
            (Some(total), Some(fraction)) => format!(
                "{} / {} ({:.1}%) | {:.2} MiB/s",
                format_size(self.bytes_done),
                format_size(total),
                fraction * 100.0,
                rate
            ),
            _ => format!("{} | {:.2} MiB/s", format_size(self.bytes_done), rate),
        }
    }
}
