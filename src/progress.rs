//! Progress-callback trait for per-file rename events.
//!
//! Inject an [`Arc<dyn RenameProgressCallback>`] via
//! [`crate::config::RenameConfigBuilder::progress_callback`] to receive events
//! as the orchestrator walks the directory. The CLI uses this to drive its
//! progress bar; the library itself only logs through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use pagemark::{RenameConfig, RenameProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     renamed: AtomicUsize,
//! }
//!
//! impl RenameProgressCallback for CountingCallback {
//!     fn on_file_renamed(&self, from: &str, to: &str) {
//!         self.renamed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{from} -> {to}");
//!     }
//! }
//!
//! let config = RenameConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { renamed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RunSummary;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Called by the orchestrator as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait RenameProgressCallback: Send + Sync {
    /// Called once after listing, before the first file.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before each file, skipped or not.
    fn on_file_start(&self, file_name: &str, progress: &ProgressSnapshot) {
        let _ = (file_name, progress);
    }

    /// The file already carries the marker prefix.
    fn on_file_skipped(&self, file_name: &str) {
        let _ = file_name;
    }

    /// The file was renamed (or would have been, in dry-run mode).
    fn on_file_renamed(&self, from: &str, to: &str) {
        let _ = (from, to);
    }

    /// Detection or rename failed; the file is left untouched.
    fn on_file_error(&self, file_name: &str, error: &str) {
        let _ = (file_name, error);
    }

    /// Called once after every file has been visited.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenameProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenameConfig`].
pub type ProgressCallback = Arc<dyn RenameProgressCallback>;

/// Position within the run plus an estimate of the time left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Files already visited before this one.
    pub completed: usize,
    /// Files in the run.
    pub total: usize,
    /// `completed / total` as a percentage.
    pub percent: f64,
    /// `None` until at least one file has been visited.
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    /// Average time per visited file times the files still to go.
    pub fn compute(completed: usize, total: usize, elapsed: Duration) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        let eta = (completed > 0).then(|| {
            let remaining = total.saturating_sub(completed) as f64;
            Duration::from_secs_f64(elapsed.as_secs_f64() / completed as f64 * remaining)
        });
        Self {
            completed,
            total,
            percent,
            eta,
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {:.2}% ({}/{})",
            self.percent, self.completed, self.total
        )?;
        match self.eta {
            Some(eta) => write!(f, ", ETA: {}", format_duration(eta)),
            None => write!(f, ", ETA: not available"),
        }
    }
}

/// `h:mm:ss` rendering used in progress lines.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn eta_unavailable_before_first_sample() {
        let snap = ProgressSnapshot::compute(0, 10, Duration::from_secs(3));
        assert_eq!(snap.eta, None);
        assert_eq!(snap.percent, 0.0);
        assert!(snap.to_string().contains("not available"));
    }

    #[test]
    fn eta_scales_with_remaining_files() {
        // 2 files took 10 s → 5 s each, 8 left → 40 s.
        let snap = ProgressSnapshot::compute(2, 10, Duration::from_secs(10));
        assert_eq!(snap.eta, Some(Duration::from_secs(40)));
        assert_eq!(snap.percent, 20.0);
        assert_eq!(snap.to_string(), "Progress: 20.00% (2/10), ETA: 0:00:40");
    }

    #[test]
    fn empty_run_is_complete() {
        let snap = ProgressSnapshot::compute(0, 0, Duration::ZERO);
        assert_eq!(snap.percent, 100.0);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(3725)), "1:02:05");
        assert_eq!(format_duration(Duration::from_millis(999)), "0:00:00");
    }

    struct TrackingCallback {
        skipped: AtomicUsize,
        renamed: AtomicUsize,
        errors: AtomicUsize,
    }

    impl RenameProgressCallback for TrackingCallback {
        fn on_file_skipped(&self, _file_name: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_renamed(&self, _from: &str, _to: &str) {
            self.renamed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _file_name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_file_start("a.png", &ProgressSnapshot::compute(0, 3, Duration::ZERO));
        cb.on_file_skipped("_0001_a.png");
        cb.on_file_renamed("a.png", "_0001_a.png");
        cb.on_file_error("b.png", "boom");
        cb.on_run_complete(&RunSummary::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = Arc::new(TrackingCallback {
            skipped: AtomicUsize::new(0),
            renamed: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        });
        let cb: ProgressCallback = tracker.clone();
        cb.on_file_skipped("_x.png");
        cb.on_file_renamed("a.png", "_cover_a.png");
        cb.on_file_renamed("b.png", "_0001_b.png");
        cb.on_file_error("c.png", "timeout");

        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.renamed.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }
}
