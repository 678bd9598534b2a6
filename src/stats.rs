use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::client::RequestOutcome;

/// Thread-safe success/failure tallies shared by every in-flight request.
///
/// Completions arrive concurrently and in arbitrary order; each `record`
/// call bumps exactly one counter, so `success + errors` always equals the
/// number of completed requests observed so far.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    success: AtomicU64,
    errors: AtomicU64,
}

/// Immutable summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    /// Total number of completed requests.
    pub total: u64,
    /// Requests that returned a 2xx status.
    pub success: u64,
    /// Requests that returned any other status or failed at the network level.
    pub errors: u64,
    /// `success / total * 100`; 0.0 when no requests completed.
    pub success_rate: f64,
}

impl ResultAggregator {
    /// Folds one completed request into the counters. `Failure` and
    /// `Error` are not distinguished for reporting purposes.
    pub fn record(&self, outcome: &RequestOutcome) {
        // Relaxed is enough: the controller joins every task before the
        // snapshot is read, which orders all increments before the load.
        if outcome.is_success() {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current view of the counters. Stable (and therefore idempotent)
    /// once the controller has drained and no further `record` calls can
    /// happen; guaranteeing that ordering is the caller's job.
    pub fn snapshot(&self) -> TestReport {
        let success = self.success.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let total = success + errors;
        let success_rate = if total > 0 {
            success as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        TestReport {
            total,
            success,
            errors,
            success_rate,
        }
    }
}
