//! Visit counter snapshot model.
//!
//! # Responsibility
//! - Define the read-side shape of the singleton visit counter.
//! - Provide the staleness-based liveness predicate as a pure function.
//!
//! # Invariants
//! - `count` is non-negative and monotonically non-decreasing between
//!   explicit administrative resets.
//! - `last_visit_at` is epoch milliseconds of the most recent increment.

use serde::{Deserialize, Serialize};

/// Default recency window for the dashboard's "currently active" badge.
pub const DEFAULT_ACTIVE_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Point-in-time view of the visit counter.
///
/// Snapshots may lag an in-flight increment; they are display data, not a
/// correctness-critical read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSnapshot {
    pub count: i64,
    /// Epoch milliseconds; 0 until the first increment lands.
    pub last_visit_at: i64,
}

impl VisitSnapshot {
    /// Returns whether the site saw a visit within `window_ms` of `now_ms`.
    ///
    /// Pure function of this snapshot; a never-visited counter
    /// (`last_visit_at == 0`) is never recently active.
    pub fn is_recently_active(&self, now_ms: i64, window_ms: i64) -> bool {
        self.last_visit_at > 0 && now_ms.saturating_sub(self.last_visit_at) <= window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::{VisitSnapshot, DEFAULT_ACTIVE_WINDOW_MS};

    #[test]
    fn fresh_visit_is_recently_active() {
        let snapshot = VisitSnapshot {
            count: 3,
            last_visit_at: 1_000_000,
        };
        assert!(snapshot.is_recently_active(1_000_500, DEFAULT_ACTIVE_WINDOW_MS));
    }

    #[test]
    fn stale_visit_is_not_recently_active() {
        let snapshot = VisitSnapshot {
            count: 3,
            last_visit_at: 1_000_000,
        };
        assert!(!snapshot.is_recently_active(1_000_000 + DEFAULT_ACTIVE_WINDOW_MS + 1, DEFAULT_ACTIVE_WINDOW_MS));
    }

    #[test]
    fn never_visited_counter_is_inactive_regardless_of_window() {
        let snapshot = VisitSnapshot {
            count: 0,
            last_visit_at: 0,
        };
        assert!(!snapshot.is_recently_active(i64::MAX, i64::MAX));
    }
}
