//! Visit counter use-case service.
//!
//! # Responsibility
//! - Wrap the singleton counter repository with retry and logging policy.
//! - Expose the staleness-based liveness heuristic to dashboards.
//!
//! # Invariants
//! - N concurrent increments from count C end at exactly C + N; the
//!   repository's transactional read-modify-write carries this, the
//!   service only adds the one-shot retry.

use crate::db::DbError;
use crate::model::visit::{VisitSnapshot, DEFAULT_ACTIVE_WINDOW_MS};
use crate::repo::visit_repo::VisitRepository;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VisitResult<T> = Result<T, VisitError>;

/// Errors surfaced by visit counter operations.
#[derive(Debug)]
pub enum VisitError {
    Db(DbError),
    /// The transactional increment could not commit after one retry. The
    /// caller may safely retry the whole call.
    CounterWriteFailed,
}

impl Display for VisitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CounterWriteFailed => write!(f, "visit counter write failed"),
        }
    }
}

impl Error for VisitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::CounterWriteFailed => None,
        }
    }
}

impl From<DbError> for VisitError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Use-case wrapper over the visit counter repository.
pub struct VisitService<R: VisitRepository> {
    repo: R,
}

impl<R: VisitRepository> VisitService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records one visit and returns the post-increment snapshot.
    ///
    /// The underlying read-modify-write is transactional within one call;
    /// a failed commit is retried once, then reported as
    /// `CounterWriteFailed`.
    pub fn increment(&self) -> VisitResult<VisitSnapshot> {
        match self.repo.increment() {
            Ok(snapshot) => {
                info!(
                    "event=visit_increment module=visits status=ok count={}",
                    snapshot.count
                );
                Ok(snapshot)
            }
            Err(first_err) => {
                warn!("event=visit_increment module=visits status=retry error={first_err}");
                self.repo.increment().map_err(|retry_err| {
                    error!(
                        "event=visit_increment module=visits status=error error={retry_err}"
                    );
                    VisitError::CounterWriteFailed
                })
            }
        }
    }

    /// Non-blocking snapshot. May lag an in-flight increment; acceptable
    /// for display-only callers.
    pub fn current(&self) -> VisitResult<VisitSnapshot> {
        let snapshot = self.repo.snapshot()?;
        Ok(snapshot)
    }

    /// Returns whether the last visit landed within `window_ms` of `now_ms`.
    pub fn is_recently_active(&self, now_ms: i64, window_ms: i64) -> VisitResult<bool> {
        Ok(self.current()?.is_recently_active(now_ms, window_ms))
    }

    /// Liveness check with the default dashboard window.
    pub fn is_recently_active_now(&self, now_ms: i64) -> VisitResult<bool> {
        self.is_recently_active(now_ms, DEFAULT_ACTIVE_WINDOW_MS)
    }

    /// Administrative reset to zero. A reset racing an increment resolves
    /// last-write-wins; callers accept a final count of 0 or 1.
    pub fn reset(&self) -> VisitResult<()> {
        self.repo.reset()?;
        info!("event=visit_reset module=visits status=ok");
        Ok(())
    }
}
