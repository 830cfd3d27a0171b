//! Shared status control of a search.
//!
//! All status reads and transitions of a search go through a single
//! [`SearchControl`], protected by one mutex. The control is shared (via
//! `Arc`) between the worker thread executing the run loop, the
//! stop-criterion checker thread, and any thread holding a
//! [`SearchHandle`](crate::search::SearchHandle).

use std::sync::Mutex;

use wander_core::error::{Result, SearchError};
use wander_core::status::SearchStatus;

/// Thread-safe holder of a search's status.
#[derive(Debug)]
pub struct SearchControl {
    status: Mutex<SearchStatus>,
}

impl SearchControl {
    pub(crate) fn new() -> Self {
        Self {
            status: Mutex::new(SearchStatus::Idle),
        }
    }

    /// Current status.
    pub fn status(&self) -> SearchStatus {
        *self.status.lock().unwrap()
    }

    /// Transitions to `to`, failing with `BadStatus` if the status protocol
    /// does not allow the transition from the current status.
    pub(crate) fn advance(&self, to: SearchStatus, action: &str) -> Result<()> {
        let mut status = self.status.lock().unwrap();
        if !status.may_transition_to(to) {
            return Err(SearchError::bad_status(*status, action));
        }
        *status = to;
        Ok(())
    }

    /// Transitions from `from` to `to` if the search currently is in `from`.
    /// Returns whether the transition took place.
    pub(crate) fn advance_if(&self, from: SearchStatus, to: SearchStatus) -> bool {
        let mut status = self.status.lock().unwrap();
        if *status == from && status.may_transition_to(to) {
            *status = to;
            true
        } else {
            false
        }
    }

    /// Requests termination of the current run.
    ///
    /// Transitions `Initializing` or `Running` to `Terminating`; in any other
    /// status this is a no-op. Idempotent and safe to call from any thread.
    pub fn stop(&self) {
        let mut status = self.status.lock().unwrap();
        if matches!(
            *status,
            SearchStatus::Initializing | SearchStatus::Running
        ) {
            *status = SearchStatus::Terminating;
        }
    }

    /// Fails with `BadStatus` unless the search is idle.
    pub(crate) fn assert_idle(&self, action: &str) -> Result<()> {
        let status = self.status.lock().unwrap();
        if *status != SearchStatus::Idle {
            return Err(SearchError::bad_status(*status, action));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        assert_eq!(SearchControl::new().status(), SearchStatus::Idle);
    }

    #[test]
    fn advance_enforces_protocol() {
        let control = SearchControl::new();
        control.advance(SearchStatus::Initializing, "start").unwrap();
        control.advance(SearchStatus::Running, "run").unwrap();
        let err = control.advance(SearchStatus::Idle, "finish");
        assert!(matches!(err, Err(SearchError::BadStatus { .. })));
    }

    #[test]
    fn stop_is_idempotent_and_ignores_idle() {
        let control = SearchControl::new();
        control.stop();
        assert_eq!(control.status(), SearchStatus::Idle);
        control.advance(SearchStatus::Initializing, "start").unwrap();
        control.stop();
        control.stop();
        assert_eq!(control.status(), SearchStatus::Terminating);
    }

    #[test]
    fn advance_if_only_fires_from_expected_status() {
        let control = SearchControl::new();
        assert!(!control.advance_if(SearchStatus::Running, SearchStatus::Terminating));
        assert!(control.advance_if(SearchStatus::Idle, SearchStatus::Initializing));
        assert_eq!(control.status(), SearchStatus::Initializing);
    }
}
