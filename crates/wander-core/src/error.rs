//! Error types for wander.

use thiserror::Error;

use crate::status::SearchStatus;

/// Main error type for wander operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A lifecycle or configuration call was made while the search was in a
    /// status that does not permit it.
    #[error("operation not allowed in status {actual}: {detail}")]
    BadStatus {
        /// Status the search was in when the call was made.
        actual: SearchStatus,
        /// What was attempted.
        detail: String,
    },

    /// The problem or neighbourhood cannot operate on the supplied solution.
    #[error("incompatible solution: {0}")]
    IncompatibleSolution(String),

    /// A move cannot be applied to (or undone on) the given solution.
    #[error("incompatible move: {0}")]
    IncompatibleMove(String),

    /// A delta evaluation disagreed with a full recomputation.
    #[error("incompatible delta evaluation: delta path yields {delta}, full recomputation yields {full}")]
    IncompatibleDeltaEvaluation {
        /// Value obtained through the delta path.
        delta: f64,
        /// Value obtained through full recomputation.
        full: f64,
    },

    /// A delta validation disagreed with a full recomputation.
    #[error("incompatible delta validation: delta path passed = {delta_passed}, full recomputation passed = {full_passed}")]
    IncompatibleDeltaValidation {
        /// Outcome obtained through the delta path.
        delta_passed: bool,
        /// Outcome obtained through full recomputation.
        full_passed: bool,
    },

    /// A listener was attached to a search it cannot observe.
    #[error("incompatible search listener: {0}")]
    IncompatibleSearchListener(String),

    /// A coordinating thread or one of its workers was interrupted.
    #[error("search was interrupted")]
    Interrupted,

    /// Strategy-specific failure.
    #[error("{0}")]
    Strategy(String),
}

impl SearchError {
    /// Shorthand for a [`SearchError::BadStatus`] error.
    pub fn bad_status(actual: SearchStatus, detail: impl Into<String>) -> Self {
        SearchError::BadStatus {
            actual,
            detail: detail.into(),
        }
    }
}

/// Result type alias for wander operations.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_status_formats_detail() {
        let err = SearchError::bad_status(SearchStatus::Running, "set neighbourhood");
        let msg = err.to_string();
        assert!(msg.contains("RUNNING"));
        assert!(msg.contains("set neighbourhood"));
    }

    #[test]
    fn delta_mismatch_reports_both_values() {
        let err = SearchError::IncompatibleDeltaEvaluation {
            delta: 1.5,
            full: 2.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("2.5"));
    }
}
