//! Built-in stop criteria.

use std::time::Duration;

use crate::progress::SearchSnapshot;

use super::StopCriterion;

/// Stops the search after a maximum wall-clock runtime.
///
/// Resolution is bounded by the stop-criterion check period.
#[derive(Debug, Clone)]
pub struct MaxRuntime {
    limit: Duration,
}

impl MaxRuntime {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl StopCriterion for MaxRuntime {
    fn search_should_stop(&self, snapshot: &SearchSnapshot) -> bool {
        snapshot.runtime >= self.limit
    }
}

/// Stops the search after a maximum number of completed steps.
#[derive(Debug, Clone)]
pub struct MaxSteps {
    limit: i64,
}

impl MaxSteps {
    /// # Panics
    ///
    /// Panics if `limit` is not strictly positive.
    pub fn new(limit: i64) -> Self {
        assert!(limit > 0, "maximum number of steps must be strictly positive");
        Self { limit }
    }
}

impl StopCriterion for MaxSteps {
    fn search_should_stop(&self, snapshot: &SearchSnapshot) -> bool {
        snapshot.steps >= self.limit
    }
}

/// Stops the search when the best solution has not improved for a maximum
/// number of steps.
#[derive(Debug, Clone)]
pub struct MaxStepsWithoutImprovement {
    limit: i64,
}

impl MaxStepsWithoutImprovement {
    /// # Panics
    ///
    /// Panics if `limit` is not strictly positive.
    pub fn new(limit: i64) -> Self {
        assert!(limit > 0, "step limit must be strictly positive");
        Self { limit }
    }
}

impl StopCriterion for MaxStepsWithoutImprovement {
    fn search_should_stop(&self, snapshot: &SearchSnapshot) -> bool {
        snapshot.steps_without_improvement >= self.limit
    }
}

/// Stops the search when the best solution has not improved for a maximum
/// amount of time.
#[derive(Debug, Clone)]
pub struct MaxTimeWithoutImprovement {
    limit: Duration,
}

impl MaxTimeWithoutImprovement {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl StopCriterion for MaxTimeWithoutImprovement {
    fn search_should_stop(&self, snapshot: &SearchSnapshot) -> bool {
        snapshot.time_without_improvement >= self.limit
    }
}

/// Stops the search when the smallest observed best-solution improvement
/// drops below a minimum delta.
#[derive(Debug, Clone)]
pub struct MinDelta {
    min_delta: f64,
}

impl MinDelta {
    /// # Panics
    ///
    /// Panics if `min_delta` is not strictly positive.
    pub fn new(min_delta: f64) -> Self {
        assert!(min_delta > 0.0, "minimum delta must be strictly positive");
        Self { min_delta }
    }
}

impl StopCriterion for MinDelta {
    fn search_should_stop(&self, snapshot: &SearchSnapshot) -> bool {
        snapshot
            .min_delta
            .is_some_and(|delta| delta < self.min_delta)
    }
}
