//! Run progress published by the worker thread.
//!
//! The worker updates a small set of atomics after every step and every best
//! solution improvement. The stop-criterion checker thread derives a
//! [`SearchSnapshot`] from them without ever touching the search itself.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Point-in-time view of a running search, handed to stop criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSnapshot {
    /// Steps completed during the current run.
    pub steps: i64,
    /// Time elapsed since the current run started.
    pub runtime: Duration,
    /// Steps completed since the last best-solution improvement, or since
    /// the run started if no improvement has been made yet.
    pub steps_without_improvement: i64,
    /// Time elapsed since the last best-solution improvement, or since the
    /// run started if no improvement has been made yet.
    pub time_without_improvement: Duration,
    /// Smallest improvement in best evaluation observed during this run,
    /// if at least one best solution improved on a previous best.
    pub min_delta: Option<f64>,
}

/// Lock-free publication channel between worker and checker.
#[derive(Debug)]
pub(crate) struct RunProgress {
    active: AtomicBool,
    start: Mutex<Option<Instant>>,
    steps: AtomicI64,
    last_improvement_step: AtomicI64,
    last_improvement_millis: AtomicI64,
    min_delta_bits: AtomicU64,
}

impl RunProgress {
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            start: Mutex::new(None),
            steps: AtomicI64::new(0),
            last_improvement_step: AtomicI64::new(0),
            last_improvement_millis: AtomicI64::new(0),
            min_delta_bits: AtomicU64::new(f64::NAN.to_bits()),
        }
    }

    /// Resets all counters and marks the run as active.
    pub(crate) fn begin_run(&self) {
        *self.start.lock().unwrap() = Some(Instant::now());
        self.steps.store(0, Ordering::SeqCst);
        self.last_improvement_step.store(0, Ordering::SeqCst);
        self.last_improvement_millis.store(0, Ordering::SeqCst);
        self.min_delta_bits
            .store(f64::NAN.to_bits(), Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    /// Marks the run as over; subsequent snapshots return `None`.
    pub(crate) fn end_run(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub(crate) fn record_step(&self, steps: i64) {
        self.steps.store(steps, Ordering::SeqCst);
    }

    /// Records a best-solution improvement. `delta` is the sense-adjusted
    /// improvement over the previous best, if there was one.
    pub(crate) fn record_improvement(&self, steps: i64, delta: Option<f64>) {
        self.last_improvement_step.store(steps, Ordering::SeqCst);
        if let Some(start) = *self.start.lock().unwrap() {
            self.last_improvement_millis
                .store(start.elapsed().as_millis() as i64, Ordering::SeqCst);
        }
        if let Some(delta) = delta {
            let current = f64::from_bits(self.min_delta_bits.load(Ordering::SeqCst));
            if current.is_nan() || delta < current {
                self.min_delta_bits.store(delta.to_bits(), Ordering::SeqCst);
            }
        }
    }

    /// Builds a snapshot of the current run, or `None` when no run is active.
    pub(crate) fn snapshot(&self) -> Option<SearchSnapshot> {
        if !self.active.load(Ordering::SeqCst) {
            return None;
        }
        let start = (*self.start.lock().unwrap())?;
        let runtime = start.elapsed();
        let steps = self.steps.load(Ordering::SeqCst);
        let improvement_step = self.last_improvement_step.load(Ordering::SeqCst);
        let improvement_millis = self.last_improvement_millis.load(Ordering::SeqCst);
        let min_delta = f64::from_bits(self.min_delta_bits.load(Ordering::SeqCst));
        Some(SearchSnapshot {
            steps,
            runtime,
            steps_without_improvement: steps - improvement_step,
            time_without_improvement: runtime
                .saturating_sub(Duration::from_millis(improvement_millis.max(0) as u64)),
            min_delta: if min_delta.is_nan() {
                None
            } else {
                Some(min_delta)
            },
        })
    }
}
