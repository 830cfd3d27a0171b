//! Process-wide immutable constants.

/// Sentinel returned by move counters outside a valid observation window.
pub const INVALID_MOVE_COUNT: i64 = -1;

/// Sentinel returned by the step counter outside a valid observation window.
pub const INVALID_STEP_COUNT: i64 = -1;

/// Sentinel returned by time-span getters (in milliseconds) outside a valid
/// observation window.
pub const INVALID_TIME_SPAN: i64 = -1;

/// Sentinel returned by the minimum-delta getter outside a valid observation
/// window, or when no improvement has been made yet during the current run.
pub const INVALID_DELTA: f64 = -1.0;

/// Absolute tolerance used when verifying that an incremental (delta)
/// evaluation or validation agrees with a full recomputation.
pub const DELTA_TOLERANCE: f64 = 1e-10;
