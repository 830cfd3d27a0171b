//! Solution marker trait.

use std::fmt::Debug;

/// Marker trait for solution types.
///
/// The engine never introspects a solution: it only deep-copies it (`Clone`),
/// compares it structurally (`PartialEq`) and hands it to the problem and the
/// neighbourhood. Any owned, comparable type qualifies automatically.
pub trait Solution: Clone + PartialEq + Debug + Send + 'static {}

impl<T> Solution for T where T: Clone + PartialEq + Debug + Send + 'static {}
