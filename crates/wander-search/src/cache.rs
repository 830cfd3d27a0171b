//! Evaluated-move caches.
//!
//! A neighbourhood search often evaluates or validates the same move more
//! than once from the same current solution — e.g. when a strategy first
//! screens moves and then accepts the winner. The cache memoizes move
//! evaluations and validations keyed by move equality, and is cleared
//! whenever the current solution changes.

use std::collections::HashMap;
use std::hash::Hash;

/// Memo from move to evaluation and validation, valid for the current
/// solution only.
///
/// Implementations never verify the current solution themselves: the owning
/// search guarantees a [`clear`](EvaluatedMoveCache::clear) on every
/// current-solution change.
pub trait EvaluatedMoveCache<M, E, V>: Send {
    /// Cached evaluation of the given move, if available.
    fn cached_evaluation(&self, mv: &M) -> Option<E>;

    /// Offers the evaluation of a move to the cache.
    fn cache_evaluation(&mut self, mv: M, evaluation: E);

    /// Cached validation of the given move, if available.
    fn cached_validation(&self, mv: &M) -> Option<V>;

    /// Offers the validation of a move to the cache.
    fn cache_validation(&mut self, mv: M, validation: V);

    /// Drops all cached values. Idempotent.
    fn clear(&mut self);
}

/// Cache policy of a neighbourhood search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Remember the single most recently offered move. O(1) space.
    #[default]
    SingleEntry,
    /// Remember every offered move until the cache is cleared.
    Unbounded,
    /// Do not cache at all.
    None,
}

impl CachePolicy {
    /// Builds the cache implementing this policy, or `None` for
    /// [`CachePolicy::None`].
    pub(crate) fn build<M, E, V>(self) -> Option<Box<dyn EvaluatedMoveCache<M, E, V>>>
    where
        M: Eq + Hash + Send + 'static,
        E: Clone + Send + 'static,
        V: Clone + Send + 'static,
    {
        match self {
            CachePolicy::SingleEntry => Some(Box::new(SingleEntryCache::new())),
            CachePolicy::Unbounded => Some(Box::new(UnboundedCache::new())),
            CachePolicy::None => None,
        }
    }
}

/// Cache holding at most one move with its evaluation and validation.
///
/// Offering a value for a different move evicts the stored entry entirely.
#[derive(Debug)]
pub struct SingleEntryCache<M, E, V> {
    entry: Option<(M, Option<E>, Option<V>)>,
}

impl<M: Eq, E: Clone, V: Clone> SingleEntryCache<M, E, V> {
    pub fn new() -> Self {
        Self { entry: None }
    }
}

impl<M: Eq, E: Clone, V: Clone> Default for SingleEntryCache<M, E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, E, V> EvaluatedMoveCache<M, E, V> for SingleEntryCache<M, E, V>
where
    M: Eq + Send,
    E: Clone + Send,
    V: Clone + Send,
{
    fn cached_evaluation(&self, mv: &M) -> Option<E> {
        match &self.entry {
            Some((cached, evaluation, _)) if cached == mv => evaluation.clone(),
            _ => None,
        }
    }

    fn cache_evaluation(&mut self, mv: M, evaluation: E) {
        match &mut self.entry {
            Some((cached, slot, _)) if *cached == mv => *slot = Some(evaluation),
            _ => self.entry = Some((mv, Some(evaluation), None)),
        }
    }

    fn cached_validation(&self, mv: &M) -> Option<V> {
        match &self.entry {
            Some((cached, _, validation)) if cached == mv => validation.clone(),
            _ => None,
        }
    }

    fn cache_validation(&mut self, mv: M, validation: V) {
        match &mut self.entry {
            Some((cached, _, slot)) if *cached == mv => *slot = Some(validation),
            _ => self.entry = Some((mv, None, Some(validation))),
        }
    }

    fn clear(&mut self) {
        self.entry = None;
    }
}

/// Cache holding every offered move until cleared.
#[derive(Debug)]
pub struct UnboundedCache<M, E, V> {
    entries: HashMap<M, (Option<E>, Option<V>)>,
}

impl<M: Eq + Hash, E: Clone, V: Clone> UnboundedCache<M, E, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<M: Eq + Hash, E: Clone, V: Clone> Default for UnboundedCache<M, E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, E, V> EvaluatedMoveCache<M, E, V> for UnboundedCache<M, E, V>
where
    M: Eq + Hash + Send,
    E: Clone + Send,
    V: Clone + Send,
{
    fn cached_evaluation(&self, mv: &M) -> Option<E> {
        self.entries.get(mv).and_then(|(e, _)| e.clone())
    }

    fn cache_evaluation(&mut self, mv: M, evaluation: E) {
        self.entries.entry(mv).or_insert((None, None)).0 = Some(evaluation);
    }

    fn cached_validation(&self, mv: &M) -> Option<V> {
        self.entries.get(mv).and_then(|(_, v)| v.clone())
    }

    fn cache_validation(&mut self, mv: M, validation: V) {
        self.entries.entry(mv).or_insert((None, None)).1 = Some(validation);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
