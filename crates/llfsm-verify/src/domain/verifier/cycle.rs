//! Cycle Detection
//!
//! The detector is the only thing that makes exploration finite: a state
//! seen before closes its branch instead of spawning a new job.
//!
//! `in_cycle` takes `&self` so one detector can be shared by parallel
//! expansion workers; [`HashTableCycleDetector`] backs it with a
//! `DashSet`, whose insert is atomic per element.

use dashmap::DashSet;
use std::fmt;
use std::hash::Hash;

/// Recognises previously visited elements
pub trait CycleDetector {
    /// Element type being tracked
    type Element;

    /// Records `element`, returning true if it had already been recorded
    fn in_cycle(&self, element: &Self::Element) -> bool;

    /// Forgets every recorded element
    fn reset(&self);
}

/// Visited-set detector over a concurrent hash set
pub struct HashTableCycleDetector<E: Eq + Hash> {
    visited: DashSet<E>,
}

impl<E: Eq + Hash> HashTableCycleDetector<E> {
    /// Empty detector
    #[must_use]
    pub fn new() -> Self {
        Self {
            visited: DashSet::new(),
        }
    }

    /// Number of recorded elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    /// True when nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

impl<E: Eq + Hash> Default for HashTableCycleDetector<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Eq + Hash + Clone> CycleDetector for HashTableCycleDetector<E> {
    type Element = E;

    fn in_cycle(&self, element: &E) -> bool {
        !self.visited.insert(element.clone())
    }

    fn reset(&self) {
        self.visited.clear();
    }
}

impl<E: Eq + Hash> fmt::Debug for HashTableCycleDetector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTableCycleDetector")
            .field("visited", &self.visited.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_second_visit_is_cycle() {
        let detector = HashTableCycleDetector::new();
        assert!(!detector.in_cycle(&"a"));
        assert!(detector.in_cycle(&"a"));
        assert!(!detector.in_cycle(&"b"));
        assert_eq!(detector.len(), 2);

        detector.reset();
        assert!(detector.is_empty());
        assert!(!detector.in_cycle(&"a"));
    }

    #[test]
    fn test_concurrent_first_visit_wins_once() {
        let detector = Arc::new(HashTableCycleDetector::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let detector = Arc::clone(&detector);
                thread::spawn(move || (0..100u32).filter(|n| !detector.in_cycle(n)).count())
            })
            .collect();
        let first_visits: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(first_visits, 100);
    }
}
