//! Bounded top-N retention with deferred sorting.
//!
//! A search offers tens of millions of candidates, almost all of which lose.
//! Keeping the list sorted on every insert would be wasted work, so [`BestN`]
//! only tracks the weakest held entry and replaces it when something better
//! arrives. The O(N) rescan for the new weakest entry happens lazily, on the next
//! offer that needs it, and the list is sorted once when it is read.
//!
//! While unsorted the held set is still the exact top N of everything offered;
//! only its order is stale.

use std::cmp::Ordering;
use thiserror::Error;

/// Default number of combos kept.
pub const DEFAULT_CAPACITY: usize = 10;

/// Upper bound on the capacity, to keep memory predictable.
pub const MAX_CAPACITY: usize = 10_000;

/// Total order used to rank entries: `Greater` means `self` is better.
pub trait Ranked {
    fn rank_cmp(&self, other: &Self) -> Ordering;
}

impl Ranked for f64 {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Ranked for i64 {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RetentionError {
    #[error("retention capacity must be between 1 and {max}, got {requested}")]
    InvalidCapacity { requested: usize, max: usize },
}

/// Outcome of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Held list was not full yet.
    Appended,
    /// Candidate displaced the weakest entry.
    Replaced,
    /// Candidate did not beat the weakest entry.
    Discarded,
}

/// The best `capacity` items offered so far.
#[derive(Debug, Clone)]
pub struct BestN<T> {
    items: Vec<T>,
    capacity: usize,
    /// Index of the weakest held item, `None` when it needs a rescan.
    worst: Option<usize>,
    sorted: bool,
    offered: u64,
}

impl<T: Ranked> BestN<T> {
    pub fn new(capacity: usize) -> Result<Self, RetentionError> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(RetentionError::InvalidCapacity {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(Self {
            items: Vec::with_capacity(capacity),
            capacity,
            worst: None,
            sorted: true,
            offered: 0,
        })
    }

    /// Keep `candidate` if it belongs in the top N.
    pub fn offer(&mut self, candidate: T) -> OfferOutcome {
        self.offered += 1;

        if self.items.len() < self.capacity {
            self.items.push(candidate);
            self.worst = None;
            self.sorted = false;
            return OfferOutcome::Appended;
        }

        let worst = self.worst_index_or_scan();
        if candidate.rank_cmp(&self.items[worst]) == Ordering::Greater {
            self.items[worst] = candidate;
            self.worst = None;
            self.sorted = false;
            OfferOutcome::Replaced
        } else {
            OfferOutcome::Discarded
        }
    }

    /// Held items, best first. Sorts at most once per batch of mutations.
    pub fn items(&mut self) -> &[T] {
        self.ensure_sorted();
        &self.items
    }

    /// Consume the structure, returning the held items best first.
    pub fn into_sorted(mut self) -> Vec<T> {
        self.ensure_sorted();
        self.items
    }

    /// The weakest held item and its current index.
    pub fn worst(&mut self) -> Option<(usize, &T)> {
        if self.items.is_empty() {
            return None;
        }
        let idx = self.worst_index_or_scan();
        Some((idx, &self.items[idx]))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of offers made, kept or not.
    pub fn offered(&self) -> u64 {
        self.offered
    }

    fn ensure_sorted(&mut self) {
        if self.sorted {
            return;
        }
        self.items.sort_by(|a, b| b.rank_cmp(a));
        self.worst = self.items.len().checked_sub(1);
        self.sorted = true;
    }

    fn worst_index_or_scan(&mut self) -> usize {
        if let Some(idx) = self.worst {
            return idx;
        }
        let mut idx = 0;
        for (i, item) in self.items.iter().enumerate().skip(1) {
            if item.rank_cmp(&self.items[idx]) == Ordering::Less {
                idx = i;
            }
        }
        self.worst = Some(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer_all<T: Ranked>(capacity: usize, values: impl IntoIterator<Item = T>) -> BestN<T> {
        let mut best = BestN::new(capacity).unwrap();
        for v in values {
            best.offer(v);
        }
        best
    }

    #[test]
    fn keeps_three_best_integers() {
        let mut best = offer_all(3, [3_i64, 10, 4, 11, 9]);
        assert_eq!(best.items(), &[11, 10, 9]);
        assert_eq!(best.worst(), Some((2, &9)));
        assert_eq!(best.offered(), 5);
    }

    #[test]
    fn handles_negative_scores() {
        let mut best = offer_all(3, [-10.0, -9.0, -3.14, 4.0, -1.0]);
        assert_eq!(best.items(), &[4.0, -1.0, -3.14]);
    }

    #[test]
    fn offer_outcomes() {
        let mut best = BestN::new(2).unwrap();
        assert_eq!(best.offer(5_i64), OfferOutcome::Appended);
        assert_eq!(best.offer(7), OfferOutcome::Appended);
        assert_eq!(best.offer(5), OfferOutcome::Discarded);
        assert_eq!(best.offer(6), OfferOutcome::Replaced);
        assert_eq!(best.offer(1), OfferOutcome::Discarded);
        assert_eq!(best.into_sorted(), vec![7, 6]);
    }

    #[test]
    fn fewer_offers_than_capacity() {
        let mut best = offer_all(10, [2_i64, 8, 5]);
        assert_eq!(best.len(), 3);
        assert_eq!(best.items(), &[8, 5, 2]);
    }

    #[test]
    fn reading_between_offers_stays_exact() {
        let mut best = BestN::new(3).unwrap();
        best.offer(1_i64);
        best.offer(2);
        assert_eq!(best.items(), &[2, 1]);
        best.offer(0);
        best.offer(5);
        assert_eq!(best.items(), &[5, 2, 1]);
        best.offer(3);
        assert_eq!(best.worst().map(|(_, v)| *v), Some(2));
        assert_eq!(best.into_sorted(), vec![5, 3, 2]);
    }

    #[test]
    fn capacity_bounds() {
        assert_eq!(
            BestN::<i64>::new(0).unwrap_err(),
            RetentionError::InvalidCapacity {
                requested: 0,
                max: MAX_CAPACITY
            }
        );
        assert!(BestN::<i64>::new(MAX_CAPACITY + 1).is_err());
        assert_eq!(BestN::<i64>::new(MAX_CAPACITY).unwrap().capacity(), MAX_CAPACITY);
    }

    #[test]
    fn empty_has_no_worst() {
        let mut best = BestN::<f64>::new(4).unwrap();
        assert!(best.is_empty());
        assert!(best.worst().is_none());
        assert!(best.items().is_empty());
    }
}
