//! Lexicographic enumeration of m-element steward subsets.
//!
//! [`Combinations`] walks every subset of `0..n` of size `m` with an explicit
//! index vector, so memory stays `O(m)` however large `C(n, m)` gets. The
//! sequence is finite and deterministic: building a new enumerator (or cloning
//! one) replays exactly the same subsets, and [`Combinations::batches`] cuts it
//! into identical contiguous batches on every run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate quorum: steward indices in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Combo(Vec<usize>);

impl Combo {
    /// Canonicalize arbitrary member order.
    pub fn new(mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self(members)
    }

    pub fn members(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// Exact `C(n, k)`, or `None` if it does not fit in a `u128`.
pub fn binomial(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is divisible by (i + 1) at every step.
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    Some(acc)
}

/// Iterator over all size-`m` subsets of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    exhausted: bool,
}

impl Combinations {
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            n,
            indices: (0..m).collect(),
            exhausted: m > n,
        }
    }

    /// Cut the remaining sequence into batches of at most `size` combos.
    pub fn batches(self, size: usize) -> Batches {
        Batches {
            inner: self,
            size: size.max(1),
            next_index: 0,
        }
    }

    fn advance(&mut self) {
        let m = self.indices.len();
        // Rightmost position that can still move right.
        let mut pos = m;
        while pos > 0 {
            pos -= 1;
            if self.indices[pos] < self.n - m + pos {
                self.indices[pos] += 1;
                for j in pos + 1..m {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return;
            }
        }
        self.exhausted = true;
    }
}

impl Iterator for Combinations {
    type Item = Combo;

    fn next(&mut self) -> Option<Combo> {
        if self.exhausted {
            return None;
        }
        let current = Combo(self.indices.clone());
        self.advance();
        Some(current)
    }
}

/// A contiguous run of combos, tagged with its position in the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub index: usize,
    pub combos: Vec<Combo>,
}

/// Batching adapter returned by [`Combinations::batches`].
#[derive(Debug, Clone)]
pub struct Batches {
    inner: Combinations,
    size: usize,
    next_index: usize,
}

impl Iterator for Batches {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let combos: Vec<Combo> = self.inner.by_ref().take(self.size).collect();
        if combos.is_empty() {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some(Batch { index, combos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn members(n: usize, m: usize) -> Vec<Vec<usize>> {
        Combinations::new(n, m).map(|c| c.members().to_vec()).collect()
    }

    #[test]
    fn four_choose_two() {
        assert_eq!(
            members(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn edge_sizes() {
        assert_eq!(members(5, 0), vec![Vec::<usize>::new()]);
        assert_eq!(members(0, 0), vec![Vec::<usize>::new()]);
        assert_eq!(members(4, 4), vec![vec![0, 1, 2, 3]]);
        assert!(members(3, 4).is_empty());
    }

    #[test]
    fn count_matches_binomial_and_is_unique() {
        for n in 0..10 {
            for m in 0..=n + 1 {
                let all = members(n, m);
                assert_eq!(all.len() as u128, binomial(n, m).unwrap(), "n={n} m={m}");
                let unique: HashSet<_> = all.iter().collect();
                assert_eq!(unique.len(), all.len());
                assert!(all.iter().all(|c| c.len() == m));
                assert!(all.iter().all(|c| c.windows(2).all(|w| w[0] < w[1])));
            }
        }
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(4, 2), Some(6));
        assert_eq!(binomial(9, 4), Some(126));
        assert_eq!(binomial(3, 5), Some(0));
        assert_eq!(binomial(20, 10), Some(184_756));
        assert_eq!(binomial(60, 30), Some(118_264_581_564_861_424));
        assert_eq!(binomial(1000, 500), None);
    }

    #[test]
    fn batches_are_contiguous_and_restartable() {
        let batches: Vec<Batch> = Combinations::new(7, 3).batches(10).collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches.iter().map(|b| b.combos.len()).sum::<usize>(), 35);
        assert_eq!(batches[3].combos.len(), 5);
        assert!(batches.iter().enumerate().all(|(i, b)| b.index == i));

        let flat: Vec<Combo> = batches.iter().flat_map(|b| b.combos.clone()).collect();
        let direct: Vec<Combo> = Combinations::new(7, 3).collect();
        assert_eq!(flat, direct);

        let again: Vec<Batch> = Combinations::new(7, 3).batches(10).collect();
        assert_eq!(batches, again);
    }

    #[test]
    fn combo_new_canonicalizes() {
        assert_eq!(Combo::new(vec![4, 0, 2]).members(), &[0, 2, 4]);
        assert_eq!(Combo::new(vec![3, 1]).to_string(), "[1,3]");
    }
}
