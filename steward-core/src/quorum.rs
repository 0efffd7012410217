//! Fault tolerance parameter and the validated search problem.

use thiserror::Error;

use crate::domain::{CatalogError, FaultCatalog, RawCatalog};

/// Quorum configuration rejected before any enumeration starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuorumError {
    #[error("{stewards} stewards allow f={max_f}; can't satisfy requested f={requested_f}")]
    FaultToleranceTooHigh {
        stewards: usize,
        requested_f: usize,
        max_f: usize,
    },
}

/// Anything that stops a raw catalog from becoming a [`SearchProblem`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProblemError {
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Quorum(#[from] QuorumError),
}

/// Number of stewards in a quorum that tolerates `f` faults, or `None` when
/// `3f + 1` does not fit in a `usize`.
pub const fn quorum_size(f: usize) -> Option<usize> {
    match f.checked_mul(3) {
        Some(v) => v.checked_add(1),
        None => None,
    }
}

/// Largest f a steward list of length `n` can support (`m = 3f+1 <= n`).
pub const fn max_f_for_steward_count(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n - 1) / 3
    }
}

/// Fault tolerance `f` and the quorum size derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quorum {
    f: usize,
    m: usize,
}

impl Quorum {
    /// `None` when `3f + 1` overflows.
    pub fn new(f: usize) -> Option<Self> {
        quorum_size(f).map(|m| Self { f, m })
    }

    pub fn f(&self) -> usize {
        self.f
    }

    /// Quorum size `m = 3f + 1`.
    pub fn m(&self) -> usize {
        self.m
    }
}

/// A catalog paired with an f it can satisfy. Read-only for the whole search.
#[derive(Debug, Clone)]
pub struct SearchProblem {
    catalog: FaultCatalog,
    quorum: Quorum,
}

impl SearchProblem {
    /// Pair a catalog with `f`, failing when `3f + 1` exceeds the steward count.
    pub fn new(catalog: FaultCatalog, f: usize) -> Result<Self, QuorumError> {
        let stewards = catalog.steward_count();
        match Quorum::new(f) {
            Some(quorum) if quorum.m() <= stewards => Ok(Self { catalog, quorum }),
            _ => Err(QuorumError::FaultToleranceTooHigh {
                stewards,
                requested_f: f,
                max_f: max_f_for_steward_count(stewards),
            }),
        }
    }

    /// Validate a raw catalog and use the f it declares.
    pub fn from_raw(raw: &RawCatalog) -> Result<Self, ProblemError> {
        let catalog = FaultCatalog::from_raw(raw)?;
        Ok(Self::new(catalog, raw.f)?)
    }

    pub fn catalog(&self) -> &FaultCatalog {
        &self.catalog
    }

    pub fn quorum(&self) -> Quorum {
        self.quorum
    }

    pub fn f(&self) -> usize {
        self.quorum.f()
    }

    pub fn m(&self) -> usize {
        self.quorum.m()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::reference_raw;

    #[test]
    fn quorum_size_is_three_f_plus_one() {
        for f in 0..20 {
            assert_eq!(Quorum::new(f).unwrap().m(), 3 * f + 1);
        }
    }

    #[test]
    fn quorum_size_overflow_is_none() {
        assert_eq!(quorum_size(usize::MAX / 3), None);
        assert_eq!(quorum_size(usize::MAX), None);
        assert_eq!(Quorum::new(usize::MAX / 3), None);
        assert_eq!(quorum_size(usize::MAX / 3 - 1), Some(usize::MAX - 2));
    }

    #[test]
    fn max_f_matches_steward_count() {
        assert_eq!(max_f_for_steward_count(0), 0);
        assert_eq!(max_f_for_steward_count(3), 0);
        assert_eq!(max_f_for_steward_count(4), 1);
        assert_eq!(max_f_for_steward_count(5), 1);
        assert_eq!(max_f_for_steward_count(7), 2);
    }

    #[test]
    fn accepts_supportable_f() {
        let problem = SearchProblem::from_raw(&reference_raw()).unwrap();
        assert_eq!(problem.f(), 1);
        assert_eq!(problem.m(), 4);
    }

    #[test]
    fn rejects_f_beyond_steward_count() {
        let catalog = FaultCatalog::from_raw(&reference_raw()).unwrap();
        let err = SearchProblem::new(catalog, 2).unwrap_err();
        assert_eq!(
            err,
            QuorumError::FaultToleranceTooHigh {
                stewards: 6,
                requested_f: 2,
                max_f: 1,
            }
        );
        assert_eq!(
            err.to_string(),
            "6 stewards allow f=1; can't satisfy requested f=2"
        );
    }

    #[test]
    fn rejects_f_whose_quorum_size_overflows() {
        for f in [usize::MAX / 3, usize::MAX / 2, usize::MAX] {
            let catalog = FaultCatalog::from_raw(&reference_raw()).unwrap();
            let err = SearchProblem::new(catalog, f).unwrap_err();
            assert_eq!(
                err,
                QuorumError::FaultToleranceTooHigh {
                    stewards: 6,
                    requested_f: f,
                    max_f: 1,
                }
            );
        }

        let mut raw = reference_raw();
        raw.f = usize::MAX / 3;
        assert!(matches!(
            SearchProblem::from_raw(&raw),
            Err(ProblemError::Quorum(_))
        ));
    }

    #[test]
    fn from_raw_surfaces_catalog_errors() {
        let mut raw = reference_raw();
        raw.likelihoods.pop();
        assert!(matches!(
            SearchProblem::from_raw(&raw),
            Err(ProblemError::Catalog(CatalogError::LikelihoodCountMismatch { .. }))
        ));
    }
}
