//! Shared fixtures for unit tests.

use crate::domain::{FaultCatalog, RawCatalog};
use crate::quorum::SearchProblem;

/// Six stewards A-F with repair times 6..=11 and three scenarios a/b/c.
pub(crate) fn reference_raw() -> RawCatalog {
    RawCatalog {
        f: 1,
        scenario_names: vec!["a".into(), "b".into(), "c".into()],
        likelihoods: vec![0.5, 0.4, 0.3],
        steward_names: ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        repair_times: vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0],
        fault_matrix: vec![
            vec![0, 1, 1],
            vec![1, 0, 0],
            vec![0, 0, 0],
            vec![1, 1, 1],
            vec![0, 1, 0],
            vec![1, 0, 1],
        ],
    }
}

pub(crate) fn reference_problem(f: usize) -> SearchProblem {
    let catalog = FaultCatalog::from_raw(&reference_raw()).unwrap();
    SearchProblem::new(catalog, f).unwrap()
}
