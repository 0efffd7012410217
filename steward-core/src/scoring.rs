//! Per-scenario downtime scoring of a candidate quorum.
//!
//! For a combo and one scenario:
//! - `failure_distance = f - fault_count`. Negative means the quorum lost consensus.
//! - Broken quorum: consensus returns once `k = -failure_distance` faulted members
//!   are repaired. Members are assumed to come back fastest first, so the scenario's
//!   `mttr` is the k-th smallest repair time in the combo and
//!   `importance = likelihood * mttr`.
//! - Held quorum: `mttr = 0` and `importance = likelihood * mean repair time`,
//!   a rough stand-in for ambient downtime risk.
//! - `score = importance * failure_distance`. Larger is better.
//!
//! The sorted repair times and their mean depend only on the combo, so they are
//! computed once in a [`ComboProfile`] and reused for every scenario.

use serde::Serialize;

use crate::domain::FaultCatalog;
use crate::quorum::Quorum;

/// Scenario-independent facts about a combo's members.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboProfile {
    sorted_repair_times: Vec<f64>,
    mean_repair_time: f64,
}

impl ComboProfile {
    /// Build the profile for `members`. Member order does not matter.
    pub fn new(catalog: &FaultCatalog, members: &[usize]) -> Self {
        let stewards = catalog.stewards();
        let mut sorted_repair_times: Vec<f64> =
            members.iter().map(|&i| stewards[i].repair_time).collect();
        sorted_repair_times.sort_by(f64::total_cmp);
        let mean_repair_time = if sorted_repair_times.is_empty() {
            0.0
        } else {
            sorted_repair_times.iter().sum::<f64>() / sorted_repair_times.len() as f64
        };
        Self {
            sorted_repair_times,
            mean_repair_time,
        }
    }

    pub fn sorted_repair_times(&self) -> &[f64] {
        &self.sorted_repair_times
    }

    pub fn mean_repair_time(&self) -> f64 {
        self.mean_repair_time
    }
}

/// Derived figures for one combo in one scenario. Never stored past evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: usize,
    pub fault_count: usize,
    pub failure_distance: i64,
    pub mttr: f64,
    pub importance: f64,
    pub score: f64,
}

impl ScenarioOutcome {
    pub fn quorum_broken(&self) -> bool {
        self.failure_distance < 0
    }
}

/// Number of `members` that fault in `scenario`.
pub fn fault_count(catalog: &FaultCatalog, members: &[usize], scenario: usize) -> usize {
    let stewards = catalog.stewards();
    members
        .iter()
        .filter(|&&i| stewards[i].faults_in(scenario))
        .count()
}

/// Counts here are bounded by the steward count, so saturation never kicks in
/// for a validated problem.
fn signed(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Score `members` against one scenario, using a precomputed profile.
pub fn score_with_profile(
    catalog: &FaultCatalog,
    quorum: Quorum,
    members: &[usize],
    profile: &ComboProfile,
    scenario: usize,
) -> ScenarioOutcome {
    let likelihood = catalog.scenarios()[scenario].likelihood;
    let fault_count = fault_count(catalog, members, scenario);
    let failure_distance = signed(quorum.f()) - signed(fault_count);

    let (mttr, importance) = if failure_distance < 0 {
        // fault_count <= m, so k never exceeds the member count.
        let k = failure_distance.unsigned_abs() as usize;
        let mttr = profile.sorted_repair_times[k - 1];
        (mttr, likelihood * mttr)
    } else {
        (0.0, likelihood * profile.mean_repair_time)
    };

    ScenarioOutcome {
        scenario,
        fault_count,
        failure_distance,
        mttr,
        importance,
        score: importance * failure_distance as f64,
    }
}

/// Score `members` against one scenario.
pub fn score_scenario(
    catalog: &FaultCatalog,
    quorum: Quorum,
    members: &[usize],
    scenario: usize,
) -> ScenarioOutcome {
    let profile = ComboProfile::new(catalog, members);
    score_with_profile(catalog, quorum, members, &profile, scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawCatalog;
    use crate::quorum::SearchProblem;
    use crate::test_helpers::reference_problem;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn broken_quorum_uses_kth_fastest_repair() {
        let problem = reference_problem(1);
        // Stewards A, C, D, E: repair times 6, 8, 9, 10. In scenario b, A, D and E fault.
        let outcome = score_scenario(problem.catalog(), problem.quorum(), &[0, 2, 3, 4], 1);
        assert_eq!(outcome.scenario, 1);
        assert_eq!(outcome.fault_count, 3);
        assert_eq!(outcome.failure_distance, -2);
        assert!(outcome.quorum_broken());
        assert!(close(outcome.mttr, 8.0));
        assert!(close(outcome.importance, 3.2));
        assert!(close(outcome.score, -6.4));
    }

    #[test]
    fn one_fault_past_tolerance_uses_fastest_repair() {
        let problem = reference_problem(1);
        // A, B, C, D in scenario a: B and D fault.
        let outcome = score_scenario(problem.catalog(), problem.quorum(), &[0, 1, 2, 3], 0);
        assert_eq!(outcome.fault_count, 2);
        assert_eq!(outcome.failure_distance, -1);
        assert!(close(outcome.mttr, 6.0));
        assert!(close(outcome.importance, 3.0));
        assert!(close(outcome.score, -3.0));
    }

    #[test]
    fn two_faults_in_b_restore_with_first_repair() {
        let problem = reference_problem(1);
        // A, B, E, F in scenario b: A and E fault.
        let outcome = score_scenario(problem.catalog(), problem.quorum(), &[0, 1, 4, 5], 1);
        assert_eq!(outcome.fault_count, 2);
        assert_eq!(outcome.failure_distance, -1);
        assert!(close(outcome.mttr, 6.0));
        assert!(close(outcome.importance, 2.4));
        assert!(close(outcome.score, -2.4));
    }

    #[test]
    fn held_quorum_uses_mean_repair_time() {
        let problem = reference_problem(1);
        // A, B, C, E in scenario c: only A faults.
        let outcome = score_scenario(problem.catalog(), problem.quorum(), &[0, 1, 2, 4], 2);
        assert_eq!(outcome.fault_count, 1);
        assert_eq!(outcome.failure_distance, 0);
        assert!(!outcome.quorum_broken());
        assert_eq!(outcome.mttr, 0.0);
        assert!(close(outcome.importance, 0.3 * 7.75));
        assert_eq!(outcome.score, 0.0);

        let problem = reference_problem(0);
        let outcome = score_scenario(problem.catalog(), problem.quorum(), &[2], 1);
        assert_eq!(outcome.failure_distance, 0);
        assert!(close(outcome.importance, 0.4 * 8.0));
    }

    #[test]
    fn positive_margin_is_rewarded() {
        let raw = RawCatalog {
            f: 1,
            scenario_names: vec!["calm".into()],
            likelihoods: vec![0.5],
            steward_names: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            repair_times: vec![2.0, 4.0, 6.0, 8.0],
            fault_matrix: vec![vec![0], vec![0], vec![0], vec![0]],
        };
        let problem = SearchProblem::from_raw(&raw).unwrap();
        let outcome = score_scenario(problem.catalog(), problem.quorum(), &[0, 1, 2, 3], 0);
        assert_eq!(outcome.fault_count, 0);
        assert_eq!(outcome.failure_distance, 1);
        assert!(close(outcome.importance, 2.5));
        assert!(close(outcome.score, 2.5));
    }

    #[test]
    fn member_order_does_not_matter() {
        let problem = reference_problem(1);
        let a = score_scenario(problem.catalog(), problem.quorum(), &[0, 2, 3, 4], 1);
        let b = score_scenario(problem.catalog(), problem.quorum(), &[4, 3, 0, 2], 1);
        assert_eq!(a, b);
    }

    #[test]
    fn profile_is_sorted() {
        let problem = reference_problem(1);
        let profile = ComboProfile::new(problem.catalog(), &[5, 0, 3, 1]);
        assert_eq!(profile.sorted_repair_times(), &[6.0, 7.0, 9.0, 11.0]);
        assert!(close(profile.mean_repair_time(), 8.25));
    }
}
