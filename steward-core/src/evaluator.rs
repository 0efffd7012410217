//! Combo evaluation: sum of per-scenario scores.

use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

use crate::combinations::Combo;
use crate::quorum::SearchProblem;
use crate::retention::Ranked;
use crate::scoring::{score_with_profile, ComboProfile, ScenarioOutcome};

/// Evaluation of a single combo failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("combo {combo} has {found} member(s), expected {expected}")]
    WrongSize {
        combo: Combo,
        expected: usize,
        found: usize,
    },

    #[error("combo {combo} references steward index {index}, catalog has {stewards}")]
    UnknownSteward {
        combo: Combo,
        index: usize,
        stewards: usize,
    },

    #[error("combo {combo} reached non-finite score {value} at scenario {scenario}")]
    NonFiniteScore {
        combo: Combo,
        scenario: usize,
        value: f64,
    },
}

impl EvalError {
    /// The combo that failed to evaluate.
    pub fn combo(&self) -> &Combo {
        match self {
            EvalError::WrongSize { combo, .. }
            | EvalError::UnknownSteward { combo, .. }
            | EvalError::NonFiniteScore { combo, .. } => combo,
        }
    }
}

/// A combo and its combined score, the unit kept by the retention structure.
///
/// The score is fixed at construction; a result is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboResult {
    combo: Combo,
    combined_score: f64,
}

impl ComboResult {
    pub fn new(combo: Combo, combined_score: f64) -> Self {
        Self {
            combo,
            combined_score,
        }
    }

    pub fn combo(&self) -> &Combo {
        &self.combo
    }

    pub fn combined_score(&self) -> f64 {
        self.combined_score
    }
}

impl Ranked for ComboResult {
    /// Higher combined score wins; equal scores fall back to the
    /// lexicographically smaller combo.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.combined_score
            .total_cmp(&other.combined_score)
            .then_with(|| other.combo.cmp(&self.combo))
    }
}

/// A combo result together with every per-scenario outcome that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboBreakdown {
    pub result: ComboResult,
    pub outcomes: Vec<ScenarioOutcome>,
}

fn check_members(problem: &SearchProblem, combo: &Combo) -> Result<(), EvalError> {
    if combo.len() != problem.m() {
        return Err(EvalError::WrongSize {
            combo: combo.clone(),
            expected: problem.m(),
            found: combo.len(),
        });
    }
    let stewards = problem.catalog().steward_count();
    if let Some(&index) = combo.members().iter().find(|&&i| i >= stewards) {
        return Err(EvalError::UnknownSteward {
            combo: combo.clone(),
            index,
            stewards,
        });
    }
    Ok(())
}

/// Score `combo` against every scenario and sum the results.
///
/// Scenarios are summed in index order, so the same combo always gets the
/// bit-identical score.
pub fn evaluate_combo(problem: &SearchProblem, combo: Combo) -> Result<ComboResult, EvalError> {
    check_members(problem, &combo)?;
    let catalog = problem.catalog();
    let members = combo.members();
    let profile = ComboProfile::new(catalog, members);

    let mut total = 0.0;
    for scenario in 0..catalog.scenario_count() {
        let outcome = score_with_profile(catalog, problem.quorum(), members, &profile, scenario);
        total += outcome.score;
        if !total.is_finite() {
            return Err(EvalError::NonFiniteScore {
                combo,
                scenario,
                value: total,
            });
        }
    }
    Ok(ComboResult::new(combo, total))
}

/// Like [`evaluate_combo`], keeping the per-scenario outcomes.
pub fn evaluate_detailed(
    problem: &SearchProblem,
    combo: Combo,
) -> Result<ComboBreakdown, EvalError> {
    check_members(problem, &combo)?;
    let catalog = problem.catalog();
    let profile = ComboProfile::new(catalog, combo.members());
    let outcomes: Vec<ScenarioOutcome> = (0..catalog.scenario_count())
        .map(|scenario| {
            score_with_profile(catalog, problem.quorum(), combo.members(), &profile, scenario)
        })
        .collect();
    let mut total = 0.0;
    for outcome in &outcomes {
        total += outcome.score;
        if !total.is_finite() {
            return Err(EvalError::NonFiniteScore {
                combo,
                scenario: outcome.scenario,
                value: total,
            });
        }
    }
    Ok(ComboBreakdown {
        result: ComboResult::new(combo, total),
        outcomes,
    })
}
