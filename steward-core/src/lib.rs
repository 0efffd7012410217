//! Steward Core: catalog, enumeration, scoring and top-N retention.
//!
//! This crate is the search engine behind steward selection:
//! - Validated steward/scenario catalog and the fault tolerance `f` (quorum `m = 3f+1`)
//! - Lazy lexicographic enumeration of every m-sized steward subset, in batches
//! - Per-scenario downtime scoring and per-combo aggregation
//! - Bounded best-N retention that defers sorting to the end
//!
//! Nothing here spawns threads; see `steward-runner` for the parallel dispatcher.

pub mod combinations;
pub mod domain;
pub mod evaluator;
pub mod quorum;
pub mod retention;
pub mod scoring;
pub mod synthetic;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use combinations::{binomial, Batch, Batches, Combinations, Combo};
pub use domain::{CatalogError, FaultCatalog, RawCatalog, Scenario, Steward};
pub use evaluator::{evaluate_combo, evaluate_detailed, ComboBreakdown, ComboResult, EvalError};
pub use quorum::{
    max_f_for_steward_count, quorum_size, ProblemError, Quorum, QuorumError, SearchProblem,
};
pub use retention::{BestN, OfferOutcome, Ranked, RetentionError, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use scoring::{score_scenario, score_with_profile, ComboProfile, ScenarioOutcome};
pub use synthetic::synthetic_catalog;
