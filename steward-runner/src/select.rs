//! Selection pipeline: load a catalog, resolve f, run the search.
//!
//! Two entry points:
//! - `select_from_file()`: loads the catalog from disk first. Used by the CLI.
//! - `select()`: takes an already-loaded `RawCatalog`.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use thiserror::Error;
use tracing::{info, warn};

use steward_core::{
    binomial, max_f_for_steward_count, CatalogError, FaultCatalog, QuorumError, RawCatalog,
    SearchProblem,
};

use crate::config::{FSelection, SearchConfig};
use crate::loader::{load_catalog, LoadError};
use crate::search::{Dispatcher, SearchError, SearchOutcome, SearchProgress};

/// Errors from the selection pipeline.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Quorum(#[from] QuorumError),
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// A finished selection: the problem that was searched and its ranking.
#[derive(Debug, Clone)]
pub struct Selection {
    pub problem: SearchProblem,
    pub outcome: SearchOutcome,
}

/// Turn an f selection into a concrete f. The result is not yet checked
/// against the steward count; [`SearchProblem::new`] does that.
pub fn resolve_f(selection: FSelection, file_f: usize, steward_count: usize) -> usize {
    match selection {
        FSelection::Max => max_f_for_steward_count(steward_count),
        FSelection::FromFile if file_f > 0 => file_f,
        FSelection::FromFile => {
            warn!("data file declares no f; using f=0");
            0
        }
        FSelection::Exact(f) => f,
    }
}

/// Validate `raw` and build the problem for the f that `selection` asks for.
pub fn prepare(raw: &RawCatalog, selection: FSelection) -> Result<SearchProblem, SelectError> {
    let catalog = FaultCatalog::from_raw(raw)?;
    let f = resolve_f(selection, raw.f, catalog.steward_count());
    Ok(SearchProblem::new(catalog, f)?)
}

/// Human-readable combination count; `None` means it overflowed.
pub fn total_label(total: Option<u128>) -> String {
    match total {
        Some(total) => total.to_string(),
        None => "more than 2^128".to_string(),
    }
}

/// Run the full search over an already-loaded catalog.
pub fn select(
    raw: &RawCatalog,
    config: &SearchConfig,
    progress_cb: Option<&dyn Fn(&SearchProgress)>,
    cancel: Option<&AtomicBool>,
) -> Result<Selection, SelectError> {
    let dispatcher = Dispatcher::new(config)?;
    let problem = prepare(raw, config.f)?;

    let n = problem.catalog().steward_count();
    info!(
        "Analyzing {} total {}-steward combinations (n={}, f={})",
        total_label(binomial(n, problem.m())),
        problem.m(),
        n,
        problem.f()
    );

    let outcome = dispatcher.search(&problem, progress_cb, cancel)?;
    Ok(Selection { problem, outcome })
}

/// Load the catalog at `path`, then [`select`].
pub fn select_from_file(
    path: &Path,
    config: &SearchConfig,
    progress_cb: Option<&dyn Fn(&SearchProgress)>,
    cancel: Option<&AtomicBool>,
) -> Result<Selection, SelectError> {
    let raw = load_catalog(path)?;
    select(&raw, config, progress_cb, cancel)
}
