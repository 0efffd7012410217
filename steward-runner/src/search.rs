//! Parallel dispatcher: fan batches of combos out to a worker pool and fold the
//! results into a single best-N list.
//!
//! The coordinator pulls one wave of batches at a time from the enumerator,
//! evaluates the wave in parallel, then offers every result to the retention
//! structure on its own thread. Workers only read the catalog; they never see the
//! retention structure. A run either returns the complete ranking or an error.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use steward_core::{
    binomial, evaluate_combo, Batch, BestN, Combinations, ComboResult, EvalError, RetentionError,
    SearchProblem,
};

use crate::config::{ConfigError, SearchConfig};

/// Batches in flight per worker.
const BATCHES_PER_WORKER: usize = 4;

/// Errors from the dispatcher.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("retention error: {0}")]
    Retention(#[from] RetentionError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("batch {batch}: evaluating {combo} failed: {source}")]
    Evaluation {
        batch: usize,
        combo: String,
        #[source]
        source: EvalError,
    },

    #[error("search cancelled after {evaluated} combinations")]
    Cancelled { evaluated: u64 },
}

/// Progress update sent between waves.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchProgress {
    pub waves_complete: usize,
    pub batches_complete: usize,
    pub evaluated: u64,
    /// `None` when C(n, m) does not fit in a `u128`.
    pub total: Option<u128>,
    pub retained: usize,
    pub elapsed_secs: f64,
}

impl SearchProgress {
    /// Fraction of combos evaluated, when the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some(self.evaluated as f64 / total as f64),
            None => None,
        }
    }
}

/// Final result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best combos, best first.
    pub ranked: Vec<ComboResult>,
    pub evaluated: u64,
    pub total: Option<u128>,
    pub f: usize,
    pub m: usize,
    pub elapsed_secs: f64,
}

/// Runs the exhaustive search, in a worker pool or on the calling thread.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    best: usize,
    batch_size: usize,
    workers: usize,
    parallel: bool,
}

impl Dispatcher {
    /// Validate `config` and build a dispatcher from it. `config.serial`
    /// disables the worker pool.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            best: config.best,
            batch_size: config.batch_size,
            workers: config.effective_workers(),
            parallel: !config.serial,
        })
    }

    /// Enables or disables the worker pool. Serial runs produce identical rankings.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn workers(&self) -> usize {
        if self.parallel {
            self.workers
        } else {
            1
        }
    }

    /// Search every m-sized subset of the catalog's stewards.
    ///
    /// # Arguments
    /// - `problem`: validated catalog and quorum.
    /// - `progress_cb`: optional callback, throttled to ~500ms plus one final call.
    /// - `cancel`: optional flag checked between waves; setting it aborts the run.
    pub fn search(
        &self,
        problem: &SearchProblem,
        progress_cb: Option<&dyn Fn(&SearchProgress)>,
        cancel: Option<&AtomicBool>,
    ) -> Result<SearchOutcome, SearchError> {
        let start = Instant::now();
        let n = problem.catalog().steward_count();
        let m = problem.m();
        let total = binomial(n, m);

        let mut best = BestN::new(self.best)?;
        let pool = if self.parallel {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.workers)
                    .thread_name(|i| format!("steward-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        let wave_len = self.workers() * BATCHES_PER_WORKER;

        info!(
            n,
            m,
            f = problem.f(),
            workers = self.workers(),
            batch_size = self.batch_size,
            "starting search"
        );

        let mut batches = Combinations::new(n, m).batches(self.batch_size);
        let mut evaluated: u64 = 0;
        let mut waves_complete = 0;
        let mut batches_complete = 0;
        let mut last_progress = Instant::now();

        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                warn!(evaluated, "search cancelled");
                return Err(SearchError::Cancelled { evaluated });
            }

            let wave: Vec<Batch> = batches.by_ref().take(wave_len).collect();
            if wave.is_empty() {
                break;
            }
            let wave_batches = wave.len();

            let results: Vec<Vec<ComboResult>> = match &pool {
                Some(pool) => pool.install(|| {
                    wave.into_par_iter()
                        .map(|batch| evaluate_batch(problem, batch))
                        .collect::<Result<Vec<_>, SearchError>>()
                })?,
                None => wave
                    .into_iter()
                    .map(|batch| evaluate_batch(problem, batch))
                    .collect::<Result<Vec<_>, SearchError>>()?,
            };

            for result in results.into_iter().flatten() {
                evaluated += 1;
                best.offer(result);
            }
            waves_complete += 1;
            batches_complete += wave_batches;

            debug!(
                wave = waves_complete,
                batches = wave_batches,
                evaluated,
                retained = best.len(),
                "wave complete"
            );

            if let Some(cb) = progress_cb {
                if last_progress.elapsed().as_millis() >= 500 || waves_complete == 1 {
                    cb(&SearchProgress {
                        waves_complete,
                        batches_complete,
                        evaluated,
                        total,
                        retained: best.len(),
                        elapsed_secs: start.elapsed().as_secs_f64(),
                    });
                    last_progress = Instant::now();
                }
            }
        }

        let elapsed_secs = start.elapsed().as_secs_f64();
        if let Some(cb) = progress_cb {
            cb(&SearchProgress {
                waves_complete,
                batches_complete,
                evaluated,
                total,
                retained: best.len(),
                elapsed_secs,
            });
        }
        info!(evaluated, elapsed_secs, "search finished");

        Ok(SearchOutcome {
            ranked: best.into_sorted(),
            evaluated,
            total,
            f: problem.f(),
            m,
            elapsed_secs,
        })
    }
}

fn evaluate_batch(problem: &SearchProblem, batch: Batch) -> Result<Vec<ComboResult>, SearchError> {
    let index = batch.index;
    batch
        .combos
        .into_iter()
        .map(|combo| {
            evaluate_combo(problem, combo).map_err(|source| SearchError::Evaluation {
                batch: index,
                combo: problem.catalog().combo_label(source.combo().members()),
                source,
            })
        })
        .collect()
}
