//! Steward catalog: stewards, fault scenarios, and the validated view the search reads.
//!
//! A [`RawCatalog`] is the loosely-typed structure produced by a loader (parallel
//! name/value vectors plus a 0/1 fault matrix). [`FaultCatalog::from_raw`] checks
//! every dimension and value once, up front, so the scoring hot path can index
//! without further checks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors found while validating a raw catalog.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog has no stewards")]
    NoStewards,

    #[error("catalog has no scenarios")]
    NoScenarios,

    #[error("{scenarios} scenario(s) but {likelihoods} likelihood(s)")]
    LikelihoodCountMismatch { scenarios: usize, likelihoods: usize },

    #[error("{stewards} steward(s) but {repair_times} repair time(s)")]
    RepairTimeCountMismatch { stewards: usize, repair_times: usize },

    #[error("{stewards} steward(s) but {rows} fault row(s)")]
    FaultRowCountMismatch { stewards: usize, rows: usize },

    #[error("steward '{steward}' has {found} fault flag(s), expected {expected}")]
    FaultRowLength {
        steward: String,
        expected: usize,
        found: usize,
    },

    #[error("steward '{steward}' has fault flag {value} for scenario '{scenario}' (must be 0 or 1)")]
    InvalidFaultFlag {
        steward: String,
        scenario: String,
        value: u8,
    },

    #[error("steward '{steward}' has repair time {value} (must be finite and positive)")]
    InvalidRepairTime { steward: String, value: f64 },

    #[error("scenario '{scenario}' has likelihood {value} (must be within [0, 1])")]
    InvalidLikelihood { scenario: String, value: f64 },

    #[error("duplicate steward name '{0}'")]
    DuplicateSteward(String),

    #[error("duplicate scenario name '{0}'")]
    DuplicateScenario(String),
}

/// A voting node that may be picked into a quorum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Steward {
    pub name: String,
    /// Mean time to repair after a fault.
    pub repair_time: f64,
    /// One flag per scenario, aligned with [`FaultCatalog::scenarios`].
    pub faults: Vec<bool>,
}

impl Steward {
    pub fn faults_in(&self, scenario: usize) -> bool {
        self.faults[scenario]
    }
}

/// A named fault pattern with a per-period probability of occurring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub likelihood: f64,
}

/// Parsed but unvalidated catalog, as handed over by a loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCatalog {
    /// Fault tolerance declared by the source (0 when it declares none).
    #[serde(default)]
    pub f: usize,
    pub scenario_names: Vec<String>,
    pub likelihoods: Vec<f64>,
    pub steward_names: Vec<String>,
    pub repair_times: Vec<f64>,
    /// `steward_names.len()` rows of `scenario_names.len()` flags, each 0 or 1.
    pub fault_matrix: Vec<Vec<u8>>,
}

/// Validated, immutable steward and scenario data shared read-only by all workers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultCatalog {
    scenarios: Vec<Scenario>,
    stewards: Vec<Steward>,
}

impl FaultCatalog {
    /// Validate a raw catalog. The declared `f` is ignored here; see
    /// [`crate::quorum::SearchProblem`].
    pub fn from_raw(raw: &RawCatalog) -> Result<Self, CatalogError> {
        if raw.steward_names.is_empty() {
            return Err(CatalogError::NoStewards);
        }
        if raw.scenario_names.is_empty() {
            return Err(CatalogError::NoScenarios);
        }
        if raw.likelihoods.len() != raw.scenario_names.len() {
            return Err(CatalogError::LikelihoodCountMismatch {
                scenarios: raw.scenario_names.len(),
                likelihoods: raw.likelihoods.len(),
            });
        }
        if raw.repair_times.len() != raw.steward_names.len() {
            return Err(CatalogError::RepairTimeCountMismatch {
                stewards: raw.steward_names.len(),
                repair_times: raw.repair_times.len(),
            });
        }
        if raw.fault_matrix.len() != raw.steward_names.len() {
            return Err(CatalogError::FaultRowCountMismatch {
                stewards: raw.steward_names.len(),
                rows: raw.fault_matrix.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut scenarios = Vec::with_capacity(raw.scenario_names.len());
        for (name, &likelihood) in raw.scenario_names.iter().zip(&raw.likelihoods) {
            if !seen.insert(name.as_str()) {
                return Err(CatalogError::DuplicateScenario(name.clone()));
            }
            if !likelihood.is_finite() || !(0.0..=1.0).contains(&likelihood) {
                return Err(CatalogError::InvalidLikelihood {
                    scenario: name.clone(),
                    value: likelihood,
                });
            }
            scenarios.push(Scenario {
                name: name.clone(),
                likelihood,
            });
        }

        seen.clear();
        let mut stewards = Vec::with_capacity(raw.steward_names.len());
        for ((name, &repair_time), row) in raw
            .steward_names
            .iter()
            .zip(&raw.repair_times)
            .zip(&raw.fault_matrix)
        {
            if !seen.insert(name.as_str()) {
                return Err(CatalogError::DuplicateSteward(name.clone()));
            }
            if !repair_time.is_finite() || repair_time <= 0.0 {
                return Err(CatalogError::InvalidRepairTime {
                    steward: name.clone(),
                    value: repair_time,
                });
            }
            if row.len() != scenarios.len() {
                return Err(CatalogError::FaultRowLength {
                    steward: name.clone(),
                    expected: scenarios.len(),
                    found: row.len(),
                });
            }
            let mut faults = Vec::with_capacity(row.len());
            for (scenario, &flag) in scenarios.iter().zip(row) {
                match flag {
                    0 => faults.push(false),
                    1 => faults.push(true),
                    value => {
                        return Err(CatalogError::InvalidFaultFlag {
                            steward: name.clone(),
                            scenario: scenario.name.clone(),
                            value,
                        })
                    }
                }
            }
            stewards.push(Steward {
                name: name.clone(),
                repair_time,
                faults,
            });
        }

        Ok(Self {
            scenarios,
            stewards,
        })
    }

    pub fn stewards(&self) -> &[Steward] {
        &self.stewards
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn steward_count(&self) -> usize {
        self.stewards.len()
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Member names joined with `+`, e.g. `Bank A+NGO E`. Indices outside the
    /// catalog render as `#i`.
    pub fn combo_label(&self, members: &[usize]) -> String {
        members
            .iter()
            .map(|&i| match self.stewards.get(i) {
                Some(steward) => steward.name.clone(),
                None => format!("#{i}"),
            })
            .collect::<Vec<_>>()
            .join("+")
    }

    pub fn member_names(&self, members: &[usize]) -> Vec<String> {
        members
            .iter()
            .map(|&i| self.stewards[i].name.clone())
            .collect()
    }

    /// BLAKE3 digest over every value that influences scoring.
    ///
    /// Two catalogs with the same fingerprint produce identical rankings.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.scenarios.len() as u64).to_le_bytes());
        for scenario in &self.scenarios {
            hasher.update(scenario.name.as_bytes());
            hasher.update(&[0]);
            hasher.update(&scenario.likelihood.to_bits().to_le_bytes());
        }
        hasher.update(&(self.stewards.len() as u64).to_le_bytes());
        for steward in &self.stewards {
            hasher.update(steward.name.as_bytes());
            hasher.update(&[0]);
            hasher.update(&steward.repair_time.to_bits().to_le_bytes());
            let flags: Vec<u8> = steward.faults.iter().map(|&f| f as u8).collect();
            hasher.update(&flags);
        }
        hasher.finalize().to_hex().to_string()
    }
}
