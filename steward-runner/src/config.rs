//! Serializable search configuration.
//!
//! A [`SearchConfig`] can be built in code, parsed from TOML, or left at its
//! defaults. Command-line flags are applied on top by the caller.
//!
//! ```toml
//! best = 25
//! batch_size = 800
//! workers = 0        # all cores
//! f = "from_file"    # or "max", or an integer
//! serial = false     # true evaluates on the calling thread, no pool
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use steward_core::{DEFAULT_CAPACITY, MAX_CAPACITY};

/// Combos handed to a worker at a time.
pub const DEFAULT_BATCH_SIZE: usize = 800;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("best must be between 1 and {max}, got {value}")]
    InvalidBest { value: usize, max: usize },

    #[error("batch_size must be greater than 0")]
    ZeroBatchSize,

    #[error("unrecognized f selection '{0}' (expected \"max\", \"from_file\" or an integer)")]
    InvalidFSelection(String),
}

/// How the fault tolerance `f` is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "FSelectionRepr", into = "FSelectionRepr")]
pub enum FSelection {
    /// Largest f the steward count supports.
    #[default]
    Max,
    /// The f declared in the data file, or 0 if it declares none.
    FromFile,
    /// Exactly this f.
    Exact(usize),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FSelectionRepr {
    Exact(usize),
    Named(String),
}

impl TryFrom<FSelectionRepr> for FSelection {
    type Error = ConfigError;

    fn try_from(repr: FSelectionRepr) -> Result<Self, Self::Error> {
        match repr {
            FSelectionRepr::Exact(f) => Ok(FSelection::Exact(f)),
            FSelectionRepr::Named(name) => name.parse(),
        }
    }
}

impl From<FSelection> for FSelectionRepr {
    fn from(selection: FSelection) -> Self {
        match selection {
            FSelection::Max => FSelectionRepr::Named("max".into()),
            FSelection::FromFile => FSelectionRepr::Named("from_file".into()),
            FSelection::Exact(f) => FSelectionRepr::Exact(f),
        }
    }
}

impl FromStr for FSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "max" => Ok(FSelection::Max),
            "from_file" | "file" => Ok(FSelection::FromFile),
            other => other
                .parse::<usize>()
                .map(FSelection::Exact)
                .map_err(|_| ConfigError::InvalidFSelection(s.to_string())),
        }
    }
}

impl fmt::Display for FSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FSelection::Max => write!(f, "max"),
            FSelection::FromFile => write!(f, "from_file"),
            FSelection::Exact(k) => write!(f, "{k}"),
        }
    }
}

/// Parameters for a steward search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Number of combos to keep and report.
    pub best: usize,

    /// Combos per worker batch.
    pub batch_size: usize,

    /// Worker threads; 0 uses every available core.
    pub workers: usize,

    /// Fault tolerance selection.
    pub f: FSelection,

    /// Evaluate on the calling thread without building a worker pool.
    pub serial: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            best: DEFAULT_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: 0,
            f: FSelection::Max,
            serial: false,
        }
    }
}

impl SearchConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the search cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.best == 0 || self.best > MAX_CAPACITY {
            return Err(ConfigError::InvalidBest {
                value: self.best,
                max: MAX_CAPACITY,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    /// Worker count with 0 resolved to the machine's available parallelism.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }
}
