//! Steward Runner: configuration, catalog loading, parallel search, reporting.
//!
//! This crate builds on `steward-core` to provide:
//! - `SearchConfig` loaded from TOML, with f selection (`max`, `from_file`, exact)
//! - Worksheet CSV (and JSON) catalog loading
//! - The wave-based parallel dispatcher with progress and cancellation
//! - The end-to-end selection pipeline
//! - Text, JSON and CSV reports

pub mod config;
pub mod loader;
pub mod report;
pub mod search;
pub mod select;

pub use config::{ConfigError, FSelection, SearchConfig, DEFAULT_BATCH_SIZE};
pub use loader::{load_catalog, parse_csv, parse_rows, LoadError};
pub use report::{
    explain_top, export_csv, export_json, import_json, render_breakdown, render_text,
    write_artifact, RankedCombo, SelectionReport, SCHEMA_VERSION,
};
pub use search::{Dispatcher, SearchError, SearchOutcome, SearchProgress};
pub use select::{
    prepare, resolve_f, select, select_from_file, total_label, SelectError, Selection,
};
