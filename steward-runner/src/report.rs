//! Reporting and export: plain-text ranking, per-scenario breakdown, JSON and CSV.
//!
//! The JSON report carries a `schema_version`; unknown versions are rejected on load.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use steward_core::{evaluate_detailed, ComboBreakdown, SearchProblem};

use crate::select::Selection;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// One ranked combo, with names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCombo {
    pub rank: usize,
    pub stewards: Vec<String>,
    pub indices: Vec<usize>,
    pub combined_score: f64,
}

/// Serializable summary of a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub schema_version: u32,
    pub f: usize,
    pub m: usize,
    pub steward_count: usize,
    pub scenario_count: usize,
    /// `None` when C(n, m) overflowed.
    pub total_combinations: Option<u128>,
    pub evaluated: u64,
    /// BLAKE3 digest of the catalog that was searched.
    pub catalog_fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub ranked: Vec<RankedCombo>,
}

impl SelectionReport {
    pub fn from_selection(selection: &Selection) -> Self {
        let catalog = selection.problem.catalog();
        let outcome = &selection.outcome;
        let ranked = outcome
            .ranked
            .iter()
            .enumerate()
            .map(|(i, result)| RankedCombo {
                rank: i + 1,
                stewards: catalog.member_names(result.combo().members()),
                indices: result.combo().members().to_vec(),
                combined_score: result.combined_score(),
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION,
            f: outcome.f,
            m: outcome.m,
            steward_count: catalog.steward_count(),
            scenario_count: catalog.scenario_count(),
            total_combinations: outcome.total,
            evaluated: outcome.evaluated,
            catalog_fingerprint: catalog.fingerprint(),
            generated_at: Utc::now(),
            elapsed_secs: outcome.elapsed_secs,
            ranked,
        }
    }
}

// ─── Text ───────────────────────────────────────────────────────────

/// The ranking as printed to the terminal:
///
/// ```text
///
/// 3 Best 4-Steward Combinations, Ranked
/// -------------------------------------
/// 1: A+C+E+F: -2.1
/// ```
pub fn render_text(selection: &Selection) -> String {
    let catalog = selection.problem.catalog();
    let ranked = &selection.outcome.ranked;
    let title = format!(
        "{} Best {}-Steward Combinations, Ranked",
        ranked.len(),
        selection.outcome.m
    );

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
    for (i, result) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}: {}: {}",
            i + 1,
            catalog.combo_label(result.combo().members()),
            result.combined_score()
        );
    }
    out
}

/// Per-scenario breakdown of the top-ranked combo, or `None` for an empty ranking.
pub fn explain_top(selection: &Selection) -> Result<Option<String>> {
    let Some(top) = selection.outcome.ranked.first() else {
        return Ok(None);
    };
    let breakdown = evaluate_detailed(&selection.problem, top.combo().clone())
        .context("failed to re-evaluate top combo")?;
    Ok(Some(render_breakdown(&selection.problem, &breakdown)))
}

/// Table of the scenario outcomes behind one combo's score.
pub fn render_breakdown(problem: &SearchProblem, breakdown: &ComboBreakdown) -> String {
    let catalog = problem.catalog();
    let members = breakdown.result.combo().members();

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Breakdown for {} (f={}, m={})",
        catalog.combo_label(members),
        problem.f(),
        problem.m()
    );
    let _ = writeln!(
        out,
        "{:<40} {:>10} {:>6} {:>6} {:>8} {:>10} {:>10}",
        "Scenario", "Likelihood", "Faults", "Dist", "MTTR", "Importance", "Score"
    );
    for outcome in &breakdown.outcomes {
        let scenario = &catalog.scenarios()[outcome.scenario];
        let _ = writeln!(
            out,
            "{:<40} {:>10.4} {:>6} {:>6} {:>8.2} {:>10.4} {:>10.4}",
            truncate(&scenario.name, 40),
            scenario.likelihood,
            outcome.fault_count,
            outcome.failure_distance,
            outcome.mttr,
            outcome.importance,
            outcome.score
        );
    }
    let _ = writeln!(
        out,
        "{:<40} {:>65.4}",
        "Combined",
        breakdown.result.combined_score()
    );
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &SelectionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SelectionReport to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SelectionReport> {
    let report: SelectionReport =
        serde_json::from_str(json).context("failed to deserialize SelectionReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export the ranking as CSV.
///
/// Columns: rank, stewards (joined with `+`), combined_score
pub fn export_csv(report: &SelectionReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["rank", "stewards", "combined_score"])?;
    for combo in &report.ranked {
        wtr.write_record([
            combo.rank.to_string(),
            combo.stewards.join("+"),
            combo.combined_score.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// Write an exported report to `path`.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
