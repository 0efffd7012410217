//! Catalog loading from worksheet CSV exports (or JSON).
//!
//! The CSV layout is the one produced by exporting the steward worksheet:
//!
//! ```text
//! Max faulted nodes: F,1            <- optional
//! ,,maintenance,botched upgrade,... <- scenario names
//! likelihood per year,,1%,85%,...   <- likelihoods (numbers or percentages)
//! Steward,MTTR,fault?,fault?,...    <- column header
//! Bank A,5,1,1,...                  <- steward rows until the first non-steward row
//! ```
//!
//! Rows before each header are skipped, so free-form notes above the table are
//! fine. A file without the f row is read with f = 0.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use steward_core::RawCatalog;

/// Errors from the catalog loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no useful data")]
    NoUsefulData,

    #[error("didn't find the following header(s) in data: {}", .0.join(", "))]
    MissingHeaders(Vec<&'static str>),

    #[error("row {row}: can't read likelihood '{value}'")]
    InvalidLikelihood { row: usize, value: String },
}

type Row = Vec<String>;

/// Load a catalog from `path`. Files ending in `.json` are read as a
/// serialized [`RawCatalog`]; anything else as a worksheet CSV.
pub fn load_catalog(path: &Path) -> Result<RawCatalog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_reader(file)?)
    } else {
        parse_csv(file)
    }
}

/// Parse a worksheet CSV from any reader.
pub fn parse_csv<R: Read>(reader: R) -> Result<RawCatalog, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Row> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    parse_rows(&rows)
}

/// Parse already-split rows.
pub fn parse_rows(rows: &[Row]) -> Result<RawCatalog, LoadError> {
    if rows.iter().all(|row| is_empty_row(row)) {
        return Err(LoadError::NoUsefulData);
    }

    let header = match parse_header(rows, false) {
        Ok(header) => header,
        Err(LoadError::MissingHeaders(_)) => {
            debug!("no f row found; reading header with f = 0");
            parse_header(rows, true)?
        }
        Err(e) => return Err(e),
    };

    let mut raw = RawCatalog {
        f: header.f,
        scenario_names: header.scenario_names,
        likelihoods: header.likelihoods,
        ..RawCatalog::default()
    };

    for row in rows.iter().skip(header.table_start) {
        let Some(repair_time) = steward_repair_time(row) else {
            break;
        };
        raw.steward_names.push(row[0].clone());
        raw.repair_times.push(repair_time);
        raw.fault_matrix.push(
            trimmed(&row[2..])
                .iter()
                .map(|cell| u8::from(cell.as_str() == "1"))
                .collect(),
        );
    }

    debug!(
        f = raw.f,
        scenarios = raw.scenario_names.len(),
        stewards = raw.steward_names.len(),
        "parsed catalog"
    );
    Ok(raw)
}

struct Header {
    f: usize,
    scenario_names: Vec<String>,
    likelihoods: Vec<f64>,
    /// Index of the first row after the column header.
    table_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRule {
    F,
    Scenarios,
    Likelihoods,
    Columns,
}

static HEADER_RULES: [HeaderRule; 4] = [
    HeaderRule::F,
    HeaderRule::Scenarios,
    HeaderRule::Likelihoods,
    HeaderRule::Columns,
];

impl HeaderRule {
    fn name(self) -> &'static str {
        match self {
            HeaderRule::F => "f",
            HeaderRule::Scenarios => "scenarios",
            HeaderRule::Likelihoods => "likelihoods",
            HeaderRule::Columns => "column header",
        }
    }

    fn matches(self, row: &[String]) -> bool {
        match self {
            HeaderRule::F => {
                let label = cell(row, 0);
                (label.ends_with('f') || label.ends_with('F'))
                    && cell(row, 1).parse::<usize>().is_ok()
            }
            HeaderRule::Scenarios => {
                cell(row, 0).is_empty() && cell(row, 1).is_empty() && !cell(row, 2).is_empty()
            }
            HeaderRule::Likelihoods => cell(row, 0).to_ascii_lowercase().contains("likelihood"),
            HeaderRule::Columns => trimmed(row).last().is_some_and(|last| {
                let compact: String = last.chars().filter(|c| !c.is_whitespace()).collect();
                compact.eq_ignore_ascii_case("fault?")
            }),
        }
    }
}

fn parse_header(rows: &[Row], skip_f: bool) -> Result<Header, LoadError> {
    let rules = &HEADER_RULES[usize::from(skip_f)..];

    let mut header = Header {
        f: 0,
        scenario_names: Vec::new(),
        likelihoods: Vec::new(),
        table_start: 0,
    };
    let mut row_idx = 0;

    for (rule_pos, &rule) in rules.iter().enumerate() {
        let found = rows[row_idx..]
            .iter()
            .position(|row| rule.matches(row))
            .map(|offset| row_idx + offset);
        let Some(idx) = found else {
            let missing = rules[rule_pos..].iter().map(|r| r.name()).collect();
            return Err(LoadError::MissingHeaders(missing));
        };

        let row = &rows[idx];
        match rule {
            HeaderRule::F => header.f = cell(row, 1).parse().unwrap_or(0),
            HeaderRule::Scenarios => {
                header.scenario_names = trimmed(&row[2..]).to_vec();
            }
            HeaderRule::Likelihoods => {
                header.likelihoods = trimmed(&row[2.min(row.len())..])
                    .iter()
                    .map(|value| {
                        convert_float(value).ok_or_else(|| LoadError::InvalidLikelihood {
                            row: idx + 1,
                            value: value.clone(),
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
            HeaderRule::Columns => {}
        }
        row_idx = idx + 1;
    }

    header.table_start = row_idx;
    Ok(header)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// `cells` without trailing empty cells.
fn trimmed(cells: &[String]) -> &[String] {
    let end = cells
        .iter()
        .rposition(|c| !c.is_empty())
        .map_or(0, |i| i + 1);
    &cells[..end]
}

fn is_empty_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// The repair time of a steward row: a name starting with a letter, a number,
/// then only `0`/`1` flags. `None` for any other row.
fn steward_repair_time(row: &[String]) -> Option<f64> {
    let starts_with_letter = cell(row, 0)
        .chars()
        .next()
        .is_some_and(char::is_alphabetic);
    if !starts_with_letter {
        return None;
    }
    let repair_time = convert_float(cell(row, 1))?;
    trimmed(&row[2.min(row.len())..])
        .iter()
        .all(|c| c == "0" || c == "1")
        .then_some(repair_time)
}

/// Parse a number, accepting a trailing `%` as a percentage.
fn convert_float(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v * 0.01),
        None => text.parse::<f64>().ok(),
    }
}
