//! Steward Select CLI: rank quorums of stewards by expected downtime.
//!
//! Commands:
//! - `select`: search every m-sized steward subset and print the best N
//! - `inspect`: summarize a catalog and the quorum sizes it supports

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use steward_core::{binomial, max_f_for_steward_count, quorum_size, FaultCatalog};
use steward_runner::{
    explain_top, export_csv, export_json, load_catalog, render_text, select_from_file,
    total_label, write_artifact, FSelection, SearchConfig, SearchProgress, SelectionReport,
};

#[derive(Parser)]
#[command(
    name = "steward-select",
    version,
    about = "Steward selection: pick the 3f+1 stewards with the least expected downtime"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank every quorum of stewards in a worksheet CSV (or JSON catalog).
    Select {
        /// Worksheet CSV exported from the steward sheet, or a `.json` catalog.
        file: PathBuf,

        /// Fault tolerance: "max" (largest the steward list allows), "from-file", or a number.
        #[arg(long, short = 'f')]
        f: Option<FSelection>,

        /// How many of the best combinations to show.
        #[arg(long)]
        best: Option<usize>,

        /// Combinations per worker batch.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Worker threads (0 = all cores).
        #[arg(long)]
        workers: Option<usize>,

        /// TOML file with search settings. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Evaluate on the calling thread without a worker pool.
        #[arg(long, default_value_t = false)]
        serial: bool,

        /// Print a per-scenario breakdown of the winning combination.
        #[arg(long, default_value_t = false)]
        explain: bool,

        /// Print progress to stderr while searching.
        #[arg(long, default_value_t = false)]
        progress: bool,

        /// Write the ranking as JSON to this path.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the ranking as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Summarize a catalog: stewards, scenarios, supported f and search size.
    Inspect {
        /// Worksheet CSV or `.json` catalog.
        file: PathBuf,
    },
}

/// Flag values that override the config file.
struct Overrides {
    f: Option<FSelection>,
    best: Option<usize>,
    batch_size: Option<usize>,
    workers: Option<usize>,
    serial: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("warn,steward_runner=info,steward_select=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            file,
            f,
            best,
            batch_size,
            workers,
            config,
            serial,
            explain,
            progress,
            json,
            csv,
        } => {
            let overrides = Overrides {
                f,
                best,
                batch_size,
                workers,
                serial,
            };
            let config = build_config(config.as_deref(), overrides)?;
            run_select(&file, &config, explain, progress, json, csv)
        }
        Commands::Inspect { file } => run_inspect(&file),
    }
}

fn build_config(path: Option<&Path>, overrides: Overrides) -> Result<SearchConfig> {
    let mut config = match path {
        Some(path) => SearchConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(f) = overrides.f {
        config.f = f;
    }
    if let Some(best) = overrides.best {
        config.best = best;
    }
    if let Some(batch_size) = overrides.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(workers) = overrides.workers {
        config.workers = workers;
    }
    if overrides.serial {
        config.serial = true;
    }
    config.validate()?;
    Ok(config)
}

fn run_select(
    file: &Path,
    config: &SearchConfig,
    explain: bool,
    progress: bool,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let print_progress = |p: &SearchProgress| match p.fraction() {
        Some(fraction) => eprintln!(
            "  {:>5.1}%  {} combinations evaluated ({:.1}s)",
            fraction * 100.0,
            p.evaluated,
            p.elapsed_secs
        ),
        None => eprintln!(
            "  {} combinations evaluated ({:.1}s)",
            p.evaluated, p.elapsed_secs
        ),
    };
    let progress_cb: Option<&dyn Fn(&SearchProgress)> =
        if progress { Some(&print_progress) } else { None };

    let selection = select_from_file(file, config, progress_cb, None)
        .with_context(|| format!("selection failed for {}", file.display()))?;

    print!("{}", render_text(&selection));
    if explain {
        if let Some(breakdown) = explain_top(&selection)? {
            print!("{breakdown}");
        }
    }

    if json.is_some() || csv.is_some() {
        let report = SelectionReport::from_selection(&selection);
        if let Some(path) = json {
            write_artifact(&path, &export_json(&report)?)?;
            info!(path = %path.display(), "wrote JSON report");
        }
        if let Some(path) = csv {
            write_artifact(&path, &export_csv(&report)?)?;
            info!(path = %path.display(), "wrote CSV report");
        }
    }
    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    let raw = load_catalog(file).with_context(|| format!("failed to load {}", file.display()))?;
    let catalog = FaultCatalog::from_raw(&raw).context("catalog is invalid")?;
    let n = catalog.steward_count();
    let max_f = max_f_for_steward_count(n);

    println!();
    println!("=== Catalog ===");
    println!("File:           {}", file.display());
    println!("Stewards:       {n}");
    println!("Scenarios:      {}", catalog.scenario_count());
    println!("f in file:      {}", raw.f);
    println!("Max f:          {max_f}");
    println!("Fingerprint:    {}", catalog.fingerprint());
    println!();
    println!("--- Stewards ---");
    for steward in catalog.stewards() {
        let faults = steward.faults.iter().filter(|&&fault| fault).count();
        println!(
            "{:<30} MTTR {:>6.1}  faults in {faults} scenario(s)",
            steward.name, steward.repair_time
        );
    }
    println!();
    println!("--- Search size ---");
    for (f, m) in (0..=max_f).filter_map(|f| quorum_size(f).map(|m| (f, m))) {
        println!("f={f}  m={m}  combinations={}", total_label(binomial(n, m)));
    }
    Ok(())
}
