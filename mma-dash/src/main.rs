//! mma-dash - Music Money Analytics command line dashboard
//!
//! Reads one or more CSV exports (weekly history log and/or detailed artist
//! export), runs the analytics pipeline and prints the result.
//!
//! **Usage:**
//! ```bash
//! mma-dash report history.csv detail.csv > report.json
//! mma-dash --rpm 5 summary history.csv
//! mma-dash deal --artist "Some Artist" --offer 8000 detail.csv
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mma_common::config::{config_file_path, resolve_assumptions, AssumptionOverrides, TomlConfig};
use mma_common::filter::Selection;
use mma_common::metrics::{monthly_salary, simulate_deal, DealTerms};
use mma_common::pipeline::{compute, ingest, load_files, prepare, Prepared};
use mma_common::{time, Assumptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod format;

#[derive(Parser, Debug)]
#[command(name = "mma-dash")]
#[command(about = "Artist vs channel wealth analytics for YouTube exports")]
#[command(version)]
struct Cli {
    /// Config file (overrides MMA_CONFIG and the default locations)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Revenue per 1,000 views ($)
    #[arg(long, global = true)]
    rpm: Option<f64>,

    /// Flat fee paid per video ($)
    #[arg(long, global = true)]
    flat_fee: Option<f64>,

    /// Production cost per video ($)
    #[arg(long, global = true)]
    prod_cost: Option<f64>,

    /// Platform share in the proposed split (%)
    #[arg(long, global = true)]
    platform_cut: Option<f64>,

    /// Age threshold for ghost income (years)
    #[arg(long, global = true)]
    ghost_years: Option<f64>,

    /// Reference date for age-based metrics (defaults to today)
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full report as JSON
    Report(Inputs),
    /// Human-readable summary
    Summary(Inputs),
    /// Artists available for the deal and salary commands
    Artists(Inputs),
    /// Buyout offer against independent release
    Deal {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long)]
        artist: String,
        /// Restrict to these video titles (repeatable)
        #[arg(long = "title")]
        titles: Vec<String>,
        #[arg(long, default_value_t = DealTerms::default().offer)]
        offer: f64,
        #[arg(long, default_value_t = DealTerms::default().cost)]
        cost: f64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Monthly paycheck under the proposed split
    Salary {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        json: bool,
    },
    /// List tunable assumptions and their resolved values
    Params,
}

/// Uploaded files plus the artist selection
#[derive(Args, Debug, Clone)]
struct Inputs {
    /// CSV files to analyse
    #[arg(required = true, value_name = "CSV")]
    files: Vec<PathBuf>,

    /// Keep only these artists (repeatable; wins over --exclude)
    #[arg(long = "include")]
    include_artists: Vec<String>,

    /// Drop these artists (repeatable)
    #[arg(long = "exclude")]
    exclude_artists: Vec<String>,

    /// Drop history rows whose artist was not confirmed by the detail export
    #[arg(long)]
    hide_unidentified: bool,
}

impl Inputs {
    /// Command-line selection, falling back to the config file per field
    fn selection(&self, toml: &TomlConfig) -> Selection {
        let base = toml.selection.clone().unwrap_or_default();
        Selection {
            include_artists: if self.include_artists.is_empty() {
                base.include_artists
            } else {
                self.include_artists.clone()
            },
            exclude_artists: if self.exclude_artists.is_empty() {
                base.exclude_artists
            } else {
                self.exclude_artists.clone()
            },
            hide_unidentified: self.hide_unidentified || base.hide_unidentified,
        }
    }

    fn prepare(&self, toml: &TomlConfig) -> Result<Prepared> {
        let tables = load_files(&self.files).context("Failed to read CSV input")?;
        let dataset = ingest(tables, &toml.content_filter());
        let prepared = prepare(dataset, &self.selection(toml))?;
        Ok(prepared)
    }
}

impl Cli {
    fn overrides(&self) -> AssumptionOverrides {
        AssumptionOverrides {
            rpm: self.rpm,
            flat_fee: self.flat_fee,
            prod_cost: self.prod_cost,
            platform_cut_pct: self.platform_cut,
            ghost_years: self.ghost_years,
        }
    }
}

/// Execute one command and return what should be printed
fn run(cli: &Cli, toml: &TomlConfig) -> Result<String> {
    let assumptions: Assumptions =
        resolve_assumptions(&cli.overrides(), toml).context("Invalid assumptions")?;
    let as_of = cli.as_of.unwrap_or_else(time::today);

    let output = match &cli.command {
        Command::Params => format::params(&assumptions),
        Command::Report(inputs) => {
            let prepared = inputs.prepare(toml)?;
            let report = compute(&prepared, &assumptions, as_of);
            serde_json::to_string_pretty(&report)? + "\n"
        }
        Command::Summary(inputs) => {
            let prepared = inputs.prepare(toml)?;
            prepared.ensure_rows()?;
            format::summary(&compute(&prepared, &assumptions, as_of))
        }
        Command::Artists(inputs) => {
            let prepared = inputs.prepare(toml)?;
            prepared.artist_options.join("\n") + "\n"
        }
        Command::Deal {
            inputs,
            artist,
            titles,
            offer,
            cost,
            json,
        } => {
            let prepared = inputs.prepare(toml)?;
            let terms = DealTerms {
                offer: *offer,
                cost: *cost,
            };
            let picked = (!titles.is_empty()).then_some(titles.as_slice());
            let outcome = simulate_deal(&prepared.working, artist, picked, &terms, &assumptions)?;
            if *json {
                serde_json::to_string_pretty(&outcome)? + "\n"
            } else {
                format::deal(&outcome)
            }
        }
        Command::Salary {
            inputs,
            artist,
            json,
        } => {
            let prepared = inputs.prepare(toml)?;
            match monthly_salary(&prepared.working, artist, &assumptions)? {
                Some(report) if *json => serde_json::to_string_pretty(&report)? + "\n",
                Some(report) => format::salary(&report),
                None => {
                    "Monthly salary needs release dates and average daily views\n".to_string()
                }
            }
        }
    };
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is read before logging starts so it can supply the default level
    let toml = TomlConfig::load_or_default(cli.config.as_deref());
    let default_level = cli
        .log_level
        .clone()
        .or_else(|| toml.as_ref().ok().and_then(|t| t.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Music Money Analytics (mma-dash) {}", env!("BUILD_ID"));

    match config_file_path(cli.config.as_deref()) {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }

    let toml = match toml {
        Ok(toml) => toml,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &toml) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => match e.downcast_ref::<mma_common::Error>() {
            Some(inner) if inner.is_informational() => {
                warn!("{}", inner);
                println!("{}", inner);
                ExitCode::SUCCESS
            }
            _ => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
