//! `vet-dashboard` command-line shell.

mod render;
mod session;
mod telemetry;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{info, warn, Level};

use vet_dashboard_core::engine::{DistributionEngine, ProbabilityStatement};
use vet_dashboard_core::export::TableExporter;
use vet_dashboard_core::models::CategoryField;
use vet_dashboard_core::summary::{AgeHistogram, CategoryCounts, DashboardSummary};
use vet_dashboard_core::{DashboardConfig, DashboardCore};

use crate::session::{Session, BINOMIAL_TARGET_SLIDER, POISSON_TARGET_SLIDER, TRIALS_SLIDER};

#[derive(Parser)]
#[command(name = "vet-dashboard", version, about = "Vet clinic visit dashboard")]
struct Cli {
    /// Visit sheet to load
    #[arg(long, global = true, env = "VET_DASHBOARD_DATA")]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, env = "VET_DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Metric cards, count charts, and the respiratory age histogram
    Summary,
    /// Probability of at least TARGET certificates among TRIALS patients
    Binomial {
        /// Simulated patients
        #[arg(long, value_parser = parse_trials)]
        trials: Option<u32>,
        /// Desired certificates
        #[arg(long, value_parser = parse_binomial_target)]
        target: Option<u32>,
    },
    /// Probability of at least TARGET respiratory cases in one shift
    Poisson {
        /// Desired cases
        #[arg(long, value_parser = parse_poisson_target)]
        target: Option<u32>,
    },
    /// Write the visit table as CSV
    Export {
        /// Destination file; defaults to the configured file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive session reading commands from stdin
    Session,
}

fn parse_trials(raw: &str) -> Result<u32> {
    session::slider_value("trials", raw, &TRIALS_SLIDER)
}

fn parse_binomial_target(raw: &str) -> Result<u32> {
    session::slider_value("target", raw, &BINOMIAL_TARGET_SLIDER)
}

fn parse_poisson_target(raw: &str) -> Result<u32> {
    session::slider_value("target", raw, &POISSON_TARGET_SLIDER)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::INFO } else { Level::WARN };
    telemetry::init_tracing(cli.json_logs, level);

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    let data_path = cli
        .data
        .clone()
        .or_else(|| config.data.path.clone())
        .context("no visit sheet given (use --data or data.path in the config)")?;

    let core = DashboardCore::open(&data_path, config)
        .with_context(|| format!("failed to open {}", data_path.display()))?;
    if !core.report().is_clean() {
        warn!(
            issues = core.report().issues.len(),
            "Sheet loaded with malformed records"
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Summary => run_summary(&core, cli.format, &mut out),
        Command::Binomial { trials, target } => {
            let sliders = &core.config().sliders;
            let trials = trials.unwrap_or(sliders.trials);
            let target = target.unwrap_or(sliders.binomial_target);
            run_binomial(&core, trials, target, cli.format, &mut out)
        }
        Command::Poisson { target } => {
            let target = target.unwrap_or(core.config().sliders.poisson_target);
            run_poisson(&core, target, cli.format, &mut out)
        }
        Command::Export { output } => run_export(&core, output, cli.format, &mut out),
        Command::Session => {
            let stdin = io::stdin();
            Session::new(&core).run(stdin.lock(), &mut out)
        }
    }
}

fn run_summary<W: Write>(core: &DashboardCore, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Text => write!(out, "{}", session::summary_panel(core))?,
        OutputFormat::Json => {
            let dataset = core.dataset();
            let value = json!({
                "summary": DashboardSummary::from_dataset(&dataset),
                "doctors": CategoryCounts::from_dataset(&dataset, CategoryField::Doctor),
                "shifts": CategoryCounts::from_dataset(&dataset, CategoryField::Shift),
                "genders": CategoryCounts::from_dataset(&dataset, CategoryField::Gender),
                "respiratory_age_histogram": AgeHistogram::respiratory_cases(&dataset),
                "load_issues": core.report().issues,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }
    Ok(())
}

fn run_binomial<W: Write>(
    core: &DashboardCore,
    trials: u32,
    target: u32,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => write!(out, "{}", session::binomial_panel(core, trials, target)?)?,
        OutputFormat::Json => {
            let dataset = core.dataset();
            let result = DistributionEngine::new(&dataset).binomial_analysis(trials, target)?;
            let statement = ProbabilityStatement::binomial(&result, trials);
            let value = json!({ "trials": trials, "result": result, "statement": statement });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }
    Ok(())
}

fn run_poisson<W: Write>(
    core: &DashboardCore,
    target: u32,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => write!(out, "{}", session::poisson_panel(core, target)?)?,
        OutputFormat::Json => {
            let dataset = core.dataset();
            let result = DistributionEngine::new(&dataset).poisson_analysis(target)?;
            let statement = ProbabilityStatement::poisson(&result);
            let value = json!({ "result": result, "statement": statement });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }
    Ok(())
}

fn run_export<W: Write>(
    core: &DashboardCore,
    output: Option<PathBuf>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let dataset = core.dataset();
    let file = TableExporter::with_config(&dataset, &core.config().export)?.export()?;
    let path = output.unwrap_or_else(|| PathBuf::from(&file.file_name));
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = file.row_count, "Export written");

    match format {
        OutputFormat::Text => writeln!(
            out,
            "Exported {} rows to {} (sha256 {})",
            file.row_count,
            path.display(),
            file.sha256
        )?,
        OutputFormat::Json => {
            let value = json!({
                "path": path.display().to_string(),
                "rows": file.row_count,
                "sha256": file.sha256,
                "exported_at": file.exported_at,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }
    Ok(())
}
