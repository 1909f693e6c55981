//! Interactive dashboard session.
//!
//! Each input line is one interaction: it moves a slider (or runs a
//! command), the affected panel is recomputed from the shared dataset, and
//! the output is written before the next line is read. Errors are printed
//! inline and never end the session.

use std::io::{BufRead, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use vet_dashboard_core::engine::{AnalysisError, DistributionEngine, ProbabilityStatement};
use vet_dashboard_core::export::TableExporter;
use vet_dashboard_core::models::{CategoryField, DistributionResult};
use vet_dashboard_core::summary::{AgeHistogram, CategoryCounts, DashboardSummary};
use vet_dashboard_core::DashboardCore;

use crate::render;

/// Slider range for simulated patients.
pub const TRIALS_SLIDER: RangeInclusive<u32> = 5..=50;
/// Slider range for desired certificates.
pub const BINOMIAL_TARGET_SLIDER: RangeInclusive<u32> = 1..=50;
/// Slider range for desired respiratory cases.
pub const POISSON_TARGET_SLIDER: RangeInclusive<u32> = 0..=10;

const HELP: &str = "\
commands:
  summary                 metric cards and count charts
  binomial <trials> <k>   set both binomial sliders
  trials <n>              set simulated patients
  target <k>              set desired certificates
  poisson <k>             set desired respiratory cases
  export <path>           write the visit table
  help                    show this help
  quit                    leave the session
";

/// Current slider positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sliders {
    pub trials: u32,
    pub binomial_target: u32,
    pub poisson_target: u32,
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Summary,
    Binomial { trials: u32, target: u32 },
    Trials(u32),
    Target(u32),
    Poisson(u32),
    Export(PathBuf),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("summary", []) => Command::Summary,
            ("binomial", [trials, target]) => Command::Binomial {
                trials: slider_value("trials", trials, &TRIALS_SLIDER)?,
                target: slider_value("target", target, &BINOMIAL_TARGET_SLIDER)?,
            },
            ("trials", [n]) => Command::Trials(slider_value("trials", n, &TRIALS_SLIDER)?),
            ("target", [k]) => Command::Target(slider_value("target", k, &BINOMIAL_TARGET_SLIDER)?),
            ("poisson", [k]) => Command::Poisson(slider_value("poisson", k, &POISSON_TARGET_SLIDER)?),
            ("export", [path]) => Command::Export(PathBuf::from(path)),
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => bail!("unrecognised command {:?} (try `help`)", line.trim()),
        };
        Ok(command)
    }
}

/// Parse a slider value and check it against the slider's range.
pub fn slider_value(name: &str, raw: &str, range: &RangeInclusive<u32>) -> Result<u32> {
    let value: u32 = raw
        .parse()
        .with_context(|| format!("{} must be a whole number, got {:?}", name, raw))?;
    if !range.contains(&value) {
        bail!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        );
    }
    Ok(value)
}

/// Render the summary panel: metric cards, three count charts, the histogram.
pub fn summary_panel(core: &DashboardCore) -> String {
    let dataset = core.dataset();
    let mut out = render::render_summary(&DashboardSummary::from_dataset(&dataset));
    for field in [CategoryField::Doctor, CategoryField::Shift, CategoryField::Gender] {
        out.push('\n');
        out.push_str(&render::render_counts(&CategoryCounts::from_dataset(&dataset, field)));
    }
    out.push('\n');
    out.push_str(&render::render_histogram(&AgeHistogram::respiratory_cases(&dataset)));
    out
}

/// Compute and render the binomial panel.
pub fn binomial_panel(core: &DashboardCore, trials: u32, target: u32) -> Result<String, AnalysisError> {
    let dataset = core.dataset();
    let result = DistributionEngine::new(&dataset).binomial_analysis(trials, target)?;
    Ok(distribution_panel(&result, trials))
}

/// Compute and render the Poisson panel.
pub fn poisson_panel(core: &DashboardCore, target: u32) -> Result<String, AnalysisError> {
    let dataset = core.dataset();
    let result = DistributionEngine::new(&dataset).poisson_analysis(target)?;
    Ok(distribution_panel(&result, 0))
}

fn distribution_panel(result: &DistributionResult, trials: u32) -> String {
    let statement = ProbabilityStatement::for_result(result, trials);
    render::render_distribution(result, &statement)
}

/// Line-driven dashboard session.
pub struct Session<'a> {
    core: &'a DashboardCore,
    sliders: Sliders,
}

impl<'a> Session<'a> {
    /// Start a session with sliders at their configured defaults.
    pub fn new(core: &'a DashboardCore) -> Self {
        let defaults = &core.config().sliders;
        Self {
            core,
            sliders: Sliders {
                trials: defaults.trials,
                binomial_target: defaults.binomial_target,
                poisson_target: defaults.poisson_target,
            },
        }
    }

    /// Current slider positions.
    pub fn sliders(&self) -> Sliders {
        self.sliders
    }

    /// Run until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        writeln!(output, "{}", HELP)?;
        for line in input.lines() {
            let line = line.context("failed to read session input")?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(output, "error: {:#}", e)?;
                    continue;
                }
            };
            debug!(?command, "Session command");

            if command == Command::Quit {
                break;
            }
            let rendered = self.apply(command);
            write!(output, "{}", rendered)?;
            output.flush()?;
        }
        Ok(())
    }

    /// Apply one command and render the affected panel.
    fn apply(&mut self, command: Command) -> String {
        match command {
            Command::Summary => summary_panel(self.core),
            Command::Binomial { trials, target } => {
                self.sliders.trials = trials;
                self.sliders.binomial_target = target;
                self.render_binomial()
            }
            Command::Trials(trials) => {
                self.sliders.trials = trials;
                self.render_binomial()
            }
            Command::Target(target) => {
                self.sliders.binomial_target = target;
                self.render_binomial()
            }
            Command::Poisson(target) => {
                self.sliders.poisson_target = target;
                match poisson_panel(self.core, target) {
                    Ok(text) => text,
                    Err(e) => format!("error: {}\n", e),
                }
            }
            Command::Export(path) => match self.export(&path) {
                Ok(text) => text,
                Err(e) => format!("error: {:#}\n", e),
            },
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    fn render_binomial(&self) -> String {
        match binomial_panel(self.core, self.sliders.trials, self.sliders.binomial_target) {
            Ok(text) => text,
            Err(e) => format!("error: {}\n", e),
        }
    }

    fn export(&self, path: &Path) -> Result<String> {
        let dataset = self.core.dataset();
        let file = TableExporter::with_config(&dataset, &self.core.config().export)?.export()?;
        std::fs::write(path, &file.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(format!(
            "Exported {} rows to {} (sha256 {})\n",
            file.row_count,
            path.display(),
            file.sha256
        ))
    }
}
