//! `pipeline` entry point: run all or selected stages.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use student_tracker::config::{PipelineConfig, ProjectLayout};
use student_tracker::orchestrator::{Orchestrator, RunContext, RunResult, Stage};
use student_tracker::{logging, PipelineError, Result};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(about = "Run the student progress tracking pipeline")]
#[command(version)]
struct Cli {
    /// Run every stage in the default order
    #[arg(long, conflicts_with = "steps")]
    all: bool,

    /// Run only these stages, in the order given
    #[arg(long, value_enum, num_args = 1..)]
    steps: Vec<Stage>,

    /// Project root holding data/, models/ and reports/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Settings file (defaults to <root>/pipeline.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(RunResult::Completed(reports)) => {
            for report in &reports {
                debug!(
                    stage = %report.stage,
                    outcome = ?report.outcome,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "stage summary"
                );
            }
            info!(stages = reports.len(), "all requested stages finished");
            ExitCode::SUCCESS
        }
        Ok(RunResult::Failed { error, .. }) => {
            eprintln!("{}", failure_message(&error));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunResult> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::load_or_default(&cli.root)?,
    };
    let ctx = RunContext::new(ProjectLayout::new(&cli.root), config);
    let orchestrator = Orchestrator::default();

    if cli.all || cli.steps.is_empty() {
        orchestrator.default_run(&ctx)
    } else {
        orchestrator.run(&ctx, &cli.steps)
    }
}

/// Stage errors already name their stage.
fn failure_message(error: &PipelineError) -> String {
    format!("Error: {}", error)
}
