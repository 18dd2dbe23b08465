//! `predict` entry point: score one student record with a stored model.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use student_tracker::config::ProjectLayout;
use student_tracker::data::StudentRecord;
use student_tracker::inference::predict_record;
use student_tracker::logging;
use student_tracker::recommender::recommendations;

#[derive(Parser)]
#[command(name = "predict")]
#[command(about = "Predict whether a student passes, with study recommendations")]
#[command(version)]
struct Cli {
    /// Attendance percentage (0-100)
    attendance: String,

    /// Assignments completed, out of 10
    assignments_completed: String,

    /// Midterm score (0-100)
    midterm_score: String,

    /// Final score (0-100)
    final_score: String,

    /// Free-text instructor feedback
    #[arg(num_args = 1..)]
    feedback: Vec<String>,

    /// Stored model to use
    #[arg(short, long, default_value = "logistic")]
    model: String,

    /// Project root holding models/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// More log output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.verbose == 0));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn number(name: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be numeric, got '{}'", name, raw))?;
    anyhow::ensure!(value.is_finite(), "{} must be a finite number, got '{}'", name, raw);
    Ok(value)
}

fn run(cli: &Cli) -> Result<()> {
    let record = StudentRecord::new(
        number("attendance", &cli.attendance)?,
        number("assignments_completed", &cli.assignments_completed)?,
        number("midterm_score", &cli.midterm_score)?,
        number("final_score", &cli.final_score)?,
        cli.feedback.join(" "),
    );

    let prediction = predict_record(&ProjectLayout::new(&cli.root), &cli.model, &record)
        .with_context(|| format!("cannot score record with model '{}'", cli.model))?;

    let outcome = if prediction.label == 1 { "pass" } else { "fail" };
    println!("Model: {}", prediction.model);
    println!("Predicted outcome: {} ({})", prediction.label, outcome);
    println!("Pass probability: {:.3}", prediction.probability);
    println!("Recommendations:");
    for rec in recommendations(&record) {
        println!("  - {}", rec);
    }
    Ok(())
}
