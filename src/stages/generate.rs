use crate::data::{generate_records, write_records};
use crate::error::Result;
use crate::orchestrator::RunContext;
use tracing::info;

pub const CALLABLE: &str = "generate::run";

/// Write a synthetic dataset to `data/raw/student_data.csv`.
pub fn run(ctx: &RunContext) -> Result<()> {
    let settings = &ctx.config().generate;
    let records = generate_records(settings.rows, settings.seed);
    let path = ctx.layout().raw_data();
    write_records(&path, &records)?;

    let passed = records.iter().filter(|r| r.passed == Some(1)).count();
    info!(
        path = %path.display(),
        rows = records.len(),
        passed,
        "generated synthetic student data"
    );
    Ok(())
}
