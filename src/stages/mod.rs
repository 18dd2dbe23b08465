//! Built-in, in-process stage bodies.
//!
//! Each module exposes the name its callable is registered under and a `run`
//! function taking the shared [`RunContext`](crate::orchestrator::RunContext).

pub mod evaluate;
pub mod features;
pub mod generate;
pub mod preprocess;
pub mod save;
pub mod train;

use crate::data::RawFrame;
use crate::error::{PipelineError, Result};
use std::path::Path;

/// Read a CSV the pipeline produced earlier, naming the stage that writes it
/// when it is absent.
pub(crate) fn read_stage_input(path: &Path, produced_by: &str) -> Result<RawFrame> {
    if !path.is_file() {
        return Err(PipelineError::ArtifactMissing(format!(
            "{} not found; run the {} stage first",
            path.display(),
            produced_by
        )));
    }
    Ok(RawFrame::read_csv(path)?)
}
