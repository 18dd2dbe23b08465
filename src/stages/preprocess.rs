use crate::data::train_test_split;
use crate::error::{PipelineError, Result};
use crate::orchestrator::RunContext;
use crate::stages::read_stage_input;
use std::fs;
use tracing::{info, warn};

pub const CALLABLE: &str = "preprocess::run";

/// Clean the raw data and split it into train and test files.
///
/// A transform staged by an earlier `features` run was fit on the previous
/// split and is removed.
pub fn run(ctx: &RunContext) -> Result<()> {
    let layout = ctx.layout();
    let mut frame = read_stage_input(&layout.raw_data(), "generate")?;

    let dropped = frame.drop_incomplete_rows();
    if dropped > 0 {
        warn!(dropped, "dropped rows with missing values");
    }
    if frame.n_rows() < 2 {
        return Err(PipelineError::InvalidInput(format!(
            "need at least 2 complete rows to split, found {}",
            frame.n_rows()
        )));
    }

    let split = &ctx.config().split;
    let indices = train_test_split(frame.n_rows(), split.test_fraction, split.seed);
    let train = frame.select_rows(&indices.train);
    let test = frame.select_rows(&indices.test);

    train.write_csv(layout.train_data())?;
    test.write_csv(layout.test_data())?;
    info!(
        train_rows = train.n_rows(),
        test_rows = test.n_rows(),
        dropped,
        "wrote train/test split"
    );

    let staged = layout.staged_transform();
    if staged.is_file() {
        fs::remove_file(&staged)?;
        info!(path = %staged.display(), "removed transform staged for the previous split");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, ProjectLayout};
    use crate::data::{generate_records, RawFrame};
    use crate::preprocessing::{FittedTransformer, Transformer};

    fn context(dir: &tempfile::TempDir) -> RunContext {
        let layout = ProjectLayout::new(dir.path());
        layout.ensure().unwrap();
        RunContext::new(layout, PipelineConfig::default())
    }

    #[test]
    fn test_drops_incomplete_and_splits() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let mut csv = String::from(
            "student_id,attendance,assignments_completed,midterm_score,final_score,feedback,passed\n",
        );
        for i in 0..10 {
            csv.push_str(&format!("{},90,8,70,75,Good effort,1\n", i));
        }
        csv.push_str("10,,8,70,75,Good effort,1\n");
        fs::write(ctx.layout().raw_data(), csv).unwrap();

        run(&ctx).unwrap();

        let train = RawFrame::read_csv(ctx.layout().train_data()).unwrap();
        let test = RawFrame::read_csv(ctx.layout().test_data()).unwrap();
        assert_eq!(train.n_rows(), 8);
        assert_eq!(test.n_rows(), 2);
    }

    #[test]
    fn test_new_split_discards_staged_transform() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let frame = RawFrame::from_records(&generate_records(30, Some(4)));
        frame.write_csv(ctx.layout().raw_data()).unwrap();
        let stale = ctx.config().features.pipeline().fit(&frame).unwrap();
        stale.save_to_file(ctx.layout().staged_transform()).unwrap();

        run(&ctx).unwrap();

        assert!(ctx.layout().train_data().is_file());
        assert!(!ctx.layout().staged_transform().exists());
    }

    #[test]
    fn test_missing_raw_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&context(&dir)).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMissing(_)));
    }
}
