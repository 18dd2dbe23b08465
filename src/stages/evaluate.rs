use crate::artifact::ArtifactStore;
use crate::error::Result;
use crate::evaluation::evaluate_models;
use crate::orchestrator::RunContext;
use crate::preprocessing::FittedTransformer;
use crate::stages::read_stage_input;
use tracing::{info, warn};

pub const CALLABLE: &str = "evaluate::run";

/// Score the stored models on the held-out split.
///
/// The test records go through the stored transform; nothing is refit. A
/// stored transform with no models beside it is an error.
pub fn run(ctx: &RunContext) -> Result<()> {
    let layout = ctx.layout();
    let store = ArtifactStore::for_layout(layout);
    if !store.has_artifacts() {
        warn!(dir = %store.dir().display(), "no trained models found, skipping evaluation");
        return Ok(());
    }

    let test = read_stage_input(&layout.test_data(), "preprocess")?;
    let (transform, models) = store.load_all()?;
    let features = transform.transform(&test)?;

    let report = evaluate_models(&transform, &models, &features)?;
    for (name, eval) in &report.models {
        info!(model = %name, accuracy = eval.accuracy, "evaluated");
    }
    report.write_json(layout.evaluation_report())?;
    report.write_summary(layout.evaluation_summary())?;
    info!(path = %layout.evaluation_report().display(), "wrote evaluation report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, ProjectLayout};
    use crate::error::PipelineError;
    use crate::data::{generate_records, RawFrame};
    use crate::evaluation::EvaluationReport;
    use crate::model::{train_candidates, TrainingOptions};
    use crate::preprocessing::{FeaturePipeline, Transformer};
    use std::fs;

    #[test]
    fn test_skips_without_models() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        layout.ensure().unwrap();
        run(&RunContext::new(layout.clone(), PipelineConfig::default())).unwrap();
        assert!(!layout.evaluation_report().exists());
    }

    #[test]
    fn test_transform_without_models_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        layout.ensure().unwrap();
        let frame = RawFrame::from_records(&generate_records(30, Some(5)));
        let transform = FeaturePipeline::default().fit(&frame).unwrap();
        ArtifactStore::for_layout(&layout).save(&transform, &[]).unwrap();
        frame.write_csv(layout.test_data()).unwrap();

        let err = run(&RunContext::new(layout.clone(), PipelineConfig::default())).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMissing(_)));
        assert!(!layout.evaluation_report().exists());
    }

    #[test]
    fn test_writes_report_for_every_model() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        layout.ensure().unwrap();

        let train = RawFrame::from_records(&generate_records(60, Some(21)));
        let (transform, features) = FeaturePipeline::default().fit_transform(&train).unwrap();
        let options = TrainingOptions {
            epochs: 20,
            ..TrainingOptions::default()
        };
        let models = train_candidates(&features, &transform, &options).unwrap();
        ArtifactStore::for_layout(&layout).save(&transform, &models).unwrap();
        RawFrame::from_records(&generate_records(15, Some(22)))
            .write_csv(layout.test_data())
            .unwrap();

        run(&RunContext::new(layout.clone(), PipelineConfig::default())).unwrap();

        let json = fs::read_to_string(layout.evaluation_report()).unwrap();
        let report: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.n_samples, 15);
        let names: Vec<&str> = report.models.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["baseline", "logistic", "logistic_l2"]);
        assert!(layout.evaluation_summary().is_file());
    }
}
