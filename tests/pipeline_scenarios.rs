use std::fs;
use student_tracker::config::{PipelineConfig, ProjectLayout};
use student_tracker::data::{Cell, RawFrame, StudentRecord};
use student_tracker::error::{FailureCause, PipelineError, Result};
use student_tracker::evaluation::EvaluationReport;
use student_tracker::inference::predict_record;
use student_tracker::orchestrator::{Orchestrator, RunContext, Stage, StageOutcome, StageRegistry};
use student_tracker::preprocessing::{
    FeaturePipeline, FittedTransformer, HandleUnknown, PreprocessingError, SchemaMismatch, Transformer,
};
use student_tracker::stages;

fn quick_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.generate.rows = 100;
    config.generate.seed = Some(42);
    config.train.epochs = 50;
    config
}

fn context(dir: &tempfile::TempDir) -> RunContext {
    RunContext::new(ProjectLayout::new(dir.path()), quick_config())
}

#[test]
fn test_default_run_reports_every_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let result = Orchestrator::default().default_run(&ctx).unwrap();
    assert!(result.is_success(), "run failed: {:?}", result.error());
    let ran: Vec<Stage> = result.reports().iter().map(|r| r.stage).collect();
    assert_eq!(ran, Stage::default_order().to_vec());

    let layout = ctx.layout();
    let report: EvaluationReport =
        serde_json::from_str(&fs::read_to_string(layout.evaluation_report()).unwrap()).unwrap();
    assert!(report.n_samples > 0);
    for name in ["baseline", "logistic", "logistic_l2"] {
        let eval = &report.models[name];
        assert!((0.0..=1.0).contains(&eval.accuracy));
        assert!(!eval.classification_report.classes.is_empty());
    }

    let manifest = fs::read_to_string(layout.manifest()).unwrap();
    assert!(manifest.contains("logistic.model.bin"));
    assert!(manifest.contains("evaluation.json"));

    let record = StudentRecord::new(92.0, 9.0, 81.0, 88.0, "Consistently brilliant");
    let prediction = predict_record(layout, "logistic", &record).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

fn good_bad_frame() -> RawFrame {
    let mut frame = RawFrame::new([
        "attendance",
        "assignments_completed",
        "midterm_score",
        "final_score",
        "feedback",
        "passed",
    ])
    .unwrap();
    for (i, text) in ["good", "bad", "good", "bad"].iter().enumerate() {
        let v = 60.0 + 10.0 * i as f64;
        frame
            .push_row(vec![
                Cell::Number(v),
                Cell::Number(5.0 + i as f64),
                Cell::Number(v),
                Cell::Number(v),
                Cell::from(*text),
                Cell::Number((i % 2) as f64),
            ])
            .unwrap();
    }
    frame
}

#[test]
fn test_unseen_feedback_bucketed_or_rejected() {
    let frame = good_bad_frame();
    let record = StudentRecord::new(80.0, 8.0, 75.0, 78.0, "Excellent");

    let bucketed = FeaturePipeline::default().fit(&frame).unwrap();
    let features = bucketed.transform_record(&record).unwrap();
    let names = bucketed.feature_names();
    assert_eq!(&names[4..], ["feedback__bad", "feedback__good", "feedback__unknown"]);
    assert!(features.matrix[[0, 6]] > 0.0);
    assert_eq!(features.matrix[[0, 4]], 0.0);
    assert_eq!(features.matrix[[0, 5]], 0.0);
    assert!(features.target.is_none());

    let strict = FeaturePipeline::default()
        .with_handle_unknown(HandleUnknown::Error)
        .fit(&frame)
        .unwrap();
    match strict.transform_record(&record) {
        Err(PreprocessingError::SchemaMismatch(SchemaMismatch::UnknownCategory { column, token, .. })) => {
            assert_eq!(column, "feedback");
            assert_eq!(token, "excellent");
        }
        other => panic!("expected an unknown-category mismatch, got {:?}", other),
    }
    assert_eq!(strict.n_features_out(), 6);
}

#[test]
fn test_failing_train_stops_before_evaluate() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let registry = StageRegistry::standard().with_callable(stages::train::CALLABLE, |_: &RunContext| -> Result<()> {
        Err(PipelineError::InvalidInput("model fitting blew up".to_string()))
    });

    let result = Orchestrator::new(registry).default_run(&ctx).unwrap();

    assert_eq!(result.exit_code(), 1);
    let (stage, err) = result.error().unwrap();
    assert_eq!(stage, Stage::Train);
    assert!(err.to_string().contains("train"));
    assert!(matches!(err.root(), PipelineError::InvalidInput(_)));

    let ran: Vec<Stage> = result.reports().iter().map(|r| r.stage).collect();
    assert_eq!(ran, vec![Stage::Generate, Stage::Preprocess, Stage::Features]);
    assert!(!ctx.layout().evaluation_report().exists());
    assert!(!ctx.layout().manifest().exists());
}

#[test]
fn test_unresolvable_dashboard_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let result = Orchestrator::default()
        .run(&context(&dir), &[Stage::Dashboard])
        .unwrap();
    assert!(result.is_success());
    assert_eq!(result.reports()[0].outcome, StageOutcome::Skipped);
}

#[cfg(unix)]
#[test]
fn test_external_script_used_when_no_callable() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join("dashboard.sh"), "echo built > dashboard_ran.txt\n").unwrap();

    let result = Orchestrator::default()
        .run(&context(&dir), &[Stage::Dashboard])
        .unwrap();

    assert!(result.is_success());
    assert_eq!(
        result.reports()[0].outcome,
        StageOutcome::External(scripts.join("dashboard.sh"))
    );
    assert!(dir.path().join("dashboard_ran.txt").is_file());
}

#[cfg(unix)]
#[test]
fn test_script_exit_status_fails_stage() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join("train_model.sh"), "exit 3\n").unwrap();

    let registry = StageRegistry::standard().without_callable(stages::train::CALLABLE);
    let result = Orchestrator::new(registry)
        .run(&context(&dir), &[Stage::Train, Stage::Evaluate])
        .unwrap();

    match result.error() {
        Some((
            Stage::Train,
            PipelineError::StageExecution {
                cause: FailureCause::ExitCode(3),
                ..
            },
        )) => {}
        other => panic!("expected exit status 3 from train, got {:?}", other),
    }
    assert!(result.reports().is_empty());
}
