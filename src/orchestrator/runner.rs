use crate::error::{PipelineError, Result};
use crate::orchestrator::implementation::Implementation;
use crate::orchestrator::registry::{StageRegistry, UnresolvedPolicy};
use crate::orchestrator::{RunContext, Stage};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Level};

/// How a stage was carried out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    InProcess(String),
    External(PathBuf),
    Skipped,
}

#[derive(Clone, Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
    pub elapsed: Duration,
}

/// Result of one run: every stage succeeded, or the first failure.
#[derive(Debug)]
pub enum RunResult {
    Completed(Vec<StageReport>),
    Failed {
        completed: Vec<StageReport>,
        stage: Stage,
        error: PipelineError,
    },
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Completed(_))
    }

    /// Reports of the stages that finished.
    pub fn reports(&self) -> &[StageReport] {
        match self {
            RunResult::Completed(reports) => reports,
            RunResult::Failed { completed, .. } => completed,
        }
    }

    pub fn error(&self) -> Option<(Stage, &PipelineError)> {
        match self {
            RunResult::Completed(_) => None,
            RunResult::Failed { stage, error, .. } => Some((*stage, error)),
        }
    }

    /// Process exit status: 0 on success, 1 on failure.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }
}

/// Runs stages strictly in order and stops at the first failure.
#[derive(Clone, Default)]
pub struct Orchestrator {
    registry: StageRegistry,
}

impl Orchestrator {
    pub fn new(registry: StageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Run `stages` in the given order.
    ///
    /// The project directories are created first; failing to create them is
    /// the only error returned directly. Stage failures are reported in the
    /// [`RunResult`].
    pub fn run(&self, ctx: &RunContext, stages: &[Stage]) -> Result<RunResult> {
        let _run = ctx.span().clone().entered();
        ctx.layout().ensure()?;

        let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
        info!(steps = ?names, "pipeline start");

        let mut completed = Vec::with_capacity(stages.len());
        for &stage in stages {
            let _span = info_span!("stage", stage = %stage).entered();
            info!("=== STEP: {} ===", stage);

            let started = Instant::now();
            match self.run_stage(stage, ctx) {
                Ok(outcome) => completed.push(StageReport {
                    stage,
                    outcome,
                    elapsed: started.elapsed(),
                }),
                Err(err) => {
                    error!(error = %err, "stage failed");
                    return Ok(RunResult::Failed {
                        completed,
                        stage,
                        error: err,
                    });
                }
            }
        }

        info!("pipeline finished successfully");
        Ok(RunResult::Completed(completed))
    }

    /// Run the default stage order.
    pub fn default_run(&self, ctx: &RunContext) -> Result<RunResult> {
        self.run(ctx, Stage::default_order())
    }

    fn run_stage(&self, stage: Stage, ctx: &RunContext) -> Result<StageOutcome> {
        if let Some(implementation) = self.registry.resolve(stage, ctx) {
            implementation.execute(stage, ctx)?;
            return Ok(match implementation {
                Implementation::InProcess { name, .. } => StageOutcome::InProcess(name),
                Implementation::ExternalProcess { script, .. } => StageOutcome::External(script),
            });
        }

        let policy = self
            .registry
            .binding(stage)
            .map_or(UnresolvedPolicy::Fail, |b| b.on_unresolved);
        match policy {
            UnresolvedPolicy::Skip(level) => {
                if level == Level::WARN {
                    warn!("no implementation found for stage '{}', skipping", stage);
                } else {
                    info!("no implementation found for stage '{}', skipping", stage);
                }
                Ok(StageOutcome::Skipped)
            }
            UnresolvedPolicy::Fail => Err(PipelineError::Unresolved { stage }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, ProjectLayout};
    use crate::orchestrator::registry::StageBinding;
    use crate::orchestrator::implementation::Candidate;
    use crate::error::FailureCause;
    use std::sync::{Arc, Mutex};

    fn recording_registry(log: &Arc<Mutex<Vec<Stage>>>) -> StageRegistry {
        let mut registry = StageRegistry::empty();
        for stage in Stage::ALL {
            let log = Arc::clone(log);
            let name = format!("test::{}", stage);
            registry = registry
                .with_callable(name.clone(), move |_: &RunContext| -> Result<()> {
                    log.lock().unwrap().push(stage);
                    Ok(())
                })
                .with_binding(
                    stage,
                    StageBinding::new(
                        vec![Candidate::in_process(name)],
                        UnresolvedPolicy::Skip(Level::INFO),
                    ),
                );
        }
        registry
    }

    fn context(dir: &tempfile::TempDir) -> RunContext {
        RunContext::new(ProjectLayout::new(dir.path()), PipelineConfig::default())
    }

    #[test]
    fn test_stages_run_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = Orchestrator::new(recording_registry(&log));

        let order = [Stage::Evaluate, Stage::Generate, Stage::Dashboard, Stage::Generate];
        let result = orchestrator.run(&context(&dir), &order).unwrap();

        assert!(result.is_success());
        assert_eq!(*log.lock().unwrap(), order.to_vec());
        assert_eq!(result.reports().len(), 4);
        assert!(ProjectLayout::new(dir.path()).models_dir().is_dir());
    }

    #[test]
    fn test_default_run_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = Orchestrator::new(recording_registry(&log));

        orchestrator.default_run(&context(&dir)).unwrap();
        assert_eq!(*log.lock().unwrap(), Stage::default_order().to_vec());
    }

    #[test]
    fn test_first_failure_stops_run() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&log).with_callable("test::train", |_: &RunContext| -> Result<()> {
            Err(PipelineError::InvalidInput("boom".to_string()))
        });

        let result = Orchestrator::new(registry)
            .run(&context(&dir), &[Stage::Generate, Stage::Train, Stage::Evaluate])
            .unwrap();

        assert_eq!(result.exit_code(), 1);
        assert_eq!(*log.lock().unwrap(), vec![Stage::Generate]);
        let (stage, err) = result.error().unwrap();
        assert_eq!(stage, Stage::Train);
        assert!(matches!(
            err,
            PipelineError::StageExecution { stage: Stage::Train, cause: FailureCause::Error(_) }
        ));
        assert_eq!(result.reports().len(), 1);
    }

    #[test]
    fn test_unresolved_stage_skipped_or_failed() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(StageRegistry::empty());
        let result = orchestrator.run(&context(&dir), &[Stage::Dashboard]).unwrap();
        assert!(result.is_success());
        assert_eq!(result.reports()[0].outcome, StageOutcome::Skipped);

        let strict = StageRegistry::empty().with_binding(
            Stage::Dashboard,
            StageBinding::new(vec![Candidate::script("dashboard")], UnresolvedPolicy::Fail),
        );
        let result = Orchestrator::new(strict)
            .run(&context(&dir), &[Stage::Dashboard])
            .unwrap();
        assert!(matches!(
            result.error(),
            Some((Stage::Dashboard, PipelineError::Unresolved { .. }))
        ));
    }
}
