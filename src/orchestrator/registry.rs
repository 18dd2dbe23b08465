//! Static table of how each stage resolves to an implementation.

use crate::error::PipelineError;
use crate::orchestrator::implementation::{find_script, Candidate, Implementation, StageAction};
use crate::orchestrator::{RunContext, Stage};
use crate::stages;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, Level};

/// What to do when no candidate of a stage is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// Log at the given level and continue the run.
    Skip(Level),
    /// Fail the run with [`PipelineError::Unresolved`].
    Fail,
}

/// Ordered candidates for one stage plus its unresolved policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageBinding {
    pub candidates: Vec<Candidate>,
    pub on_unresolved: UnresolvedPolicy,
}

impl StageBinding {
    pub fn new(candidates: Vec<Candidate>, on_unresolved: UnresolvedPolicy) -> Self {
        Self {
            candidates,
            on_unresolved,
        }
    }
}

/// Callables by name, and the binding for every stage.
#[derive(Clone)]
pub struct StageRegistry {
    callables: HashMap<String, Arc<dyn StageAction>>,
    bindings: HashMap<Stage, StageBinding>,
}

fn standard_binding(stage: Stage) -> StageBinding {
    use Candidate as C;
    let skip_warn = UnresolvedPolicy::Skip(Level::WARN);
    let skip_info = UnresolvedPolicy::Skip(Level::INFO);

    match stage {
        Stage::Generate => StageBinding::new(
            vec![
                C::in_process(stages::generate::CALLABLE),
                C::script("generate_data"),
            ],
            skip_warn,
        ),
        Stage::Preprocess => StageBinding::new(
            vec![
                C::in_process(stages::preprocess::CALLABLE),
                C::script("preprocess"),
                C::script("data_preprocessing"),
                C::script("generate_processed"),
            ],
            skip_warn,
        ),
        Stage::Features => StageBinding::new(
            vec![
                C::in_process(stages::features::CALLABLE),
                C::script("feature_engineering"),
            ],
            skip_info,
        ),
        Stage::Train => StageBinding::new(
            vec![
                C::in_process(stages::train::CALLABLE),
                C::script("train_model"),
            ],
            skip_warn,
        ),
        Stage::Evaluate => StageBinding::new(
            vec![
                C::in_process(stages::evaluate::CALLABLE),
                C::script("evaluate_model"),
            ],
            skip_info,
        ),
        Stage::Save => StageBinding::new(vec![C::in_process(stages::save::CALLABLE)], skip_warn),
        Stage::Dashboard => StageBinding::new(vec![C::script("dashboard")], skip_info),
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl StageRegistry {
    /// Standard bindings with no callables registered; only scripts resolve.
    pub fn empty() -> Self {
        Self {
            callables: HashMap::new(),
            bindings: Stage::ALL
                .iter()
                .map(|&stage| (stage, standard_binding(stage)))
                .collect(),
        }
    }

    /// Standard bindings with every built-in stage callable registered.
    pub fn standard() -> Self {
        Self::empty()
            .with_callable(stages::generate::CALLABLE, stages::generate::run)
            .with_callable(stages::preprocess::CALLABLE, stages::preprocess::run)
            .with_callable(stages::features::CALLABLE, stages::features::run)
            .with_callable(stages::train::CALLABLE, stages::train::run)
            .with_callable(stages::evaluate::CALLABLE, stages::evaluate::run)
            .with_callable(stages::save::CALLABLE, stages::save::run)
    }

    pub fn with_callable<A>(mut self, name: impl Into<String>, action: A) -> Self
    where
        A: StageAction + 'static,
    {
        self.callables.insert(name.into(), Arc::new(action));
        self
    }

    pub fn without_callable(mut self, name: &str) -> Self {
        self.callables.remove(name);
        self
    }

    pub fn with_binding(mut self, stage: Stage, binding: StageBinding) -> Self {
        self.bindings.insert(stage, binding);
        self
    }

    pub fn binding(&self, stage: Stage) -> Option<&StageBinding> {
        self.bindings.get(&stage)
    }

    /// Walk the stage's candidates; the first available one wins.
    ///
    /// Returns `None` when none is available. Unavailable candidates are
    /// logged at info and skipped.
    pub fn resolve(&self, stage: Stage, ctx: &RunContext) -> Option<Implementation> {
        let binding = self.bindings.get(&stage)?;

        for candidate in &binding.candidates {
            let found = match candidate {
                Candidate::InProcess(name) => {
                    self.callables
                        .get(name)
                        .map(|action| Implementation::InProcess {
                            name: name.clone(),
                            action: Arc::clone(action),
                        })
                }
                Candidate::Script(base) => find_script(base, ctx.search_paths())
                    .map(|path| Implementation::for_script(path, &ctx.config().scripts.python)),
            };

            match found {
                Some(implementation) => return Some(implementation),
                None => {
                    let not_found = PipelineError::ImplementationNotFound {
                        stage,
                        candidate: candidate.to_string(),
                    };
                    info!(stage = %stage, "{}, trying next candidate", not_found);
                }
            }
        }
        None
    }
}
