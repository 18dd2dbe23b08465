use crate::artifact::ArtifactStore;
use crate::error::Result;
use crate::model::train_candidates;
use crate::orchestrator::RunContext;
use crate::preprocessing::{FittedFeaturePipeline, FittedTransformer, Transformer};
use crate::stages::read_stage_input;
use tracing::{info, warn};

pub const CALLABLE: &str = "train::run";

/// Train every candidate and persist them with the transform they were fit on.
///
/// Reuses the transform staged by `features` when it matches the current
/// `[features]` settings, and fits a fresh one otherwise.
pub fn run(ctx: &RunContext) -> Result<()> {
    let layout = ctx.layout();
    let train = read_stage_input(&layout.train_data(), "preprocess")?;
    let settings = &ctx.config().features;

    let staged = layout.staged_transform();
    let reusable = if staged.is_file() {
        let transform = FittedFeaturePipeline::load_from_file(&staged)?;
        if settings.is_compatible(&transform) {
            Some(transform)
        } else {
            warn!(path = %staged.display(), "staged transform does not match [features]; refitting");
            None
        }
    } else {
        None
    };

    let (transform, features) = match reusable {
        Some(transform) => {
            info!(path = %staged.display(), "using staged feature transform");
            let features = transform.transform(&train)?;
            (transform, features)
        }
        None => settings.pipeline().fit_transform(&train)?,
    };

    let models = train_candidates(&features, &transform, &ctx.config().train)?;
    ArtifactStore::for_layout(layout).save(&transform, &models)?;
    info!(models = models.len(), "training finished");
    Ok(())
}
