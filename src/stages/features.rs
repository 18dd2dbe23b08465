use crate::data::{Cell, RawFrame};
use crate::error::Result;
use crate::orchestrator::RunContext;
use crate::preprocessing::{FeatureSet, FittedTransformer, Transformer};
use crate::stages::read_stage_input;
use std::path::Path;
use tracing::info;

pub const CALLABLE: &str = "features::run";

/// Fit the feature transform on the training split and stage it for `train`.
///
/// Also writes the encoded training matrix for inspection.
pub fn run(ctx: &RunContext) -> Result<()> {
    let layout = ctx.layout();
    let train = read_stage_input(&layout.train_data(), "preprocess")?;

    let (transform, features) = ctx.config().features.pipeline().fit_transform(&train)?;
    transform.save_to_file(layout.staged_transform())?;
    write_feature_matrix(&features, &layout.train_features())?;

    info!(
        features = transform.n_features_out(),
        rows = features.n_samples(),
        fingerprint = %format!("{:08x}", transform.fingerprint()),
        "fitted feature transform"
    );
    Ok(())
}

/// Encoded features as CSV: feature names, then the target when present.
fn write_feature_matrix(features: &FeatureSet, path: &Path) -> Result<()> {
    let mut columns = features.feature_names.clone();
    if features.target.is_some() {
        columns.push(features.target_column.clone());
    }
    let mut frame = RawFrame::new(columns)?;
    for (i, row) in features.matrix.rows().into_iter().enumerate() {
        let mut cells: Vec<Cell> = row.iter().map(|&v| Cell::Number(v)).collect();
        if let Some(target) = &features.target {
            cells.push(Cell::Number(target[i]));
        }
        frame.push_row(cells)?;
    }
    frame.write_csv(path)?;
    Ok(())
}
