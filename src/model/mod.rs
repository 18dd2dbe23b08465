//! Classifiers trained on the encoded student features.
//!
//! Models use a type-state split: a `LinearModel<Unfitted>` is driven by the
//! [`Trainer`](crate::trainer::Trainer) through [`TrainableModel`], and only the
//! `Fitted` form implements [`InferenceModel`]. Every persisted model is a
//! [`TrainedModel`] that remembers which fitted feature transform it was
//! trained against.

pub mod baseline;
pub mod candidates;
pub mod linear;
pub mod state;
pub mod trained;

pub use baseline::{MajorityClassParams, MajorityClassifier};
pub use candidates::{train_candidates, CandidateKind, TrainingOptions};
pub use linear::{sigmoid, LinearModel, LinearParams, LogisticRegression};
pub use state::{Fitted, Unfitted};
pub use trained::{Predictor, PredictorParams, TrainedModel, TrainedModelParams};

use crate::serialization::{write_atomic, SerializableParams};
use std::path::Path;
use thiserror::Error;

/// Error type for model training and inference.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Empty data: {0}")]
    EmptyData(String),
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Training diverged: {0}")]
    Diverged(String),
    /// The model was trained against a different fitted feature transform.
    #[error("model '{model}' expects feature transform {expected:08x}, found {found:08x}")]
    TransformMismatch {
        model: String,
        expected: u32,
        found: u32,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for ModelError {
    fn from(err: bincode::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

pub trait TrainableModel {
    type Input;
    type Prediction;
    type Params;
    type Gradients;
    type Output;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);

    fn into_fitted(self) -> Self::Output;
}

pub trait ParamOps: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, scalar: f64) -> Self;
}

pub trait InferenceModel {
    type InputSingle: ?Sized;
    type OutputSingle;
    type InputBatch: ?Sized;
    type OutputBatch;
    type ParamsRepr: SerializableParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle;
    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch;

    fn extract_params(&self) -> Self::ParamsRepr;
    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError>
    where
        Self: Sized;

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        write_atomic(path, &bytes)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        let params = Self::ParamsRepr::from_bytes(&bytes)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        Self::from_params(params)
    }
}
