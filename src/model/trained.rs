//! Named, persisted predictors bound to one fitted feature transform.

use crate::model::baseline::{MajorityClassParams, MajorityClassifier};
use crate::model::linear::{LinearParams, LogisticRegression};
use crate::model::{InferenceModel, ModelError};
use crate::preprocessing::{FittedFeaturePipeline, FittedTransformer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub enum Predictor {
    MajorityClass(MajorityClassifier),
    Logistic(LogisticRegression),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PredictorParams {
    MajorityClass(MajorityClassParams),
    Logistic(LinearParams),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModelParams {
    pub name: String,
    pub predictor: PredictorParams,
    pub feature_names: Vec<String>,
    pub transform_fingerprint: u32,
}

/// A trained classifier plus the feature layout it was trained on.
#[derive(Clone, Debug)]
pub struct TrainedModel {
    name: String,
    predictor: Predictor,
    feature_names: Vec<String>,
    transform_fingerprint: u32,
}

impl TrainedModel {
    pub fn new(name: impl Into<String>, predictor: Predictor, transform: &FittedFeaturePipeline) -> Self {
        Self {
            name: name.into(),
            predictor,
            feature_names: transform.feature_names().to_vec(),
            transform_fingerprint: transform.fingerprint(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn transform_fingerprint(&self) -> u32 {
        self.transform_fingerprint
    }

    /// Reject a transform other than the one this model was trained against.
    pub fn check_compatible(&self, transform: &FittedFeaturePipeline) -> Result<(), ModelError> {
        if transform.fingerprint() != self.transform_fingerprint {
            return Err(ModelError::TransformMismatch {
                model: self.name.clone(),
                expected: self.transform_fingerprint,
                found: transform.fingerprint(),
            });
        }
        if transform.n_features_out() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected_features: self.n_features(),
                got_features: transform.n_features_out(),
            });
        }
        Ok(())
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<(), ModelError> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected_features: self.n_features(),
                got_features: x.ncols(),
            });
        }
        Ok(())
    }

    /// Positive-class probability per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        self.check_width(x)?;
        Ok(match &self.predictor {
            Predictor::MajorityClass(m) => Array1::from_elem(x.nrows(), m.positive_rate()),
            Predictor::Logistic(m) => m.predict_proba_batch(x),
        })
    }

    /// Predicted label (0.0 or 1.0) per row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        self.check_width(x)?;
        Ok(match &self.predictor {
            Predictor::MajorityClass(m) => m.predict_batch(x),
            Predictor::Logistic(m) => m
                .predict_proba_batch(x)
                .mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }),
        })
    }
}

impl InferenceModel for TrainedModel {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = TrainedModelParams;

    /// Raw score: label for the baseline, logit for logistic models.
    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        match &self.predictor {
            Predictor::MajorityClass(m) => m.predict(input),
            Predictor::Logistic(m) => m.predict(input),
        }
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        match &self.predictor {
            Predictor::MajorityClass(m) => m.predict_batch(input),
            Predictor::Logistic(m) => m.predict_batch(input),
        }
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        TrainedModelParams {
            name: self.name.clone(),
            predictor: match &self.predictor {
                Predictor::MajorityClass(m) => PredictorParams::MajorityClass(m.extract_params()),
                Predictor::Logistic(m) => PredictorParams::Logistic(m.extract_params()),
            },
            feature_names: self.feature_names.clone(),
            transform_fingerprint: self.transform_fingerprint,
        }
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError> {
        let n_features = params.feature_names.len();
        let predictor = match params.predictor {
            PredictorParams::MajorityClass(p) => {
                Predictor::MajorityClass(MajorityClassifier::from_params(p)?)
            }
            PredictorParams::Logistic(p) => {
                if p.weights.len() != n_features {
                    return Err(ModelError::FeatureMismatch {
                        expected_features: n_features,
                        got_features: p.weights.len(),
                    });
                }
                Predictor::Logistic(LogisticRegression::from_params(p)?)
            }
        };
        Ok(Self {
            name: params.name,
            predictor,
            feature_names: params.feature_names,
            transform_fingerprint: params.transform_fingerprint,
        })
    }
}
