//! Majority-class baseline.

use crate::model::{InferenceModel, ModelError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MajorityClassParams {
    /// Predicted label (0 or 1).
    pub class: u8,
    /// Positive-class rate seen during fit.
    pub positive_rate: f64,
    pub n_features: usize,
}

/// Always predicts the most frequent training label; ties go to class 0.
#[derive(Clone, Debug, PartialEq)]
pub struct MajorityClassifier {
    params: MajorityClassParams,
}

impl MajorityClassifier {
    pub fn fit(target: &Array1<f64>, n_features: usize) -> Result<Self, ModelError> {
        if target.is_empty() {
            return Err(ModelError::EmptyData(
                "Cannot fit a baseline on an empty target".to_string(),
            ));
        }
        let positives = target.iter().filter(|&&y| y >= 0.5).count();
        let positive_rate = positives as f64 / target.len() as f64;

        Ok(Self {
            params: MajorityClassParams {
                class: u8::from(positives * 2 > target.len()),
                positive_rate,
                n_features,
            },
        })
    }

    pub fn class(&self) -> u8 {
        self.params.class
    }

    pub fn positive_rate(&self) -> f64 {
        self.params.positive_rate
    }

    pub fn n_features(&self) -> usize {
        self.params.n_features
    }
}

impl InferenceModel for MajorityClassifier {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = MajorityClassParams;

    fn predict(&self, _input: &Self::InputSingle) -> Self::OutputSingle {
        f64::from(self.params.class)
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        Array1::from_elem(input.nrows(), f64::from(self.params.class))
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        self.params.clone()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError> {
        if params.class > 1 || !(0.0..=1.0).contains(&params.positive_rate) {
            return Err(ModelError::InvalidParameter(format!(
                "invalid baseline parameters: class {}, positive rate {}",
                params.class, params.positive_rate
            )));
        }
        Ok(Self { params })
    }
}
