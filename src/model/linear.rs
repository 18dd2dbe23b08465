//! Linear model over dense feature rows.
//!
//! The unfitted form produces raw logits `X·w + b` for training; the fitted
//! form is a logistic-regression scorer whose [`InferenceModel`] methods also
//! return logits. Use [`sigmoid`] to turn them into probabilities.

use crate::model::{Fitted, InferenceModel, ModelError, ParamOps, TrainableModel, Unfitted};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Logistic function, stable for large |z|.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

impl LinearParams {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        }
    }
}

impl ParamOps for LinearParams {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: &self.weights + &other.weights,
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, scalar: f64) -> Self {
        Self {
            weights: &self.weights * scalar,
            bias: self.bias * scalar,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LinearModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

/// Trained logistic-regression scorer.
pub type LogisticRegression = LinearModel<Fitted>;

impl LinearModel<Unfitted> {
    /// Zero-initialized model for `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams::zeros(n_features))
    }

    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

impl LinearModel<Fitted> {
    /// Create a fitted linear model from params.
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn n_features(&self) -> usize {
        self.params.weights.len()
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    /// Positive-class probability per row.
    pub fn predict_proba_batch(&self, input: &Array2<f64>) -> Array1<f64> {
        self.predict_batch(input).mapv(sigmoid)
    }
}

impl InferenceModel for LinearModel<Fitted> {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = LinearParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        self.params.weights.dot(input) + self.params.bias
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        input.dot(&self.params.weights) + self.params.bias
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        self.params.clone()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError> {
        if !params.bias.is_finite() || params.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::InvalidParameter(
                "linear parameters contain non-finite values".to_string(),
            ));
        }
        Ok(Self::new(params))
    }
}

impl TrainableModel for LinearModel<Unfitted> {
    type Input = Array2<f64>;
    type Prediction = Array1<f64>;
    type Params = LinearParams;
    type Gradients = LinearParams;
    type Output = LinearModel<Fitted>;

    fn forward(&self, x: &Self::Input) -> Self::Prediction {
        x.dot(&self.params.weights) + self.params.bias
    }

    fn backward(&self, x: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients {
        LinearParams {
            weights: x.t().dot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn into_fitted(self) -> LinearModel<Fitted> {
        LinearModel::<Fitted>::new(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(800.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn test_forward_and_backward() {
        let model = LinearModel::<Unfitted>::from_params(LinearParams {
            weights: array![1.0, -1.0],
            bias: 0.5,
        });
        let x = array![[1.0, 2.0], [3.0, 1.0]];
        assert_eq!(model.forward(&x), array![-0.5, 2.5]);

        let grads = model.backward(&x, &array![1.0, 1.0]);
        assert_eq!(grads.weights, array![4.0, 3.0]);
        assert_eq!(grads.bias, 2.0);
    }

    #[test]
    fn test_param_ops() {
        let p = LinearParams {
            weights: array![1.0, 2.0],
            bias: 1.0,
        };
        let q = p.add(&p.scale(-0.5));
        assert_eq!(q.weights, array![0.5, 1.0]);
        assert_eq!(q.bias, 0.5);
    }

    #[test]
    fn test_linear_model_save_load() -> Result<(), Box<dyn std::error::Error>> {
        let model = LogisticRegression::new(LinearParams {
            weights: array![1.0, 2.0, 3.0],
            bias: 0.5,
        });

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("model.bin");
        model.save_to_file(&path)?;
        let loaded = LogisticRegression::load_from_file(&path)?;

        assert_eq!(model.extract_params(), loaded.extract_params());
        let x = array![0.1, 0.2, 0.3];
        assert_eq!(model.predict(&x), loaded.predict(&x));
        Ok(())
    }

    #[test]
    fn test_non_finite_params_rejected() {
        let params = LinearParams {
            weights: array![f64::NAN],
            bias: 0.0,
        };
        assert!(LogisticRegression::from_params(params).is_err());
    }
}
