use crate::model::linear::{LinearModel, LinearParams};
use crate::model::{TrainableModel, Unfitted};

/// Penalty added to the training loss, with its gradient w.r.t. the params.
pub trait Regularizer<M: TrainableModel> {
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, M::Gradients);
}

/// Ridge penalty `λ·‖w‖²`; the bias is not penalized.
#[derive(Clone, Debug)]
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Regularizer<LinearModel<Unfitted>> for L2 {
    fn regularizer_penalty_grad(&self, model: &LinearModel<Unfitted>) -> (f64, LinearParams) {
        let weights = &model.params().weights;
        let penalty = self.lambda * weights.dot(weights);
        let grad = LinearParams {
            weights: weights * (2.0 * self.lambda),
            bias: 0.0,
        };
        (penalty, grad)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegularizer;

impl Regularizer<LinearModel<Unfitted>> for NoRegularizer {
    fn regularizer_penalty_grad(&self, model: &LinearModel<Unfitted>) -> (f64, LinearParams) {
        (0.0, LinearParams::zeros(model.params().weights.len()))
    }
}
