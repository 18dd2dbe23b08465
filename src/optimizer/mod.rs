use crate::model::linear::LinearParams;
use crate::model::ParamOps;

/// Trait for gradient-based optimizers.
///
/// Optimizers update model parameters from computed gradients. Training logic
/// ([`Trainer`](crate::trainer::Trainer)) is kept apart from the update rule,
/// so any model can be paired with any optimizer.
///
/// # Example
/// ```
/// use ndarray::array;
/// use student_tracker::model::LinearParams;
/// use student_tracker::optimizer::{Optimizer, SGD};
///
/// let params = LinearParams { weights: array![1.0, 2.0], bias: 1.0 };
/// let grads = LinearParams { weights: array![0.5, -1.0], bias: 1.0 };
/// let updated = SGD::new(0.5).step(&params, &grads);
/// assert_eq!(updated.weights, array![0.75, 2.5]);
/// assert_eq!(updated.bias, 0.5);
/// ```
pub trait Optimizer<P> {
    /// Performs an optimization step using the update rule:
    /// ```text
    /// params_new = params - learning_rate * gradients
    /// ```
    /// Inputs are not mutated; the updated parameters are returned.
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// ```text
/// θ ← θ - η · ∇L(θ)
/// ```
/// Stateless: no momentum, no adaptive learning rate.
#[derive(Clone, Debug)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }

    /// Returns the current learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.lr
    }
}

impl Optimizer<LinearParams> for SGD {
    fn step(&self, params: &LinearParams, grads: &LinearParams) -> LinearParams {
        params.add(&grads.scale(-self.lr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sgd_step() {
        let params = LinearParams {
            weights: array![1.0, 2.0, 3.0],
            bias: 0.5,
        };
        let grads = LinearParams {
            weights: array![0.1, -0.2, 0.0],
            bias: -1.0,
        };
        let updated = SGD::new(0.5).step(&params, &grads);
        assert_eq!(updated.weights, array![0.95, 2.1, 3.0]);
        assert_eq!(updated.bias, 1.0);
    }
}
