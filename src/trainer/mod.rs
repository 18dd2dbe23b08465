use crate::{
    dataset::Dataset,
    loss::Loss,
    model::{ModelError, ParamOps, TrainableModel},
    optimizer::Optimizer,
    regularizers::Regularizer,
};
use ndarray::{Array1, Array2};
use std::marker::PhantomData;
use tracing::{debug, debug_span};

/// Mini-batch gradient-descent training loop. Immutable once built.
pub struct Trainer<L, O, M, P, R> {
    pub(crate) batch_size: usize,
    pub(crate) max_epochs: usize,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    pub(crate) regularizer: R,
    _phantom: PhantomData<(M, P)>,
}

pub struct TrainerBuilder<L, O, M, P, R> {
    batch_size: usize,
    max_epochs: usize,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
    _phantom: PhantomData<(M, P)>,
}

impl<L, O, M, P, R> TrainerBuilder<L, O, M, P, R> {
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            batch_size: 32,
            max_epochs: 1000,
            loss_fn,
            optimizer,
            regularizer,
            _phantom: PhantomData,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn build(self) -> Trainer<L, O, M, P, R> {
        Trainer {
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            regularizer: self.regularizer,
            _phantom: PhantomData,
        }
    }
}

impl<L, O, M, P, R> Trainer<L, O, M, P, R> {
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<L, O, M, P, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }
}

impl<L, O, M, P, R> Trainer<L, O, M, P, R>
where
    L: Loss<Target = Array1<f64>, Prediction = Array1<f64>>,
    M: TrainableModel<Input = Array2<f64>, Prediction = Array1<f64>, Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
    P: ParamOps,
{
    pub fn fit<D>(&self, mut model: M, dataset: &D) -> Result<M::Output, ModelError>
    where
        D: Dataset,
    {
        if self.batch_size == 0 {
            return Err(ModelError::InvalidParameter(
                "batch_size must be at least 1".to_string(),
            ));
        }
        let n_total = dataset
            .len()
            .ok_or_else(|| ModelError::EmptyData("Dataset length unknown".to_string()))?;
        if n_total == 0 {
            return Err(ModelError::EmptyData("Dataset is empty".to_string()));
        }

        let _span = debug_span!("fit", samples = n_total, epochs = self.max_epochs).entered();
        for epoch in 0..self.max_epochs {
            let mut total_loss = 0.0;
            for batch_result in dataset.batches(self.batch_size) {
                let (batch_x, batch_y) = batch_result
                    .map_err(|e| ModelError::InvalidParameter(format!("Data error: {:?}", e)))?;

                let preds = model.forward(&batch_x);
                let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
                total_loss +=
                    (self.loss_fn.loss(&preds, &batch_y) + reg_penalty) * batch_y.len() as f64;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds);

                let total_grads = grads.add(&reg_grad);
                let new_params = self.optimizer.step(model.params(), &total_grads);
                model.update_params(&new_params);
            }

            let avg_loss = total_loss / n_total as f64;
            if !avg_loss.is_finite() {
                return Err(ModelError::Diverged(format!(
                    "loss became {} at epoch {}",
                    avg_loss, epoch
                )));
            }
            debug!(epoch, loss = avg_loss, "epoch finished");
        }

        Ok(model.into_fitted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataset;
    use crate::loss::BCEWithLogitsLoss;
    use crate::model::{sigmoid, LinearModel, Unfitted};
    use crate::optimizer::SGD;
    use crate::regularizers::{NoRegularizer, L2};
    use ndarray::array;

    fn separable() -> InMemoryDataset {
        let x = array![[-2.0], [-1.0], [-0.5], [0.5], [1.0], [2.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        InMemoryDataset::new(x, y).unwrap()
    }

    #[test]
    fn test_logistic_fit_separates_classes() {
        let trainer = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.5), NoRegularizer)
            .batch_size(2)
            .max_epochs(200)
            .build();
        let fitted = trainer
            .fit(LinearModel::<Unfitted>::new(1), &separable())
            .unwrap();

        let w = fitted.params().weights[0];
        assert!(w > 0.0);
        assert!(sigmoid(w * 2.0 + fitted.params().bias) > 0.9);
        assert!(sigmoid(-w * 2.0 + fitted.params().bias) < 0.1);
    }

    #[test]
    fn test_l2_shrinks_weights() {
        let fit = |lambda: f64| {
            Trainer::builder(BCEWithLogitsLoss, SGD::new(0.5), L2::new(lambda))
                .batch_size(6)
                .max_epochs(300)
                .build()
                .fit(LinearModel::<Unfitted>::new(1), &separable())
                .unwrap()
                .params()
                .weights[0]
        };
        assert!(fit(0.1).abs() < fit(0.0).abs());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let trainer = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.1), NoRegularizer)
            .batch_size(0)
            .build();
        let result = trainer.fit(LinearModel::<Unfitted>::new(1), &separable());
        assert!(matches!(result, Err(ModelError::InvalidParameter(_))));
    }

    #[test]
    fn test_divergence_reported() {
        let x = array![[1e300], [-1e300]];
        let y = array![1.0, 0.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();
        let trainer = Trainer::builder(BCEWithLogitsLoss, SGD::new(1e10), NoRegularizer)
            .max_epochs(5)
            .build();
        let result = trainer.fit(LinearModel::<Unfitted>::new(1), &dataset);
        assert!(matches!(result, Err(ModelError::Diverged(_))));
    }
}
