//! The fixed set of candidate models trained by the pipeline.

use crate::dataset::InMemoryDataset;
use crate::loss::BCEWithLogitsLoss;
use crate::model::baseline::MajorityClassifier;
use crate::model::linear::LinearModel;
use crate::model::trained::{Predictor, TrainedModel};
use crate::model::{ModelError, Unfitted};
use crate::optimizer::SGD;
use crate::preprocessing::{FeatureSet, FittedFeaturePipeline};
use crate::regularizers::{NoRegularizer, L2};
use crate::trainer::Trainer;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Hyperparameters for the gradient-trained candidates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// L2 strength for `logistic_l2`.
    pub l2_lambda: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs: 200,
            batch_size: 32,
            learning_rate: 0.1,
            l2_lambda: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateKind {
    Baseline,
    Logistic,
    LogisticL2,
}

impl CandidateKind {
    pub const ALL: [CandidateKind; 3] = [
        CandidateKind::Baseline,
        CandidateKind::Logistic,
        CandidateKind::LogisticL2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CandidateKind::Baseline => "baseline",
            CandidateKind::Logistic => "logistic",
            CandidateKind::LogisticL2 => "logistic_l2",
        }
    }

    fn train(
        self,
        features: &FeatureSet,
        target: &ndarray::Array1<f64>,
        options: &TrainingOptions,
    ) -> Result<Predictor, ModelError> {
        let n_features = features.n_features();
        match self {
            CandidateKind::Baseline => Ok(Predictor::MajorityClass(MajorityClassifier::fit(
                target, n_features,
            )?)),
            CandidateKind::Logistic | CandidateKind::LogisticL2 => {
                let dataset = InMemoryDataset::new(features.matrix.clone(), target.clone())?;
                let model = LinearModel::<Unfitted>::new(n_features);
                let optimizer = SGD::new(options.learning_rate);

                let fitted = if self == CandidateKind::LogisticL2 {
                    Trainer::builder(BCEWithLogitsLoss, optimizer, L2::new(options.l2_lambda))
                        .batch_size(options.batch_size)
                        .max_epochs(options.epochs)
                        .build()
                        .fit(model, &dataset)?
                } else {
                    Trainer::builder(BCEWithLogitsLoss, optimizer, NoRegularizer)
                        .batch_size(options.batch_size)
                        .max_epochs(options.epochs)
                        .build()
                        .fit(model, &dataset)?
                };
                Ok(Predictor::Logistic(fitted))
            }
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Train every candidate on `features` and bind each to `transform`.
pub fn train_candidates(
    features: &FeatureSet,
    transform: &FittedFeaturePipeline,
    options: &TrainingOptions,
) -> Result<Vec<TrainedModel>, ModelError> {
    let target = features
        .target
        .as_ref()
        .ok_or_else(|| ModelError::EmptyData(format!("no '{}' column", features.target_column)))?;
    if features.n_features() != transform.feature_names().len() {
        return Err(ModelError::FeatureMismatch {
            expected_features: transform.feature_names().len(),
            got_features: features.n_features(),
        });
    }

    CandidateKind::ALL
        .iter()
        .map(|&kind| {
            let predictor = kind.train(features, target, options)?;
            info!(model = kind.name(), samples = features.n_samples(), "trained candidate");
            Ok(TrainedModel::new(kind.name(), predictor, transform))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_records, RawFrame};
    use crate::preprocessing::{FeaturePipeline, Transformer};

    #[test]
    fn test_all_candidates_trained_and_bound() {
        let frame = RawFrame::from_records(&generate_records(80, Some(4)));
        let (transform, features) = FeaturePipeline::default().fit_transform(&frame).unwrap();
        let options = TrainingOptions {
            epochs: 50,
            ..TrainingOptions::default()
        };

        let models = train_candidates(&features, &transform, &options).unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["baseline", "logistic", "logistic_l2"]);

        for model in &models {
            assert!(model.check_compatible(&transform).is_ok());
            let labels = model.predict(&features.matrix).unwrap();
            assert_eq!(labels.len(), features.n_samples());
        }
    }

    #[test]
    fn test_logistic_beats_chance_on_training_data() {
        let frame = RawFrame::from_records(&generate_records(200, Some(8)));
        let (transform, features) = FeaturePipeline::default().fit_transform(&frame).unwrap();
        let models = train_candidates(&features, &transform, &TrainingOptions::default()).unwrap();

        let target = features.target.as_ref().unwrap();
        let logistic = models.iter().find(|m| m.name() == "logistic").unwrap();
        let labels = logistic.predict(&features.matrix).unwrap();
        let correct = labels
            .iter()
            .zip(target.iter())
            .filter(|(p, y)| p == y)
            .count();
        assert!(correct as f64 / target.len() as f64 > 0.7);
    }

    #[test]
    fn test_missing_target_rejected() {
        let frame = RawFrame::from_records(&generate_records(10, Some(4)));
        let (transform, mut features) = FeaturePipeline::default().fit_transform(&frame).unwrap();
        features.target = None;
        assert!(train_candidates(&features, &transform, &TrainingOptions::default()).is_err());
    }
}
