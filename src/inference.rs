//! Single-record inference against the persisted artifact set.

use crate::artifact::ArtifactStore;
use crate::config::ProjectLayout;
use crate::data::StudentRecord;
use crate::error::Result;
use crate::model::TrainedModel;
use crate::preprocessing::FittedFeaturePipeline;
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub model: String,
    /// 1 = predicted to pass.
    pub label: u8,
    /// Positive-class probability.
    pub probability: f64,
}

/// A loaded transform and one model trained against it.
#[derive(Clone, Debug)]
pub struct InferenceSession {
    transform: FittedFeaturePipeline,
    model: TrainedModel,
}

impl InferenceSession {
    /// Load the stored transform and the named model from the project's models directory.
    pub fn open(layout: &ProjectLayout, model_name: &str) -> Result<Self> {
        let store = ArtifactStore::for_layout(layout);
        let transform = store.load_transform()?;
        let model = store.load_model(model_name, &transform)?;
        debug!(
            model = model_name,
            features = transform.feature_names().len(),
            "loaded inference artifacts"
        );
        Ok(Self { transform, model })
    }

    pub fn transform(&self) -> &FittedFeaturePipeline {
        &self.transform
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Encode `record` with the stored transform and score it.
    pub fn predict(&self, record: &StudentRecord) -> Result<Prediction> {
        let features = self.transform.transform_record(record)?;
        let probability = self.model.predict_proba(&features.matrix)?[0];
        let label = self.model.predict(&features.matrix)?[0];
        Ok(Prediction {
            model: self.model.name().to_string(),
            label: u8::from(label >= 0.5),
            probability,
        })
    }
}

/// One-shot helper: open a session and score a single record.
pub fn predict_record(layout: &ProjectLayout, model_name: &str, record: &StudentRecord) -> Result<Prediction> {
    InferenceSession::open(layout, model_name)?.predict(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_records, RawFrame};
    use crate::error::PipelineError;
    use crate::model::{train_candidates, TrainingOptions};
    use crate::preprocessing::{FeaturePipeline, Transformer};

    fn persist(layout: &ProjectLayout) {
        layout.ensure().unwrap();
        let frame = RawFrame::from_records(&generate_records(60, Some(11)));
        let (transform, features) = FeaturePipeline::default().fit_transform(&frame).unwrap();
        let options = TrainingOptions {
            epochs: 30,
            ..TrainingOptions::default()
        };
        let models = train_candidates(&features, &transform, &options).unwrap();
        ArtifactStore::for_layout(layout).save(&transform, &models).unwrap();
    }

    #[test]
    fn test_predict_unseen_feedback() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        persist(&layout);

        let record = StudentRecord::new(88.0, 9.0, 75.0, 80.0, "Remarkable dedication shown");
        for name in ["baseline", "logistic", "logistic_l2"] {
            let prediction = predict_record(&layout, name, &record).unwrap();
            assert_eq!(prediction.model, name);
            assert!(prediction.label <= 1);
            assert!((0.0..=1.0).contains(&prediction.probability));
        }
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let record = StudentRecord::new(88.0, 9.0, 75.0, 80.0, "Good");
        assert!(matches!(
            predict_record(&layout, "logistic", &record),
            Err(PipelineError::ArtifactMissing(_))
        ));
    }
}
