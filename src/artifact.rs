//! Persisted artifact set: one fitted feature transform plus the models
//! trained against it.
//!
//! Layout under the models directory:
//! - `feature_transform.bin`
//! - `<model name>.model.bin`, one per candidate
//!
//! Each model records the fingerprint of the transform it was trained on, and
//! loading a model against any other transform fails.

use crate::config::ProjectLayout;
use crate::error::{PipelineError, Result};
use crate::model::{InferenceModel, TrainedModel};
use crate::preprocessing::{FittedFeaturePipeline, FittedTransformer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TRANSFORM_FILE: &str = "feature_transform.bin";
pub const MODEL_SUFFIX: &str = ".model.bin";

#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_layout(layout: &ProjectLayout) -> Self {
        Self::new(layout.models_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn transform_path(&self) -> PathBuf {
        self.dir.join(TRANSFORM_FILE)
    }

    pub fn model_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, MODEL_SUFFIX))
    }

    /// True when a transform has been persisted.
    pub fn has_artifacts(&self) -> bool {
        self.transform_path().is_file()
    }

    /// Persist `transform` and `models` as one set, replacing the previous set.
    ///
    /// Every model must be bound to `transform`. Model files from an earlier
    /// run that are not part of this set are removed.
    pub fn save(&self, transform: &FittedFeaturePipeline, models: &[TrainedModel]) -> Result<Vec<PathBuf>> {
        for model in models {
            check_name(model.name())?;
            model.check_compatible(transform)?;
        }
        fs::create_dir_all(&self.dir)?;

        let keep: Vec<String> = models.iter().map(|m| m.name().to_string()).collect();
        for stale in self.list_models()?.into_iter().filter(|n| !keep.contains(n)) {
            debug!(model = %stale, "removing stale model artifact");
            fs::remove_file(self.model_path(&stale))?;
        }

        let mut written = Vec::with_capacity(models.len() + 1);
        let transform_path = self.transform_path();
        transform.save_to_file(&transform_path)?;
        written.push(transform_path);

        for model in models {
            let path = self.model_path(model.name());
            model.save_to_file(&path)?;
            written.push(path);
        }

        info!(
            dir = %self.dir.display(),
            models = models.len(),
            fingerprint = %format!("{:08x}", transform.fingerprint()),
            "saved artifacts"
        );
        Ok(written)
    }

    pub fn load_transform(&self) -> Result<FittedFeaturePipeline> {
        let path = self.transform_path();
        if !path.is_file() {
            return Err(PipelineError::ArtifactMissing(format!(
                "no fitted feature transform at {}; run the train stage first",
                path.display()
            )));
        }
        Ok(FittedFeaturePipeline::load_from_file(&path)?)
    }

    /// Load one model and verify it belongs to `transform`.
    pub fn load_model(&self, name: &str, transform: &FittedFeaturePipeline) -> Result<TrainedModel> {
        check_name(name)?;
        let path = self.model_path(name);
        if !path.is_file() {
            return Err(PipelineError::ArtifactMissing(format!(
                "no model '{}' at {}",
                name,
                path.display()
            )));
        }
        let model = TrainedModel::load_from_file(&path)?;
        model.check_compatible(transform)?;
        Ok(model)
    }

    /// The transform and every model stored with it, models in name order.
    pub fn load_all(&self) -> Result<(FittedFeaturePipeline, Vec<TrainedModel>)> {
        let transform = self.load_transform()?;
        let models = self
            .list_models()?
            .iter()
            .map(|name| self.load_model(name, &transform))
            .collect::<Result<Vec<_>>>()?;
        Ok((transform, models))
    }

    /// Names of the stored models, sorted.
    pub fn list_models(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|f| f.strip_suffix(MODEL_SUFFIX))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn check_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput(format!("invalid model name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_records, RawFrame};
    use crate::model::{train_candidates, TrainingOptions};
    use crate::preprocessing::{FeaturePipeline, Transformer};

    fn trained(seed: u64) -> (FittedFeaturePipeline, Vec<TrainedModel>) {
        let frame = RawFrame::from_records(&generate_records(40, Some(seed)));
        let (transform, features) = FeaturePipeline::default().fit_transform(&frame).unwrap();
        let options = TrainingOptions {
            epochs: 20,
            ..TrainingOptions::default()
        };
        let models = train_candidates(&features, &transform, &options).unwrap();
        (transform, models)
    }

    #[test]
    fn test_save_and_load_all() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));
        let (transform, models) = trained(1);

        let written = store.save(&transform, &models).unwrap();
        assert_eq!(written.len(), 4);
        assert_eq!(store.list_models().unwrap(), vec!["baseline", "logistic", "logistic_l2"]);

        let (loaded, loaded_models) = store.load_all().unwrap();
        assert_eq!(loaded.fingerprint(), transform.fingerprint());
        assert_eq!(loaded.feature_names(), transform.feature_names());
        assert_eq!(loaded_models.len(), 3);
    }

    #[test]
    fn test_missing_artifacts_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.has_artifacts());
        assert!(matches!(store.load_transform(), Err(PipelineError::ArtifactMissing(_))));

        let (transform, _) = trained(2);
        assert!(matches!(
            store.load_model("logistic", &transform),
            Err(PipelineError::ArtifactMissing(_))
        ));
    }

    #[test]
    fn test_model_rejected_against_other_transform() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (transform, models) = trained(3);
        store.save(&transform, &models).unwrap();

        let (other, _) = trained(4);
        assert!(matches!(
            store.load_model("logistic", &other),
            Err(PipelineError::ArtifactMismatch(_))
        ));
    }

    #[test]
    fn test_stale_models_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.model_path("old_model"), b"stale").unwrap();

        let (transform, models) = trained(5);
        store.save(&transform, &models).unwrap();
        assert!(!store.model_path("old_model").exists());
    }

    #[test]
    fn test_invalid_model_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (transform, _) = trained(6);
        assert!(matches!(
            store.load_model("../escape", &transform),
            Err(PipelineError::InvalidInput(_))
        ));
    }
}
