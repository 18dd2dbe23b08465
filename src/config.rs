//! Pipeline settings and the on-disk project layout.
//!
//! Settings come from an optional `pipeline.toml` at the project root (or an
//! explicit path). Every field has a default, so an absent file or a partial
//! file is fine.

use crate::error::{PipelineError, Result};
use crate::model::TrainingOptions;
use crate::preprocessing::{FeaturePipeline, FeatureSchema, FittedFeaturePipeline, HandleUnknown};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "pipeline.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub rows: usize,
    /// Fixed seed for reproducible data; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    #[serde(flatten)]
    pub schema: FeatureSchema,
    pub max_features: usize,
    pub handle_unknown: HandleUnknown,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            schema: FeatureSchema::default(),
            max_features: 20,
            handle_unknown: HandleUnknown::default(),
        }
    }
}

impl FeaturesConfig {
    /// Unfitted feature transform described by these settings.
    pub fn pipeline(&self) -> FeaturePipeline {
        FeaturePipeline::new(self.schema.clone())
            .with_max_features(self.max_features)
            .with_handle_unknown(self.handle_unknown)
    }

    /// Whether `fitted` could have come from these settings: same schema, same
    /// unknown-token policy, and a vocabulary within the cap.
    pub fn is_compatible(&self, fitted: &FittedFeaturePipeline) -> bool {
        let vectorizer = fitted.vectorizer();
        fitted.schema() == &self.schema
            && vectorizer.handle_unknown() == self.handle_unknown
            && vectorizer.vocabulary().len() <= self.max_features
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Directories searched for external stage scripts, relative to the root.
    pub search_paths: Vec<PathBuf>,
    /// Interpreter for `.py` scripts.
    pub python: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![PathBuf::from("scripts")],
            python: "python3".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub generate: GenerateConfig,
    pub split: SplitConfig,
    pub features: FeaturesConfig,
    pub train: TrainingOptions,
    pub scripts: ScriptsConfig,
}

impl PipelineConfig {
    /// Load and validate settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// `<root>/pipeline.toml` when present, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(PipelineError::Config(msg.to_string()));
        if self.generate.rows == 0 {
            return fail("generate.rows must be at least 1");
        }
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            return fail("split.test_fraction must be between 0 and 1");
        }
        if self.features.max_features == 0 {
            return fail("features.max_features must be at least 1");
        }
        if self.train.epochs == 0 || self.train.batch_size == 0 {
            return fail("train.epochs and train.batch_size must be at least 1");
        }
        if !(self.train.learning_rate.is_finite() && self.train.learning_rate > 0.0) {
            return fail("train.learning_rate must be a positive number");
        }
        if !(self.train.l2_lambda.is_finite() && self.train.l2_lambda >= 0.0) {
            return fail("train.l2_lambda must be non-negative");
        }
        Ok(())
    }
}

/// Paths of everything the pipeline reads and writes, relative to one root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// A relative `root` is resolved against the current directory here, so
    /// paths stay valid for child processes started inside the root.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports").join("figures")
    }

    pub fn raw_data(&self) -> PathBuf {
        self.raw_dir().join("student_data.csv")
    }

    pub fn train_data(&self) -> PathBuf {
        self.processed_dir().join("train.csv")
    }

    pub fn test_data(&self) -> PathBuf {
        self.processed_dir().join("test.csv")
    }

    /// Transform fitted by the `features` stage, picked up by `train`.
    pub fn staged_transform(&self) -> PathBuf {
        self.processed_dir().join("feature_transform.bin")
    }

    pub fn train_features(&self) -> PathBuf {
        self.processed_dir().join("train_features.csv")
    }

    pub fn manifest(&self) -> PathBuf {
        self.models_dir().join("artifacts_manifest.txt")
    }

    pub fn evaluation_report(&self) -> PathBuf {
        self.reports_dir().join("evaluation.json")
    }

    pub fn evaluation_summary(&self) -> PathBuf {
        self.reports_dir().join("evaluation_summary.txt")
    }

    /// Create the data, model and report directories if missing.
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            self.raw_dir(),
            self.processed_dir(),
            self.models_dir(),
            self.reports_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
