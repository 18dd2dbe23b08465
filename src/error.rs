//! Crate-level error taxonomy.

use crate::data::DataError;
use crate::model::ModelError;
use crate::orchestrator::Stage;
use crate::preprocessing::{PreprocessingError, SchemaMismatch};
use std::io;
use thiserror::Error;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Why a stage implementation failed after it was resolved.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error("{0}")]
    Error(Box<PipelineError>),
    #[error("process exited with status {0}")]
    ExitCode(i32),
    #[error("process terminated by signal {0}")]
    Signal(i32),
    #[error("process terminated without an exit status")]
    Terminated,
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A candidate implementation is not available; resolution moves on.
    #[error("no implementation '{candidate}' for stage '{stage}'")]
    ImplementationNotFound { stage: Stage, candidate: String },

    #[error("stage '{stage}' failed: {cause}")]
    StageExecution { stage: Stage, cause: FailureCause },

    /// No candidate resolved for a stage whose policy is to fail.
    #[error("stage '{stage}' has no available implementation")]
    Unresolved { stage: Stage },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(SchemaMismatch),

    #[error("artifact missing: {0}")]
    ArtifactMissing(String),

    #[error("artifact mismatch: {0}")]
    ArtifactMismatch(String),

    #[error(transparent)]
    Preprocessing(PreprocessingError),

    #[error(transparent)]
    Model(ModelError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PipelineError {
    /// Wrap an error raised inside a stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ PipelineError::StageExecution { .. } => already,
            other => PipelineError::StageExecution {
                stage,
                cause: FailureCause::Error(Box::new(other)),
            },
        }
    }

    /// The underlying error once stage attribution is peeled off.
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::StageExecution {
                cause: FailureCause::Error(inner),
                ..
            } => inner.root(),
            other => other,
        }
    }
}

impl From<PreprocessingError> for PipelineError {
    fn from(err: PreprocessingError) -> Self {
        match err {
            PreprocessingError::SchemaMismatch(m) => PipelineError::SchemaMismatch(m),
            PreprocessingError::IoError(e) => PipelineError::Io(e),
            other => PipelineError::Preprocessing(other),
        }
    }
}

impl From<SchemaMismatch> for PipelineError {
    fn from(err: SchemaMismatch) -> Self {
        PipelineError::SchemaMismatch(err)
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        match err {
            e @ ModelError::TransformMismatch { .. } => PipelineError::ArtifactMismatch(e.to_string()),
            ModelError::Io(e) => PipelineError::Io(e),
            other => PipelineError::Model(other),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}
