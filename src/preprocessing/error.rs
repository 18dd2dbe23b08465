//! Error types for preprocessing operations.

use thiserror::Error;

/// Input whose columns, cells, or categories do not match what a fitted
/// transform expects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaMismatch {
    /// A column that was present at fit time is absent from the input.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },
    /// A required cell is empty or has the wrong type.
    #[error("column '{column}', row {row}: {reason}")]
    InvalidCell {
        column: String,
        row: usize,
        reason: String,
    },
    /// A token never seen during fit, under the `Error` unknown-token policy.
    #[error("unknown category '{token}' in column '{column}', row {row}")]
    UnknownCategory {
        column: String,
        row: usize,
        token: String,
    },
}

impl SchemaMismatch {
    /// Name of the column the mismatch was detected in.
    pub fn column(&self) -> &str {
        match self {
            SchemaMismatch::MissingColumn { column }
            | SchemaMismatch::InvalidCell { column, .. }
            | SchemaMismatch::UnknownCategory { column, .. } => column,
        }
    }
}

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Input does not match the fitted schema.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),
    /// Numerical computation error (non-finite input, overflow).
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Invalid hyperparameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}
