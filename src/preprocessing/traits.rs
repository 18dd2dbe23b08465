//! Fit/transform contract shared by every preprocessing step.
//!
//! - [`Transformer`]: holds hyperparameters only; `fit` learns from training data.
//! - [`FittedTransformer`]: holds learned state only; read-only from then on.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::{write_atomic, SerializableParams};
use std::path::Path;

/// An unfitted preprocessing step.
///
/// Every call to [`Transformer::fit`] returns a fresh, independent fitted value;
/// nothing is learned in place, so one configured step can be fit on several
/// datasets.
///
/// # Example
/// ```ignore
/// use student_tracker::preprocessing::{StandardScaler, Transformer};
///
/// let fitted = StandardScaler::new().fit(&train)?;
/// let scaled = fitted.transform(&test)?;
/// ```
pub trait Transformer: Clone {
    type Input: ?Sized;
    type Output;
    /// Plain-data form of the learned state.
    type Params: SerializableParams;
    type Fitted: FittedTransformer<
        Params = Self::Params,
        Input = Self::Input,
        Output = Self::Output,
    >;

    /// Learn parameters from `data`.
    ///
    /// # Errors
    /// - `EmptyData` when there is nothing to learn from
    /// - `NumericalError` on NaN or infinite inputs
    /// - `SchemaMismatch` when a required column is absent or malformed
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit on `data`, then transform that same `data` with the result.
    ///
    /// The output always equals `fitted.transform(data)`.
    fn fit_transform(
        &self,
        data: &Self::Input,
    ) -> Result<(Self::Fitted, Self::Output), PreprocessingError> {
        let fitted = self.fit(data)?;
        let output = fitted.transform(data)?;
        Ok((fitted, output))
    }
}

/// Learned preprocessing state.
///
/// `transform` never changes the state, and `from_params(extract_params())`
/// reproduces it exactly.
pub trait FittedTransformer: Clone {
    type Input: ?Sized;
    type Output;
    type Params: SerializableParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    fn extract_params(&self) -> Self::Params;

    /// Rebuild from stored parameters, validating them.
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Persist the learned state as bincode, replacing `path` atomically.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PreprocessingError> {
        let bytes = self
            .extract_params()
            .to_bytes()
            .map_err(|e| PreprocessingError::SerializationError(e.to_string()))?;
        write_atomic(path, &bytes)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError>
    where
        Self: Sized,
    {
        let raw = std::fs::read(path)?;
        let params = Self::Params::from_bytes(&raw)
            .map_err(|e| PreprocessingError::SerializationError(e.to_string()))?;
        Self::from_params(params)
    }

    /// Width of the input seen during fit.
    fn n_features_in(&self) -> usize;

    /// Width of the output of `transform`.
    fn n_features_out(&self) -> usize {
        self.n_features_in()
    }
}
