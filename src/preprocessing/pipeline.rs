//! The student feature transform.
//!
//! [`FeaturePipeline`] combines a [`StandardScaler`] over the numeric columns
//! with a [`TfidfVectorizer`] over the feedback column. The fitted state
//! records the input schema and the exact output column order; `transform`
//! looks every column up by name, so the layout of the incoming frame does not
//! matter, and any absent or malformed required column is a
//! [`SchemaMismatch`].
//!
//! Output columns are always the scaled numeric columns in schema order
//! followed by the text columns in vocabulary order.

use crate::data::{
    Cell, RawFrame, StudentRecord, ASSIGNMENTS_COMPLETED, ATTENDANCE, FEEDBACK, FINAL_SCORE,
    MIDTERM_SCORE, PASSED,
};
use crate::preprocessing::error::{PreprocessingError, SchemaMismatch};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
use crate::preprocessing::text::{FittedTfidfVectorizer, HandleUnknown, TfidfParams, TfidfVectorizer};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

/// Named input columns the transform consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSchema {
    /// Numeric columns, in output order.
    pub numeric_columns: Vec<String>,
    /// Free-text column.
    pub text_column: String,
    /// Binary target column, required at fit time only.
    pub target_column: String,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            numeric_columns: [ATTENDANCE, ASSIGNMENTS_COMPLETED, MIDTERM_SCORE, FINAL_SCORE]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            text_column: FEEDBACK.to_string(),
            target_column: PASSED.to_string(),
        }
    }
}

/// Encoded feature matrix plus the target, when the input carried one.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSet {
    pub matrix: Array2<f64>,
    pub target: Option<Array1<f64>>,
    pub feature_names: Vec<String>,
    pub target_column: String,
}

impl FeatureSet {
    pub fn n_samples(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.matrix.ncols()
    }

    /// The target vector, or a schema mismatch naming the target column.
    pub fn require_target(&self) -> Result<&Array1<f64>, PreprocessingError> {
        self.target.as_ref().ok_or_else(|| {
            SchemaMismatch::MissingColumn {
                column: self.target_column.clone(),
            }
            .into()
        })
    }
}

/// Feature transform (unfitted).
#[derive(Clone, Debug)]
pub struct FeaturePipeline {
    schema: FeatureSchema,
    max_features: usize,
    handle_unknown: HandleUnknown,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(FeatureSchema::default())
    }
}

impl FeaturePipeline {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            max_features: 20,
            handle_unknown: HandleUnknown::default(),
        }
    }

    /// Cap the text vocabulary size.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the policy for feedback tokens outside the fitted vocabulary.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

/// Serializable parameters for a fitted FeaturePipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipelineParams {
    pub schema: FeatureSchema,
    pub scaler: StandardScalerParams,
    pub vectorizer: TfidfParams,
    /// Output column order.
    pub feature_names: Vec<String>,
    /// CRC32 over everything above.
    pub fingerprint: u32,
}

impl Transformer for FeaturePipeline {
    type Input = RawFrame;
    type Output = FeatureSet;
    type Params = FeaturePipelineParams;
    type Fitted = FittedFeaturePipeline;

    fn fit(&self, frame: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if frame.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit FeaturePipeline on an empty frame".to_string(),
            ));
        }
        // Target must be present and numeric at fit time.
        target_vector(frame, &self.schema.target_column)?.ok_or_else(|| {
            SchemaMismatch::MissingColumn {
                column: self.schema.target_column.clone(),
            }
        })?;

        let numeric = numeric_matrix(frame, &self.schema.numeric_columns)?;
        let documents = text_values(frame, &self.schema.text_column)?;

        let scaler = StandardScaler::new().fit(&numeric)?;
        let vectorizer = TfidfVectorizer::new(self.max_features)
            .with_handle_unknown(self.handle_unknown)
            .fit(&documents)?
            .for_column(&self.schema.text_column);

        FittedFeaturePipeline::assemble(self.schema.clone(), scaler, vectorizer)
    }
}

/// Fitted feature transform. Immutable once built.
#[derive(Clone, Debug)]
pub struct FittedFeaturePipeline {
    schema: FeatureSchema,
    scaler: FittedStandardScaler,
    vectorizer: FittedTfidfVectorizer,
    feature_names: Vec<String>,
    fingerprint: u32,
}

impl FittedFeaturePipeline {
    fn assemble(
        schema: FeatureSchema,
        scaler: FittedStandardScaler,
        vectorizer: FittedTfidfVectorizer,
    ) -> Result<Self, PreprocessingError> {
        let mut feature_names = schema.numeric_columns.clone();
        feature_names.extend(vectorizer.feature_names(&schema.text_column));

        let fingerprint = fingerprint(
            &schema,
            &scaler.extract_params(),
            &vectorizer.extract_params(),
            &feature_names,
        )?;

        Ok(Self {
            schema,
            scaler,
            vectorizer,
            feature_names,
            fingerprint,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Output column names in output order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Identity of this fitted state; models record it to detect mismatched artifacts.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    pub fn vectorizer(&self) -> &FittedTfidfVectorizer {
        &self.vectorizer
    }

    /// Encode a single record through the batch path.
    pub fn transform_record(&self, record: &StudentRecord) -> Result<FeatureSet, PreprocessingError> {
        self.transform(&RawFrame::from_records(std::slice::from_ref(record)))
    }
}

impl FittedTransformer for FittedFeaturePipeline {
    type Input = RawFrame;
    type Output = FeatureSet;
    type Params = FeaturePipelineParams;

    fn transform(&self, frame: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let numeric = numeric_matrix(frame, &self.schema.numeric_columns)?;
        let documents = text_values(frame, &self.schema.text_column)?;
        let target = target_vector(frame, &self.schema.target_column)?;

        let scaled = self.scaler.transform(&numeric)?;
        let encoded = self.vectorizer.transform(&documents)?;

        let split = scaled.ncols();
        let mut matrix = Array2::<f64>::zeros((frame.n_rows(), self.feature_names.len()));
        matrix.slice_mut(s![.., ..split]).assign(&scaled);
        matrix.slice_mut(s![.., split..]).assign(&encoded);

        Ok(FeatureSet {
            matrix,
            target,
            feature_names: self.feature_names.clone(),
            target_column: self.schema.target_column.clone(),
        })
    }

    fn extract_params(&self) -> Self::Params {
        FeaturePipelineParams {
            schema: self.schema.clone(),
            scaler: self.scaler.extract_params(),
            vectorizer: self.vectorizer.extract_params(),
            feature_names: self.feature_names.clone(),
            fingerprint: self.fingerprint,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        let scaler = FittedStandardScaler::from_params(params.scaler)?;
        if scaler.n_features_in() != params.schema.numeric_columns.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.schema.numeric_columns.len(),
                got_features: scaler.n_features_in(),
            });
        }
        let vectorizer = FittedTfidfVectorizer::from_params(params.vectorizer)?
            .for_column(&params.schema.text_column);

        let restored = Self::assemble(params.schema, scaler, vectorizer)?;
        if restored.feature_names != params.feature_names {
            return Err(PreprocessingError::InvalidParameter(
                "stored feature order does not match the fitted parameters".to_string(),
            ));
        }
        if restored.fingerprint != params.fingerprint {
            return Err(PreprocessingError::InvalidParameter(format!(
                "fingerprint mismatch: stored {:08x}, computed {:08x}",
                params.fingerprint, restored.fingerprint
            )));
        }
        Ok(restored)
    }

    fn n_features_in(&self) -> usize {
        self.schema.numeric_columns.len() + 1
    }

    fn n_features_out(&self) -> usize {
        self.feature_names.len()
    }
}

fn fingerprint(
    schema: &FeatureSchema,
    scaler: &StandardScalerParams,
    vectorizer: &TfidfParams,
    feature_names: &[String],
) -> Result<u32, PreprocessingError> {
    let bytes = bincode::serialize(&(schema, scaler, vectorizer, feature_names))?;
    Ok(crc32fast::hash(&bytes))
}

fn required_column(frame: &RawFrame, name: &str) -> Result<usize, SchemaMismatch> {
    frame
        .column_index(name)
        .ok_or_else(|| SchemaMismatch::MissingColumn {
            column: name.to_string(),
        })
}

fn invalid_cell(column: &str, row: usize, reason: impl Into<String>) -> SchemaMismatch {
    SchemaMismatch::InvalidCell {
        column: column.to_string(),
        row,
        reason: reason.into(),
    }
}

fn number_at(cell: &Cell, column: &str, row: usize) -> Result<f64, SchemaMismatch> {
    let value = match cell {
        Cell::Missing => return Err(invalid_cell(column, row, "missing value")),
        other => other.as_number().ok_or_else(|| {
            invalid_cell(column, row, format!("expected a number, found '{}'", other))
        })?,
    };
    if !value.is_finite() {
        return Err(invalid_cell(column, row, format!("non-finite value {}", value)));
    }
    Ok(value)
}

fn numeric_matrix(frame: &RawFrame, columns: &[String]) -> Result<Array2<f64>, SchemaMismatch> {
    let indices = columns
        .iter()
        .map(|name| required_column(frame, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Array2::<f64>::zeros((frame.n_rows(), columns.len()));
    for (row, cells) in frame.rows().iter().enumerate() {
        for (j, (&idx, name)) in indices.iter().zip(columns).enumerate() {
            out[[row, j]] = number_at(&cells[idx], name, row)?;
        }
    }
    Ok(out)
}

fn text_values(frame: &RawFrame, column: &str) -> Result<Vec<String>, SchemaMismatch> {
    let idx = required_column(frame, column)?;
    frame
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells[idx]
                .as_text()
                .map(|t| t.into_owned())
                .ok_or_else(|| invalid_cell(column, row, "missing value"))
        })
        .collect()
}

/// Target values when the column is present; `None` when it is absent.
fn target_vector(frame: &RawFrame, column: &str) -> Result<Option<Array1<f64>>, SchemaMismatch> {
    let Some(idx) = frame.column_index(column) else {
        return Ok(None);
    };
    frame
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| number_at(&cells[idx], column, row))
        .collect::<Result<Vec<_>, _>>()
        .map(|values| Some(Array1::from(values)))
}
