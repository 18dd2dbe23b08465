//! TF-IDF vectorization of a free-text column.
//!
//! The vectorizer learns a fixed-size vocabulary and smoothed inverse document
//! frequencies from the training documents:
//! ```text
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1
//! ```
//! Each document becomes `count(t) * idf(t)` per vocabulary term, L2-normalized
//! across the row. Tokens are lowercase alphanumeric runs of two or more
//! characters.
//!
//! Tokens outside the vocabulary are handled by [`HandleUnknown`]: counted in a
//! trailing bucket column (default), dropped, or rejected.

use crate::preprocessing::error::{PreprocessingError, SchemaMismatch};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Strategy for handling tokens that were not in the fitted vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Reject the document with [`SchemaMismatch::UnknownCategory`].
    Error,
    /// Drop unknown tokens.
    Ignore,
    /// Count unknown tokens in a dedicated trailing column.
    #[default]
    Bucket,
}

/// Split a document into lowercase alphanumeric tokens of length >= 2.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
}

/// TF-IDF vectorizer (unfitted).
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    max_features: usize,
    handle_unknown: HandleUnknown,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(20)
    }
}

impl TfidfVectorizer {
    /// Create a vectorizer keeping at most `max_features` vocabulary terms.
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            handle_unknown: HandleUnknown::default(),
        }
    }

    /// Set the strategy for handling unknown tokens.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Serializable parameters for a fitted TfidfVectorizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Vocabulary terms in output column order (alphabetical).
    pub vocabulary: Vec<String>,
    /// Inverse document frequency per vocabulary term.
    pub idf: Vec<f64>,
    /// Weight applied to the unknown-token bucket.
    pub unknown_idf: f64,
    /// Number of documents seen during fit.
    pub n_documents: usize,
    /// Unknown-token policy.
    pub handle_unknown: HandleUnknown,
}

impl Transformer for TfidfVectorizer {
    type Input = [String];
    type Output = Array2<f64>;
    type Params = TfidfParams;
    type Fitted = FittedTfidfVectorizer;

    fn fit(&self, documents: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if documents.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit TfidfVectorizer on empty data".to_string(),
            ));
        }
        if self.max_features == 0 {
            return Err(PreprocessingError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let mut seen: Vec<String> = tokenize(doc).collect();
            seen.sort();
            seen.dedup();
            for token in seen {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        // Highest document frequency first; BTreeMap order breaks ties alphabetically.
        let mut ranked: Vec<(String, usize)> = document_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n = documents.len() as f64;
        let smoothed_idf = |df: usize| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;

        let idf = ranked.iter().map(|(_, df)| smoothed_idf(*df)).collect();
        let vocabulary = ranked.into_iter().map(|(term, _)| term).collect();

        Ok(FittedTfidfVectorizer::from_parts(TfidfParams {
            vocabulary,
            idf,
            unknown_idf: smoothed_idf(0),
            n_documents: documents.len(),
            handle_unknown: self.handle_unknown,
        }))
    }
}

/// Fitted TfidfVectorizer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedTfidfVectorizer {
    params: TfidfParams,
    index: HashMap<String, usize>,
    column: String,
}

impl FittedTfidfVectorizer {
    fn from_parts(params: TfidfParams) -> Self {
        let index = params
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Self {
            params,
            index,
            column: "text".to_string(),
        }
    }

    /// Name the source column, used in schema-mismatch diagnostics.
    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Learned vocabulary in output column order.
    pub fn vocabulary(&self) -> &[String] {
        &self.params.vocabulary
    }

    /// Learned inverse document frequencies, aligned with [`Self::vocabulary`].
    pub fn idf(&self) -> &[f64] {
        &self.params.idf
    }

    /// Unknown-token policy.
    pub fn handle_unknown(&self) -> HandleUnknown {
        self.params.handle_unknown
    }

    /// Whether a trailing unknown-token column is produced.
    pub fn has_bucket(&self) -> bool {
        self.params.handle_unknown == HandleUnknown::Bucket
    }

    /// Output column names, prefixed with `prefix__`.
    pub fn feature_names(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .params
            .vocabulary
            .iter()
            .map(|term| format!("{}__{}", prefix, term))
            .collect();
        if self.has_bucket() {
            names.push(format!("{}__unknown", prefix));
        }
        names
    }
}

impl FittedTransformer for FittedTfidfVectorizer {
    type Input = [String];
    type Output = Array2<f64>;
    type Params = TfidfParams;

    fn transform(&self, documents: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let width = self.n_features_out();
        let bucket = self.params.vocabulary.len();
        let mut out = Array2::<f64>::zeros((documents.len(), width));

        for (row, doc) in documents.iter().enumerate() {
            for token in tokenize(doc) {
                match self.index.get(&token) {
                    Some(&col) => out[[row, col]] += self.params.idf[col],
                    None => match self.params.handle_unknown {
                        HandleUnknown::Error => {
                            return Err(SchemaMismatch::UnknownCategory {
                                column: self.column.clone(),
                                row,
                                token,
                            }
                            .into());
                        }
                        HandleUnknown::Ignore => {}
                        HandleUnknown::Bucket => out[[row, bucket]] += self.params.unknown_idf,
                    },
                }
            }

            let mut values = out.row_mut(row);
            let norm = values.dot(&values).sqrt();
            if norm > 0.0 {
                values /= norm;
            }
        }

        Ok(out)
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.vocabulary.len() != params.idf.len() {
            return Err(PreprocessingError::InvalidParameter(format!(
                "vocabulary has {} terms but {} idf weights",
                params.vocabulary.len(),
                params.idf.len()
            )));
        }
        Ok(Self::from_parts(params))
    }

    /// A text column is a single input feature.
    fn n_features_in(&self) -> usize {
        1
    }

    fn n_features_out(&self) -> usize {
        self.params.vocabulary.len() + usize::from(self.has_bucket())
    }
}
