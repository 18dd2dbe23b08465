//! Feature preprocessing for student records.
//!
//! Transformers follow a fit-once / transform-many contract: an unfitted
//! [`Transformer`] learns from training data and returns an immutable
//! [`FittedTransformer`] that can be persisted and reused at inference time.
//!
//! # Available Transformers
//!
//! - [`StandardScaler`]: Z-score normalization of numeric columns
//! - [`TfidfVectorizer`]: TF-IDF encoding of a free-text column
//! - [`FeaturePipeline`]: the combined student feature transform, numeric
//!   columns first and text columns after, addressed by column name
//!
//! # Example
//!
//! ```ignore
//! use student_tracker::preprocessing::{FeaturePipeline, FittedTransformer, Transformer};
//!
//! let (fitted, train) = FeaturePipeline::default().fit_transform(&train_frame)?;
//! fitted.save_to_file("models/feature_transform.bin")?;
//!
//! // Later, at inference time
//! let loaded = FittedFeaturePipeline::load_from_file("models/feature_transform.bin")?;
//! let features = loaded.transform_record(&record)?;
//! ```

pub mod error;
pub mod pipeline;
pub mod scaling;
pub mod text;
pub mod traits;

pub use error::{PreprocessingError, SchemaMismatch};
pub use pipeline::{
    FeaturePipeline, FeaturePipelineParams, FeatureSchema, FeatureSet, FittedFeaturePipeline,
};
pub use scaling::{
    FittedStandardScaler, StandardScaler, StandardScalerConfig, StandardScalerParams,
};
pub use text::{tokenize, FittedTfidfVectorizer, HandleUnknown, TfidfParams, TfidfVectorizer};
pub use traits::{FittedTransformer, Transformer};
