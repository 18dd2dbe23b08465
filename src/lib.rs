//! # student_tracker
//!
//! A small machine-learning pipeline for tracking student performance, built
//! around two pieces:
//!
//! - **Stage orchestration**: each pipeline stage resolves to an in-process
//!   callable or an external script, with a fixed fallback order and a
//!   declared policy for stages that cannot be resolved.
//! - **Train/serve-consistent features**: a feature transform is fit once on
//!   training data, persisted with the models trained on it, and reused
//!   unmodified for every later record, whatever its column order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use student_tracker::config::{PipelineConfig, ProjectLayout};
//! use student_tracker::orchestrator::{Orchestrator, RunContext};
//!
//! let ctx = RunContext::new(ProjectLayout::new("."), PipelineConfig::default());
//! let result = Orchestrator::default().default_run(&ctx)?;
//! assert!(result.is_success());
//! # Ok::<(), student_tracker::error::PipelineError>(())
//! ```
//!
//! ## Module Structure
//!
//! - `orchestrator`: stage resolution, execution and run results
//! - `stages`: built-in stage bodies (generate, preprocess, features, train, evaluate, save)
//! - `data`: student records, the column-keyed frame, synthetic data and splitting
//! - `preprocessing`: scaler, text vectorizer and the combined feature transform
//! - `model`: type-state linear models, the majority baseline and trained artifacts
//! - `loss`, `optimizer`, `regularizers`, `trainer`, `dataset`: the training loop
//! - `artifact`: persisted transform + model sets
//! - `evaluation`: accuracy and classification reports
//! - `inference`: single-record prediction
//! - `recommender`: rule-based study advice
//! - `config`, `logging`, `error`, `serialization`: settings, tracing setup, errors, persistence

pub mod artifact;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod inference;
pub mod logging;
pub mod loss;
pub mod model;
pub mod optimizer;
pub mod orchestrator;
pub mod preprocessing;
pub mod recommender;
pub mod regularizers;
pub mod serialization;
pub mod stages;
pub mod trainer;

pub use error::{PipelineError, Result};
