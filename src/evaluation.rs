//! Held-out evaluation of trained candidates.

use crate::error::{PipelineError, Result};
use crate::model::TrainedModel;
use crate::preprocessing::{FeatureSet, FittedFeaturePipeline};
use crate::serialization::write_atomic;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 plus macro and support-weighted averages.
///
/// Undefined ratios (no predicted or no true members of a class) count as 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassMetrics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub accuracy: f64,
    pub classification_report: ClassificationReport,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub n_samples: usize,
    pub transform_fingerprint: String,
    pub models: BTreeMap<String, ModelEvaluation>,
}

/// Fraction of positions where `y_pred` equals `y_true`.
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

fn label_key(label: f64) -> String {
    if label.fract() == 0.0 {
        format!("{}", label as i64)
    } else {
        label.to_string()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn classification_report(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ClassificationReport {
    let mut labels: Vec<f64> = y_true.iter().chain(y_pred.iter()).copied().collect();
    labels.sort_by(|a, b| a.total_cmp(b));
    labels.dedup();

    let mut classes = BTreeMap::new();
    let mut macro_sum = (0.0, 0.0, 0.0);
    let mut weighted_sum = (0.0, 0.0, 0.0);

    for &label in &labels {
        let mut tp = 0;
        let mut predicted = 0;
        let mut support = 0;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            if p == label {
                predicted += 1;
            }
            if t == label {
                support += 1;
                if p == label {
                    tp += 1;
                }
            }
        }
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        macro_sum.0 += precision;
        macro_sum.1 += recall;
        macro_sum.2 += f1_score;
        weighted_sum.0 += precision * support as f64;
        weighted_sum.1 += recall * support as f64;
        weighted_sum.2 += f1_score * support as f64;

        classes.insert(
            label_key(label),
            ClassMetrics {
                precision,
                recall,
                f1_score,
                support,
            },
        );
    }

    let n_labels = labels.len().max(1) as f64;
    let total = y_true.len();
    let total_f = total.max(1) as f64;

    ClassificationReport {
        classes,
        accuracy: accuracy(y_true, y_pred),
        macro_avg: ClassMetrics {
            precision: macro_sum.0 / n_labels,
            recall: macro_sum.1 / n_labels,
            f1_score: macro_sum.2 / n_labels,
            support: total,
        },
        weighted_avg: ClassMetrics {
            precision: weighted_sum.0 / total_f,
            recall: weighted_sum.1 / total_f,
            f1_score: weighted_sum.2 / total_f,
            support: total,
        },
    }
}

/// Score every model on features produced by `transform`.
///
/// Fails with `ArtifactMissing` when there is no model to score, and with
/// `ArtifactMismatch` when a model was trained against another transform.
pub fn evaluate_models(
    transform: &FittedFeaturePipeline,
    models: &[TrainedModel],
    features: &FeatureSet,
) -> Result<EvaluationReport> {
    if models.is_empty() {
        return Err(PipelineError::ArtifactMissing(
            "no trained models to evaluate".to_string(),
        ));
    }
    let target = features.require_target()?;
    if features.n_samples() == 0 {
        return Err(PipelineError::InvalidInput(
            "no held-out records to evaluate".to_string(),
        ));
    }

    let mut results = BTreeMap::new();
    for model in models {
        model.check_compatible(transform)?;
        let predicted = model.predict(&features.matrix)?;
        let classification_report = classification_report(target, &predicted);
        results.insert(
            model.name().to_string(),
            ModelEvaluation {
                accuracy: classification_report.accuracy,
                classification_report,
            },
        );
    }

    Ok(EvaluationReport {
        generated_at: Utc::now(),
        n_samples: features.n_samples(),
        transform_fingerprint: format!("{:08x}", transform.fingerprint()),
        models: results,
    })
}

/// Plain-text table per model.
impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model evaluation on {} held-out records ({})",
            self.n_samples,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        for (name, eval) in &self.models {
            let report = &eval.classification_report;
            writeln!(f)?;
            writeln!(f, "{}  accuracy {:.4}", name, eval.accuracy)?;
            writeln!(
                f,
                "  {:<14}{:>10}{:>10}{:>10}{:>10}",
                "", "precision", "recall", "f1-score", "support"
            )?;
            let rows = report
                .classes
                .iter()
                .map(|(label, m)| (label.as_str(), m))
                .chain([("macro avg", &report.macro_avg), ("weighted avg", &report.weighted_avg)]);
            for (label, m) in rows {
                writeln!(
                    f,
                    "  {:<14}{:>10.2}{:>10.2}{:>10.2}{:>10}",
                    label, m.precision, m.recall, m.f1_score, m.support
                )?;
            }
        }
        Ok(())
    }
}

impl EvaluationReport {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)?;
        Ok(())
    }

    pub fn write_summary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path, self.to_string().as_bytes())?;
        Ok(())
    }
}
