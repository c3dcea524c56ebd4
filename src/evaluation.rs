//! Held-out evaluation and the quality gate.
//!
//! The gate is advisory: [`GateOutcome`] only reports whether the targets
//! were met. Whether a failing model is persisted is decided by the
//! training pipeline's [`PersistPolicy`](crate::config::PersistPolicy).

use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::{Result, SentiscopeError};
use crate::feature::FeatureSpace;
use crate::metrics::ClassificationMetrics;
use crate::model::LinearClassifier;

/// Number of held-out comments timed by the inference sample.
pub const TIMING_SAMPLE_SIZE: usize = 50;

/// Minimum scores a model must reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGate {
    pub min_accuracy: f64,
    pub min_weighted_f1: f64,
}

impl Default for QualityGate {
    fn default() -> Self {
        QualityGate {
            min_accuracy: 0.80,
            min_weighted_f1: 0.75,
        }
    }
}

impl QualityGate {
    pub fn check(&self, metrics: &ClassificationMetrics) -> GateOutcome {
        GateOutcome {
            accuracy_passed: metrics.accuracy >= self.min_accuracy,
            f1_passed: metrics.weighted_f1 >= self.min_weighted_f1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_accuracy", self.min_accuracy),
            ("min_weighted_f1", self.min_weighted_f1),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SentiscopeError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub accuracy_passed: bool,
    pub f1_passed: bool,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        self.accuracy_passed && self.f1_passed
    }
}

/// Wall-clock cost of vectorising and scoring a handful of comments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceTiming {
    pub comments: usize,
    pub total_ms: f64,
    pub per_comment_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub metrics: ClassificationMetrics,
    pub gate: GateOutcome,
    pub timing: Option<InferenceTiming>,
}

/// Scores a fitted model on held-out examples.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    gate: QualityGate,
}

impl Evaluator {
    pub fn new(gate: QualityGate) -> Self {
        Evaluator { gate }
    }

    pub fn gate(&self) -> &QualityGate {
        &self.gate
    }

    pub fn evaluate(
        &self,
        classifier: &LinearClassifier,
        space: &FeatureSpace,
        held_out: &Corpus,
    ) -> Result<EvaluationReport> {
        if held_out.is_empty() {
            return Err(SentiscopeError::training("held-out split is empty"));
        }

        let texts = held_out.texts();
        let features = space.transform(&texts)?;
        let predicted = classifier.predict(&features)?;
        let metrics = ClassificationMetrics::compute(&held_out.labels(), &predicted)?;
        let gate = self.gate.check(&metrics);
        let timing = Some(time_inference(classifier, space, &texts)?);

        Ok(EvaluationReport {
            metrics,
            gate,
            timing,
        })
    }

    /// Write the report to the log.
    pub fn log_report(&self, report: &EvaluationReport) {
        info!("Accuracy: {:.4}", report.metrics.accuracy);
        info!("Weighted F1: {:.4}", report.metrics.weighted_f1);
        info!(
            "Classification report:\n{}",
            report.metrics.classification_report()
        );
        info!("Confusion matrix:\n{}", report.metrics.confusion_matrix);

        if report.gate.passed() {
            info!(
                "Model meets requirements (accuracy >= {:.2}, F1 >= {:.2})",
                self.gate.min_accuracy, self.gate.min_weighted_f1
            );
        } else {
            if !report.gate.accuracy_passed {
                warn!(
                    "Accuracy {:.4} is below target {:.2}",
                    report.metrics.accuracy, self.gate.min_accuracy
                );
            }
            if !report.gate.f1_passed {
                warn!(
                    "Weighted F1 {:.4} is below target {:.2}",
                    report.metrics.weighted_f1, self.gate.min_weighted_f1
                );
            }
        }

        if let Some(timing) = &report.timing {
            info!(
                "Inference time for {} comments: {:.2}ms ({:.3}ms per comment)",
                timing.comments, timing.total_ms, timing.per_comment_ms
            );
        }
    }
}

/// Time vectorise+predict for the first [`TIMING_SAMPLE_SIZE`] texts.
pub fn time_inference<S: AsRef<str> + Sync>(
    classifier: &LinearClassifier,
    space: &FeatureSpace,
    texts: &[S],
) -> Result<InferenceTiming> {
    let sample = &texts[..texts.len().min(TIMING_SAMPLE_SIZE)];
    let start = Instant::now();
    let features = space.transform(sample)?;
    classifier.predict(&features)?;
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(InferenceTiming {
        comments: sample.len(),
        total_ms,
        per_comment_ms: if sample.is_empty() {
            0.0
        } else {
            total_ms / sample.len() as f64
        },
    })
}
