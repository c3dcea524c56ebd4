//! Classification metrics.
//!
//! Confusion matrices always use the fixed (negative, neutral, positive)
//! order for both rows (actual) and columns (predicted), regardless of which
//! classes occur in the data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::sentiment::Sentiment;

/// Actual-vs-predicted counts; `matrix[actual][predicted]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub matrix: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    pub fn from_labels(actual: &[Sentiment], predicted: &[Sentiment]) -> Result<Self> {
        check_lengths(actual, predicted)?;
        let mut matrix = [[0usize; 3]; 3];
        for (a, p) in actual.iter().zip(predicted) {
            matrix[a.index()][p.index()] += 1;
        }
        Ok(ConfusionMatrix { matrix })
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..3).map(|i| self.matrix[i][i]).sum()
    }

    /// Number of examples whose actual class is `class`.
    pub fn support(&self, class: Sentiment) -> usize {
        self.matrix[class.index()].iter().sum()
    }

    /// Number of examples predicted as `class`.
    pub fn predicted(&self, class: Sentiment) -> usize {
        (0..3).map(|i| self.matrix[i][class.index()]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Per-class precision, recall and F1. Undefined ratios are 0.
    pub fn class_metrics(&self, class: Sentiment) -> ClassMetrics {
        let tp = self.matrix[class.index()][class.index()];
        let precision = ratio(tp, self.predicted(class));
        let recall = ratio(tp, self.support(class));
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics {
            class,
            precision,
            recall,
            f1,
            support: self.support(class),
        }
    }

    /// Support-weighted mean of per-class F1.
    pub fn weighted_f1(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        Sentiment::ALL
            .iter()
            .map(|&class| {
                let m = self.class_metrics(class);
                m.f1 * m.support as f64
            })
            .sum::<f64>()
            / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "           Predicted")?;
        writeln!(f, "         Neg  Neu  Pos")?;
        for (i, row) in self.matrix.iter().enumerate() {
            let label = ["Neg", "Neu", "Pos"][i];
            writeln!(
                f,
                "Actual {label}  {:>4} {:>4} {:>4}",
                row[0], row[1], row[2]
            )?;
        }
        Ok(())
    }
}

/// Precision/recall/F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: Sentiment,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Everything reported for one set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub weighted_f1: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub per_class: Vec<ClassMetrics>,
}

impl ClassificationMetrics {
    pub fn compute(actual: &[Sentiment], predicted: &[Sentiment]) -> Result<Self> {
        let confusion_matrix = ConfusionMatrix::from_labels(actual, predicted)?;
        Ok(ClassificationMetrics {
            accuracy: confusion_matrix.accuracy(),
            weighted_f1: confusion_matrix.weighted_f1(),
            per_class: Sentiment::ALL
                .iter()
                .map(|&c| confusion_matrix.class_metrics(c))
                .collect(),
            confusion_matrix,
        })
    }

    /// Text table with one row per class plus the weighted average.
    pub fn classification_report(&self) -> String {
        let mut out = format!(
            "{:>12} {:>9} {:>9} {:>9} {:>9}\n",
            "", "precision", "recall", "f1-score", "support"
        );
        let mut total_support = 0;
        let (mut wp, mut wr) = (0.0, 0.0);
        for m in &self.per_class {
            out.push_str(&format!(
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                m.class.display_name(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            ));
            total_support += m.support;
            wp += m.precision * m.support as f64;
            wr += m.recall * m.support as f64;
        }
        let denom = total_support.max(1) as f64;
        out.push_str(&format!(
            "\n{:>12} {:>9} {:>9} {:>9.2} {:>9}\n",
            "accuracy", "", "", self.accuracy, total_support
        ));
        out.push_str(&format!(
            "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            "weighted avg",
            wp / denom,
            wr / denom,
            self.weighted_f1,
            total_support
        ));
        out
    }
}

/// Fraction of matching labels.
pub fn accuracy(actual: &[Sentiment], predicted: &[Sentiment]) -> Result<f64> {
    Ok(ConfusionMatrix::from_labels(actual, predicted)?.accuracy())
}

/// Support-weighted F1 over the three classes.
pub fn weighted_f1(actual: &[Sentiment], predicted: &[Sentiment]) -> Result<f64> {
    Ok(ConfusionMatrix::from_labels(actual, predicted)?.weighted_f1())
}

fn check_lengths(actual: &[Sentiment], predicted: &[Sentiment]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(SentiscopeError::other(format!(
            "label count mismatch: {} actual vs {} predicted",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
