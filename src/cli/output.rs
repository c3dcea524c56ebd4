//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SentiscopeArgs};
use crate::error::Result;
use crate::evaluation::{GateOutcome, InferenceTiming};
use crate::metrics::ClassificationMetrics;
use crate::server::dto::BatchResponse;
use crate::training::TrainingReport;

/// Something a command can print for people.
pub trait HumanReadable {
    fn render_human(&self) -> String;
}

/// Result structure for evaluating an existing artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub data: String,
    pub examples: usize,
    pub metrics: ClassificationMetrics,
    pub gate: GateOutcome,
    pub timing: Option<InferenceTiming>,
}

/// Output result in the requested format.
pub fn output_result<T>(message: &str, result: &T, args: &SentiscopeArgs) -> Result<()>
where
    T: Serialize + HumanReadable,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            print!("{}", result.render_human());
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &SentiscopeArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn pass_fail(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}

fn render_metrics(out: &mut String, metrics: &ClassificationMetrics, gate: &GateOutcome) {
    let _ = writeln!(
        out,
        "Accuracy:    {:.4}  [{}]",
        metrics.accuracy,
        pass_fail(gate.accuracy_passed)
    );
    let _ = writeln!(
        out,
        "Weighted F1: {:.4}  [{}]",
        metrics.weighted_f1,
        pass_fail(gate.f1_passed)
    );
    let _ = writeln!(out);
    out.push_str(&metrics.classification_report());
    let _ = writeln!(out);
    let _ = write!(out, "{}", metrics.confusion_matrix);
}

impl HumanReadable for TrainingReport {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Examples: {} (negative {}, neutral {}, positive {})",
            self.total_examples, self.class_counts[0], self.class_counts[1], self.class_counts[2]
        );
        let _ = writeln!(
            out,
            "Split: {} train / {} test",
            self.train_examples, self.test_examples
        );
        let _ = writeln!(out, "Vocabulary: {} terms", self.vocabulary_size);
        let _ = writeln!(out);
        let _ = writeln!(out, "{:>8} {:>10} {:>10}", "C", "mean F1", "std");
        for candidate in &self.candidates {
            let marker = if candidate.c == self.best_c { " *" } else { "" };
            let _ = writeln!(
                out,
                "{:>8} {:>10.4} {:>10.4}{marker}",
                candidate.c, candidate.mean, candidate.std
            );
        }
        let _ = writeln!(
            out,
            "Optimizer: {} iterations, converged: {}",
            self.diagnostics.iterations, self.diagnostics.converged
        );
        let _ = writeln!(out);
        render_metrics(&mut out, &self.evaluation.metrics, &self.evaluation.gate);
        if let Some(timing) = &self.evaluation.timing {
            let _ = writeln!(
                out,
                "\nInference: {:.2}ms for {} comments ({:.3}ms each)",
                timing.total_ms, timing.comments, timing.per_comment_ms
            );
        }
        let _ = writeln!(out);
        if self.persisted {
            for location in &self.saved_to {
                let _ = writeln!(out, "Saved {location}");
            }
        } else {
            let _ = writeln!(out, "Model not saved (quality gate failed)");
        }
        out
    }
}

impl HumanReadable for BatchResponse {
    fn render_human(&self) -> String {
        let mut out = String::new();
        for (i, result) in self.results.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {:<8} ({:>2}) {:.4}  {}",
                i + 1,
                result.sentiment,
                result.sentiment_score,
                result.confidence,
                result.text
            );
        }
        let s = &self.statistics;
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "positive {} ({:.2}%), neutral {} ({:.2}%), negative {} ({:.2}%)",
            s.positive,
            s.positive_percentage,
            s.neutral,
            s.neutral_percentage,
            s.negative,
            s.negative_percentage
        );
        let _ = writeln!(
            out,
            "average confidence {:.4}, {:.2}ms",
            s.average_confidence, self.processing_time_ms
        );
        out
    }
}

impl HumanReadable for EvaluationResult {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Evaluated {} examples from {}", self.examples, self.data);
        let _ = writeln!(out);
        render_metrics(&mut out, &self.metrics, &self.gate);
        let _ = writeln!(
            out,
            "\nQuality gate: {}",
            pass_fail(self.gate.passed())
        );
        out
    }
}
