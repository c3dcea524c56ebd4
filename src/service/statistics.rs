//! Batch summary statistics.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::sentiment::Sentiment;
use crate::service::predictor::PredictionResult;

/// Counts, percentages and mean confidence over one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_comments: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_percentage: f64,
    pub neutral_percentage: f64,
    pub negative_percentage: f64,
    pub average_confidence: f64,
}

impl BatchStatistics {
    /// Summarise a non-empty set of results.
    ///
    /// Percentages are rounded to 2 decimals, the average confidence to 4.
    pub fn summarize(results: &[PredictionResult]) -> Result<Self> {
        if results.is_empty() {
            return Err(SentiscopeError::other(
                "cannot summarise an empty set of predictions",
            ));
        }

        let mut counts = [0usize; 3];
        let mut confidence_sum = 0.0;
        for result in results {
            counts[result.sentiment.index()] += 1;
            confidence_sum += result.confidence;
        }

        let total = results.len();
        let percentage = |s: Sentiment| round_to(counts[s.index()] as f64 / total as f64 * 100.0, 2);

        Ok(BatchStatistics {
            total_comments: total,
            positive: counts[Sentiment::Positive.index()],
            neutral: counts[Sentiment::Neutral.index()],
            negative: counts[Sentiment::Negative.index()],
            positive_percentage: percentage(Sentiment::Positive),
            neutral_percentage: percentage(Sentiment::Neutral),
            negative_percentage: percentage(Sentiment::Negative),
            average_confidence: round_to(confidence_sum / total as f64, 4),
        })
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }
}

/// Round to `decimals` places, exact ties going to the even digit.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
