//! Per-comment prediction results.

use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// Displayed texts are cut to this many characters.
pub const DISPLAY_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

/// The outcome for one comment of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// The input text, truncated for display.
    pub text: String,
    pub sentiment: Sentiment,
    /// Probability of `sentiment`, in [0, 1].
    pub confidence: f64,
}

impl PredictionResult {
    pub fn new(text: &str, sentiment: Sentiment, confidence: f64) -> Self {
        PredictionResult {
            text: truncate_for_display(text, DISPLAY_CHARS),
            sentiment,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Keep the first `max_chars` characters, marking a cut with `...`.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{ELLIPSIS}", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation() {
        assert_eq!(truncate_for_display("short", 100), "short");

        let exact = "x".repeat(100);
        assert_eq!(truncate_for_display(&exact, 100), exact);

        let long = "y".repeat(150);
        let shown = truncate_for_display(&long, 100);
        assert_eq!(shown.chars().count(), 103);
        assert!(shown.ends_with("..."));
        assert!(shown.starts_with(&"y".repeat(100)));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(120);
        let shown = truncate_for_display(&text, 100);
        assert_eq!(shown, format!("{}...", "é".repeat(100)));
    }

    #[test]
    fn test_result_truncates_text() {
        let result = PredictionResult::new(&"z".repeat(150), Sentiment::Neutral, 0.6);
        assert_eq!(result.text.len(), 103);
        assert_eq!(result.sentiment.score(), 0);
    }
}
