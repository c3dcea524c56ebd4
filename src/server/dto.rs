//! JSON bodies of the HTTP interface.

use serde::{Deserialize, Serialize};

use crate::service::{BatchPrediction, BatchStatistics, PredictionResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentInput {
    pub text: String,
}

/// `POST /predict_batch` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub comments: Vec<CommentInput>,
}

impl BatchRequest {
    pub fn into_texts(self) -> Vec<String> {
        self.comments.into_iter().map(|c| c.text).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub text: String,
    /// `negative`, `neutral` or `positive`.
    pub sentiment: String,
    /// -1, 0 or 1.
    pub sentiment_score: i8,
    pub confidence: f64,
}

impl From<PredictionResult> for SentimentResult {
    fn from(result: PredictionResult) -> Self {
        SentimentResult {
            sentiment: result.sentiment.as_str().to_string(),
            sentiment_score: result.sentiment.score(),
            text: result.text,
            confidence: result.confidence,
        }
    }
}

/// `POST /predict_batch` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<SentimentResult>,
    pub statistics: BatchStatistics,
    pub processing_time_ms: f64,
}

impl From<BatchPrediction> for BatchResponse {
    fn from(prediction: BatchPrediction) -> Self {
        BatchResponse {
            results: prediction.results.into_iter().map(Into::into).collect(),
            statistics: prediction.statistics,
            processing_time_ms: prediction.processing_time_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub health: String,
    pub predict: String,
}

/// `GET /` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: Endpoints,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        ServiceInfo {
            message: "Sentiscope Comment Sentiment API".to_string(),
            version: crate::VERSION.to_string(),
            endpoints: Endpoints {
                health: "/health".to_string(),
                predict: "/predict_batch".to_string(),
            },
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Sentiment;

    #[test]
    fn test_request_shape() {
        let request: BatchRequest =
            serde_json::from_str(r#"{"comments": [{"text": "a"}, {"text": "b"}]}"#).unwrap();
        assert_eq!(request.into_texts(), vec!["a", "b"]);

        assert!(serde_json::from_str::<BatchRequest>(r#"{"comments": [{}]}"#).is_err());
    }

    #[test]
    fn test_result_shape() {
        let result = SentimentResult::from(PredictionResult::new("meh", Sentiment::Negative, 0.7));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment"], "negative");
        assert_eq!(json["sentiment_score"], -1);
        assert_eq!(json["confidence"], 0.7);
        assert_eq!(json["text"], "meh");
    }
}
