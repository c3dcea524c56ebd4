//! The inference service.
//!
//! Readiness is decided once, at construction. Scoring is CPU-bound and runs
//! on a dedicated rayon pool so large batches never block the async runtime.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, error};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::artifact::ArtifactStore;
use crate::config::ServerConfig;
use crate::error::{Result, SentiscopeError};
use crate::service::predictor::PredictionResult;
use crate::service::state::ServiceState;
use crate::service::statistics::{BatchStatistics, round_to};
use crate::service::validation::BatchLimits;

const NOT_LOADED: &str = "Model not loaded";

/// Whether the service can answer predictions.
#[derive(Debug, Clone)]
pub enum Readiness {
    Ready(Arc<ServiceState>),
    /// Loading failed; carries the reason.
    Unavailable(String),
}

/// Reported by a healthy service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub vectorizer_loaded: bool,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

/// The answer to one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    pub request_id: Uuid,
    pub results: Vec<PredictionResult>,
    pub statistics: BatchStatistics,
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone)]
pub struct SentimentService {
    readiness: Readiness,
    limits: BatchLimits,
    pool: Arc<ThreadPool>,
}

impl SentimentService {
    pub fn new(readiness: Readiness, limits: BatchLimits, worker_threads: Option<usize>) -> Result<Self> {
        limits.validate()?;
        let threads = worker_threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sentiscope-worker-{i}"))
            .build()
            .map_err(|e| SentiscopeError::other(format!("Failed to create thread pool: {e}")))?;

        Ok(SentimentService {
            readiness,
            limits,
            pool: Arc::new(pool),
        })
    }

    /// Try to load the artifact. A load failure leaves the service running
    /// but unavailable.
    pub fn from_store(store: &ArtifactStore, config: &ServerConfig) -> Result<Self> {
        let readiness = match ServiceState::initialize(store) {
            Ok(state) => Readiness::Ready(Arc::new(state)),
            Err(e) => {
                error!("Error loading model: {e}");
                Readiness::Unavailable(e.to_string())
            }
        };
        Self::new(readiness, config.limits, config.worker_threads)
    }

    pub fn ready(state: ServiceState, config: &ServerConfig) -> Result<Self> {
        Self::new(Readiness::Ready(Arc::new(state)), config.limits, config.worker_threads)
    }

    pub fn unavailable<S: Into<String>>(reason: S, config: &ServerConfig) -> Result<Self> {
        Self::new(Readiness::Unavailable(reason.into()), config.limits, config.worker_threads)
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready(_))
    }

    pub fn limits(&self) -> &BatchLimits {
        &self.limits
    }

    pub fn state(&self) -> Result<&Arc<ServiceState>> {
        match &self.readiness {
            Readiness::Ready(state) => Ok(state),
            Readiness::Unavailable(reason) => {
                debug!("Rejecting request: {reason}");
                Err(SentiscopeError::unavailable(NOT_LOADED))
            }
        }
    }

    pub fn health(&self) -> Result<HealthStatus> {
        self.state()?;
        let now = Utc::now();
        Ok(HealthStatus {
            status: "healthy".to_string(),
            model_loaded: true,
            vectorizer_loaded: true,
            timestamp: now.timestamp_micros() as f64 / 1e6,
        })
    }

    /// Validate and score a batch on the worker pool.
    pub async fn predict_batch(&self, texts: Vec<String>) -> Result<BatchPrediction> {
        let start = Instant::now();
        let state = Arc::clone(self.state()?);
        self.limits.check_batch(&texts)?;

        let results = self.run_on_pool(move || state.predict(&texts)).await?;
        self.finish(results, start)
    }

    /// Run a scoring job on the pool and await its result.
    async fn run_on_pool<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            if tx.send(guard_scoring(job)).is_err() {
                debug!("Batch result discarded: requester went away");
            }
        });
        rx.await
            .map_err(|_| SentiscopeError::prediction("worker dropped the batch"))?
    }

    /// Blocking variant of [`predict_batch`](Self::predict_batch).
    pub fn predict_texts<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<BatchPrediction> {
        let start = Instant::now();
        let state = self.state()?;
        self.limits.check_batch(texts)?;

        let results = self
            .pool
            .install(|| guard_scoring(|| state.predict(texts)))?;
        self.finish(results, start)
    }

    fn finish(&self, results: Vec<PredictionResult>, start: Instant) -> Result<BatchPrediction> {
        let statistics = BatchStatistics::summarize(&results)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let prediction = BatchPrediction {
            request_id: Uuid::new_v4(),
            results,
            statistics,
            processing_time_ms: round_to(elapsed_ms, 2),
        };
        debug!(
            "Request {} scored {} comments in {:.2}ms",
            prediction.request_id,
            prediction.results.len(),
            prediction.processing_time_ms
        );
        Ok(prediction)
    }
}

/// Run `job`, turning failures and panics into prediction errors.
fn guard_scoring<T>(job: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(result) => result.map_err(into_prediction_error),
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            error!("Scoring panicked: {reason}");
            Err(SentiscopeError::prediction(format!("scoring panicked: {reason}")))
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Anything failing inside scoring is an internal error.
fn into_prediction_error(err: SentiscopeError) -> SentiscopeError {
    match err {
        SentiscopeError::Prediction(_) => err,
        other => SentiscopeError::prediction(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ModelMetadata, TrainedArtifact};
    use crate::error::ValidationError;
    use crate::feature::{TfidfVectorizer, VectorizerConfig};
    use crate::model::LogisticRegression;
    use crate::sentiment::Sentiment;
    use crate::storage::MemoryStorage;

    fn state() -> ServiceState {
        let texts = [
            "great video", "great song", "great video really",
            "terrible video", "terrible song", "terrible song really",
            "ok video", "ok song", "ok song really",
        ];
        let labels = [
            Sentiment::Positive, Sentiment::Positive, Sentiment::Positive,
            Sentiment::Negative, Sentiment::Negative, Sentiment::Negative,
            Sentiment::Neutral, Sentiment::Neutral, Sentiment::Neutral,
        ];
        let config = VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        };
        let space = TfidfVectorizer::new(config).unwrap().fit(&texts).unwrap();
        let x = space.transform(&texts).unwrap();
        let (model, _) = LogisticRegression::new(10.0).fit(&x, &labels).unwrap();
        let artifact = TrainedArtifact::new(space, model, ModelMetadata::untracked(9)).unwrap();
        ServiceState::from_artifact(artifact)
    }

    fn service() -> SentimentService {
        SentimentService::ready(state(), &ServerConfig {
            worker_threads: Some(2),
            ..ServerConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_predict_batch_alignment() {
        let service = service();
        let batch = vec![
            "great video".to_string(),
            "terrible video".to_string(),
            "ok video".to_string(),
        ];
        let prediction = service.predict_batch(batch).await.unwrap();

        let labels: Vec<Sentiment> = prediction.results.iter().map(|r| r.sentiment).collect();
        assert_eq!(labels, vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]);
        assert_eq!(prediction.statistics.total_comments, 3);
        assert_eq!(prediction.statistics.positive_percentage, 33.33);

        let mean = prediction.results.iter().map(|r| r.confidence).sum::<f64>() / 3.0;
        assert_eq!(prediction.statistics.average_confidence, round_to(mean, 4));
        assert!(prediction.processing_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_validation_before_scoring() {
        let service = service();
        let err = service.predict_batch(Vec::new()).await.unwrap_err();
        assert!(err.is_client_error());

        let err = service
            .predict_batch(vec!["fine".to_string(), String::new()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SentiscopeError::Validation(ValidationError::TextLength { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_unavailable_service() {
        let service = SentimentService::unavailable("missing", &ServerConfig::default()).unwrap();
        assert!(!service.is_ready());
        assert!(service.health().unwrap_err().is_unavailable());

        let err = service.predict_batch(vec!["hello".to_string()]).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "Service unavailable: Model not loaded");
    }

    #[test]
    fn test_from_empty_store_is_unavailable() {
        let store = ArtifactStore::new(Arc::new(MemoryStorage::new()));
        let service = SentimentService::from_store(&store, &ServerConfig::default()).unwrap();
        assert!(matches!(service.readiness(), Readiness::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_panicking_job_becomes_prediction_error() {
        let service = service();
        let err = service
            .run_on_pool(|| -> Result<Vec<PredictionResult>> { panic!("matrix shape mismatch") })
            .await
            .unwrap_err();
        assert!(matches!(err, SentiscopeError::Prediction(_)));
        assert!(err.to_string().contains("matrix shape mismatch"));

        // The pool keeps serving after the panic.
        let prediction = service.predict_batch(vec!["great video".to_string()]).await.unwrap();
        assert_eq!(prediction.results[0].sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_guard_scoring() {
        let err = guard_scoring(|| -> Result<()> { panic!("{} rows", 3) }).unwrap_err();
        assert!(matches!(err, SentiscopeError::Prediction(_)));
        assert!(err.to_string().contains("3 rows"));

        let err = guard_scoring(|| -> Result<()> { Err(SentiscopeError::other("bad weights")) })
            .unwrap_err();
        assert!(matches!(err, SentiscopeError::Prediction(_)));
        assert_eq!(guard_scoring(|| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_predict_texts_is_deterministic() {
        let service = service();
        let texts = ["great song", "terrible", "something unseen"];
        let a = service.predict_texts(&texts).unwrap();
        let b = service.predict_texts(&texts).unwrap();
        assert_eq!(a.results, b.results);

        for result in &a.results {
            assert!((0.0..=1.0).contains(&result.confidence));
        }
        let health = service.health().unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.model_loaded && health.vectorizer_loaded);
    }
}
