//! Inference service: validation, batch scoring and batch statistics.
//!
//! A [`SentimentService`] is built once at startup around a loaded
//! [`ServiceState`] (or the reason loading failed) and then shared by all
//! requests. Nothing in it changes after construction.

pub mod engine;
pub mod predictor;
pub mod state;
pub mod statistics;
pub mod validation;

pub use engine::{BatchPrediction, HealthStatus, Readiness, SentimentService};
pub use predictor::{PredictionResult, truncate_for_display};
pub use state::ServiceState;
pub use statistics::BatchStatistics;
pub use validation::BatchLimits;
