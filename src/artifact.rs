//! The trained artifact and its two-blob persistence.
//!
//! A [`TrainedArtifact`] bundles the fitted [`FeatureSpace`] with the
//! classifier trained on it. It is immutable once built; serving shares it
//! behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::feature::FeatureSpace;
use crate::model::{LinearClassifier, Prediction};

pub mod blob;
pub mod store;

pub use store::{ArtifactStore, MODEL_BLOB, VECTORIZER_BLOB};

/// How and when the classifier was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub created_at: DateTime<Utc>,
    /// Crate version that trained the model.
    pub trainer_version: String,
    pub best_c: f64,
    pub cv_weighted_f1: f64,
    pub test_accuracy: f64,
    pub test_weighted_f1: f64,
    pub training_examples: usize,
    pub gate_passed: bool,
}

impl ModelMetadata {
    /// Metadata for a model built outside the training pipeline.
    pub fn untracked(training_examples: usize) -> Self {
        ModelMetadata {
            created_at: Utc::now(),
            trainer_version: crate::VERSION.to_string(),
            best_c: f64::NAN,
            cv_weighted_f1: f64::NAN,
            test_accuracy: f64::NAN,
            test_weighted_f1: f64::NAN,
            training_examples,
            gate_passed: false,
        }
    }
}

/// A feature space and the classifier trained on it.
#[derive(Debug, Clone)]
pub struct TrainedArtifact {
    feature_space: FeatureSpace,
    classifier: LinearClassifier,
    metadata: ModelMetadata,
}

impl TrainedArtifact {
    /// Bundle the two halves, checking that they agree on dimensionality.
    pub fn new(
        feature_space: FeatureSpace,
        classifier: LinearClassifier,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        classifier.validate()?;
        if feature_space.dimension() != classifier.n_features() {
            return Err(SentiscopeError::artifact(format!(
                "vectorizer has {} features but the model expects {}",
                feature_space.dimension(),
                classifier.n_features()
            )));
        }
        Ok(TrainedArtifact {
            feature_space,
            classifier,
            metadata,
        })
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.feature_space
    }

    pub fn classifier(&self) -> &LinearClassifier {
        &self.classifier
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn dimension(&self) -> usize {
        self.feature_space.dimension()
    }

    /// Vectorise and score one text.
    pub fn predict_one(&self, text: &str) -> Result<Prediction> {
        let features = self.feature_space.transform_one(text)?;
        self.classifier.predict_one(&features)
    }
}
