//! The loaded, read-only serving state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use rayon::prelude::*;

use crate::artifact::{ArtifactStore, TrainedArtifact};
use crate::error::Result;
use crate::service::predictor::PredictionResult;

/// One loaded artifact, shared by every request.
#[derive(Debug, Clone)]
pub struct ServiceState {
    artifact: Arc<TrainedArtifact>,
    loaded_at: DateTime<Utc>,
}

impl ServiceState {
    /// Load the artifact from `store`. Fails if either blob is missing,
    /// corrupt, or the two do not fit together.
    pub fn initialize(store: &ArtifactStore) -> Result<Self> {
        let artifact = store.load()?;
        info!(
            "Model and vectorizer loaded ({} features, trained {})",
            artifact.dimension(),
            artifact.metadata().created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        Ok(Self::from_artifact(artifact))
    }

    pub fn from_artifact(artifact: TrainedArtifact) -> Self {
        ServiceState {
            artifact: Arc::new(artifact),
            loaded_at: Utc::now(),
        }
    }

    pub fn artifact(&self) -> &Arc<TrainedArtifact> {
        &self.artifact
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Score `texts` in order. Runs on the current rayon pool.
    pub fn predict<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<PredictionResult>> {
        texts
            .par_iter()
            .map(|text| {
                let text = text.as_ref();
                let prediction = self.artifact.predict_one(text)?;
                Ok(PredictionResult::new(
                    text,
                    prediction.label,
                    prediction.confidence,
                ))
            })
            .collect()
    }
}
