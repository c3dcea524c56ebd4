//! Saving and loading [`TrainedArtifact`]s through a [`Storage`] backend.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::artifact::blob;
use crate::artifact::{ModelMetadata, TrainedArtifact};
use crate::error::{Result, SentiscopeError};
use crate::feature::FeatureSpace;
use crate::model::LinearClassifier;
use crate::storage::{FileStorage, Storage};

/// Blob holding the fitted feature space.
pub const VECTORIZER_BLOB: &str = "tfidf_vectorizer.bin";
/// Blob holding the classifier and its training metadata.
pub const MODEL_BLOB: &str = "sentiment_model.bin";

const VECTORIZER_MAGIC: [u8; 4] = *b"STFV";
const MODEL_MAGIC: [u8; 4] = *b"STLM";

#[derive(Serialize)]
struct ModelBlobRef<'a> {
    classifier: &'a LinearClassifier,
    metadata: &'a ModelMetadata,
}

#[derive(Deserialize)]
struct ModelBlob {
    classifier: LinearClassifier,
    metadata: ModelMetadata,
}

/// Reads and writes the two artifact blobs.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    storage: Arc<dyn Storage>,
}

impl ArtifactStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        ArtifactStore { storage }
    }

    /// Store backed by a directory, created if missing.
    pub fn open_dir<P: AsRef<Path>>(directory: P) -> Result<Self> {
        Ok(Self::new(Arc::new(FileStorage::new(directory)?)))
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Whether both blobs are present.
    pub fn exists(&self) -> bool {
        self.storage.file_exists(VECTORIZER_BLOB) && self.storage.file_exists(MODEL_BLOB)
    }

    /// Persist both halves; returns where they were written.
    pub fn save(&self, artifact: &TrainedArtifact) -> Result<Vec<String>> {
        let vectorizer = blob::encode(VECTORIZER_MAGIC, artifact.feature_space())?;
        let model = blob::encode(
            MODEL_MAGIC,
            &ModelBlobRef {
                classifier: artifact.classifier(),
                metadata: artifact.metadata(),
            },
        )?;

        self.storage.write_file(VECTORIZER_BLOB, &vectorizer)?;
        self.storage.write_file(MODEL_BLOB, &model)?;

        let mut locations = Vec::with_capacity(2);
        for name in [VECTORIZER_BLOB, MODEL_BLOB] {
            let location = self.storage.describe(name);
            info!("Saved {location} ({} bytes)", self.storage.file_size(name)?);
            locations.push(location);
        }
        Ok(locations)
    }

    /// Load and cross-check both halves.
    pub fn load(&self) -> Result<TrainedArtifact> {
        for name in [VECTORIZER_BLOB, MODEL_BLOB] {
            if !self.storage.file_exists(name) {
                return Err(SentiscopeError::artifact(format!(
                    "{} not found",
                    self.storage.describe(name)
                )));
            }
        }

        let bytes = self.storage.read_file(VECTORIZER_BLOB)?;
        let feature_space: FeatureSpace = blob::decode(VECTORIZER_BLOB, VECTORIZER_MAGIC, &bytes)?;
        debug!(
            "Loaded {VECTORIZER_BLOB}: {} terms",
            feature_space.dimension()
        );

        let bytes = self.storage.read_file(MODEL_BLOB)?;
        let model: ModelBlob = blob::decode(MODEL_BLOB, MODEL_MAGIC, &bytes)?;
        debug!(
            "Loaded {MODEL_BLOB}: {} classes, C={}",
            model.classifier.classes().len(),
            model.metadata.best_c
        );

        TrainedArtifact::new(feature_space, model.classifier, model.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{TfidfVectorizer, VectorizerConfig};
    use crate::model::LogisticRegression;
    use crate::sentiment::Sentiment;
    use crate::storage::MemoryStorage;

    fn artifact() -> TrainedArtifact {
        let texts = [
            "great video", "great song", "great video indeed",
            "bad video", "bad song", "bad song indeed",
        ];
        let labels = [
            Sentiment::Positive, Sentiment::Positive, Sentiment::Positive,
            Sentiment::Negative, Sentiment::Negative, Sentiment::Negative,
        ];
        let config = VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        };
        let space = TfidfVectorizer::new(config).unwrap().fit(&texts).unwrap();
        let x = space.transform(&texts).unwrap();
        let (model, _) = LogisticRegression::new(1.0).fit(&x, &labels).unwrap();
        TrainedArtifact::new(space, model, ModelMetadata::untracked(texts.len())).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ArtifactStore::new(storage.clone());
        assert!(!store.exists());

        let original = artifact();
        let locations = store.save(&original).unwrap();
        assert_eq!(locations, vec!["memory:tfidf_vectorizer.bin", "memory:sentiment_model.bin"]);
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.dimension(), original.dimension());
        assert_eq!(loaded.classifier(), original.classifier());
        assert_eq!(loaded.metadata().training_examples, 6);
        for text in ["great video", "bad song", "something else"] {
            assert_eq!(
                loaded.predict_one(text).unwrap(),
                original.predict_one(text).unwrap()
            );
        }
    }

    #[test]
    fn test_missing_half() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ArtifactStore::new(storage.clone());
        store.save(&artifact()).unwrap();

        storage.delete_file(MODEL_BLOB).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, SentiscopeError::Artifact(_)));
        assert!(err.to_string().contains(MODEL_BLOB));
    }

    #[test]
    fn test_swapped_blobs_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ArtifactStore::new(storage.clone());
        store.save(&artifact()).unwrap();

        let model = storage.read_file(MODEL_BLOB).unwrap();
        storage.write_file(VECTORIZER_BLOB, &model).unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_incompatible_halves() {
        let original = artifact();
        let other_space = TfidfVectorizer::new(VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        })
        .unwrap()
        .fit(&["one two three", "four five six"])
        .unwrap();

        let err = TrainedArtifact::new(
            other_space,
            original.classifier().clone(),
            original.metadata().clone(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("features"));
    }

    #[test]
    fn test_directory_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::open_dir(dir.path().join("models")).unwrap();
        store.save(&artifact()).unwrap();

        assert!(dir.path().join("models").join(VECTORIZER_BLOB).exists());
        assert!(dir.path().join("models").join(MODEL_BLOB).exists());
        for name in [VECTORIZER_BLOB, MODEL_BLOB] {
            let on_disk = std::fs::metadata(dir.path().join("models").join(name)).unwrap().len();
            assert_eq!(store.storage().file_size(name).unwrap(), on_disk);
        }
        assert!(store.load().is_ok());
    }
}
