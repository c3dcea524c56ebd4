//! # Sentiscope
//!
//! Three-class sentiment classification for short user comments.
//!
//! ## Features
//!
//! - TF-IDF features over word unigrams and bigrams
//! - Multinomial logistic regression fitted with L-BFGS
//! - Stratified cross-validated search over the regularisation strength
//! - Quality gate on held-out accuracy and weighted F1
//! - Checksummed on-disk artifacts
//! - Batch inference over HTTP with per-batch statistics
//!
//! ## Example
//!
//! ```no_run
//! use sentiscope::artifact::ArtifactStore;
//! use sentiscope::config::TrainingConfig;
//! use sentiscope::training::TrainingPipeline;
//!
//! # fn main() -> sentiscope::error::Result<()> {
//! let store = ArtifactStore::open_dir("models")?;
//! let pipeline = TrainingPipeline::new(TrainingConfig::default())?;
//! let report = pipeline.run("data/reddit_clean.csv", &store)?;
//! println!("best C = {}", report.best_c);
//!
//! let artifact = store.load()?;
//! let prediction = artifact.predict_one("this video was great")?;
//! println!("{} ({:.2})", prediction.label, prediction.confidence);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod feature;
pub mod metrics;
pub mod model;
pub mod sentiment;
pub mod server;
pub mod service;
pub mod storage;
pub mod training;

pub mod prelude {
    pub use crate::artifact::{ArtifactStore, ModelMetadata, TrainedArtifact};
    pub use crate::config::{PersistPolicy, ServerConfig, TrainingConfig};
    pub use crate::corpus::Corpus;
    pub use crate::error::{Result, SentiscopeError, ValidationError};
    pub use crate::sentiment::Sentiment;
    pub use crate::service::{SentimentService, ServiceState};
    pub use crate::training::{TrainingPipeline, TrainingReport};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
