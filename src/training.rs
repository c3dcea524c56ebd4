//! End-to-end training pipeline.
//!
//! load corpus -> stratified split -> fit feature space on the training
//! split -> grid search -> held-out evaluation -> quality gate -> persist.

use std::path::Path;
use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactStore, ModelMetadata, TrainedArtifact};
use crate::config::TrainingConfig;
use crate::corpus::Corpus;
use crate::error::{Result, SentiscopeError};
use crate::evaluation::{EvaluationReport, Evaluator};
use crate::feature::TfidfVectorizer;
use crate::model::{CandidateScore, FitDiagnostics, GridSearch};
use crate::sentiment::Sentiment;

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub total_examples: usize,
    /// Counts in (negative, neutral, positive) order.
    pub class_counts: [usize; 3],
    pub train_examples: usize,
    pub test_examples: usize,
    pub vocabulary_size: usize,
    pub candidates: Vec<CandidateScore>,
    pub best_c: f64,
    pub cv_weighted_f1: f64,
    pub diagnostics: FitDiagnostics,
    pub evaluation: EvaluationReport,
    pub persisted: bool,
    pub saved_to: Vec<String>,
    pub elapsed_secs: f64,
}

/// Runs training with a fixed configuration.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(TrainingPipeline { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train from a CSV corpus and persist according to the persist policy.
    pub fn run<P: AsRef<Path>>(&self, corpus_path: P, store: &ArtifactStore) -> Result<TrainingReport> {
        let path = corpus_path.as_ref();
        info!("Loading corpus from {}", path.display());
        let corpus = Corpus::from_csv_path(path)?;
        self.run_on_corpus(&corpus, store)
    }

    /// Train on an in-memory corpus and persist according to the persist policy.
    pub fn run_on_corpus(&self, corpus: &Corpus, store: &ArtifactStore) -> Result<TrainingReport> {
        let (artifact, mut report) = self.train(corpus)?;

        if self.config.persist_policy.should_persist(report.evaluation.gate.passed()) {
            report.saved_to = store.save(&artifact)?;
            report.persisted = true;
        } else {
            warn!(
                "Model failed the quality gate; not persisted (policy: {})",
                self.config.persist_policy
            );
        }
        Ok(report)
    }

    /// Train and evaluate without touching storage.
    pub fn train(&self, corpus: &Corpus) -> Result<(TrainedArtifact, TrainingReport)> {
        let start = Instant::now();
        if corpus.is_empty() {
            return Err(SentiscopeError::corpus("corpus is empty"));
        }

        let counts = corpus.class_counts();
        info!("Loaded {} examples", corpus.len());
        for sentiment in Sentiment::ALL {
            let count = counts[sentiment.index()];
            info!(
                "  {:<8} {:>6} ({:.1}%)",
                sentiment.display_name(),
                count,
                100.0 * count as f64 / corpus.len() as f64
            );
        }

        let (train, test) = corpus.stratified_split(self.config.test_size, self.config.seed)?;
        info!("Training set: {} examples", train.len());
        info!("Test set: {} examples", test.len());
        if train.distinct_classes() < 2 {
            return Err(SentiscopeError::training(
                "training split contains a single class",
            ));
        }

        let feature_space =
            TfidfVectorizer::new(self.config.vectorizer.clone())?.fit(&train.texts())?;
        info!("Feature space: {} terms", feature_space.dimension());

        let x_train = feature_space.transform(&train.texts())?;
        let search = GridSearch::new(self.config.grid_search.clone())?;
        let outcome = search.fit(&x_train, &train.labels())?;

        let evaluator = Evaluator::new(self.config.gate);
        let evaluation = evaluator.evaluate(&outcome.classifier, &feature_space, &test)?;
        evaluator.log_report(&evaluation);

        let metadata = ModelMetadata {
            created_at: chrono::Utc::now(),
            trainer_version: crate::VERSION.to_string(),
            best_c: outcome.best_c,
            cv_weighted_f1: outcome.best_score,
            test_accuracy: evaluation.metrics.accuracy,
            test_weighted_f1: evaluation.metrics.weighted_f1,
            training_examples: train.len(),
            gate_passed: evaluation.gate.passed(),
        };
        let vocabulary_size = feature_space.dimension();
        let artifact = TrainedArtifact::new(feature_space, outcome.classifier, metadata)?;

        let report = TrainingReport {
            total_examples: corpus.len(),
            class_counts: counts,
            train_examples: train.len(),
            test_examples: test.len(),
            vocabulary_size,
            candidates: outcome.candidates,
            best_c: outcome.best_c,
            cv_weighted_f1: outcome.best_score,
            diagnostics: outcome.diagnostics,
            evaluation,
            persisted: false,
            saved_to: Vec::new(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        info!("Training finished in {:.2}s", report.elapsed_secs);
        Ok((artifact, report))
    }
}
