//! Cross-validated selection of the regularisation strength.

use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::feature::CsrMatrix;
use crate::metrics;
use crate::model::cross_validation::StratifiedKFold;
use crate::model::logistic::{FitDiagnostics, LinearClassifier, LogisticRegression};
use crate::sentiment::Sentiment;

/// Grid search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSearchConfig {
    /// Candidate values of C, evaluated in this order.
    pub c_grid: Vec<f64>,
    pub folds: usize,
    pub max_iter: usize,
    pub tol: f64,
    /// Worker threads; `None` uses one per CPU.
    pub n_jobs: Option<usize>,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        GridSearchConfig {
            c_grid: vec![0.1, 1.0, 10.0],
            folds: 3,
            max_iter: 200,
            tol: 1e-4,
            n_jobs: None,
        }
    }
}

impl GridSearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.c_grid.is_empty() {
            return Err(SentiscopeError::invalid_config("c_grid must not be empty"));
        }
        if let Some(c) = self.c_grid.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
            return Err(SentiscopeError::invalid_config(format!(
                "c_grid values must be positive, got {c}"
            )));
        }
        if self.folds < 2 {
            return Err(SentiscopeError::invalid_config("folds must be at least 2"));
        }
        if self.max_iter == 0 {
            return Err(SentiscopeError::invalid_config("max_iter must be positive"));
        }
        if self.n_jobs == Some(0) {
            return Err(SentiscopeError::invalid_config("n_jobs must be positive"));
        }
        Ok(())
    }
}

/// Cross-validation scores for one value of C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub c: f64,
    /// Weighted F1 on each held-out fold.
    pub fold_scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

/// The selected model and how it was chosen.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    pub best_c: f64,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
    /// Refitted on the full training data with `best_c`.
    pub classifier: LinearClassifier,
    pub diagnostics: FitDiagnostics,
}

/// Exhaustive search over [`GridSearchConfig::c_grid`].
#[derive(Debug, Clone)]
pub struct GridSearch {
    config: GridSearchConfig,
}

impl GridSearch {
    pub fn new(config: GridSearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(GridSearch { config })
    }

    pub fn config(&self) -> &GridSearchConfig {
        &self.config
    }

    /// Score every candidate by stratified cross-validation, keep the first
    /// candidate with the highest mean weighted F1 and refit it on all data.
    pub fn fit(&self, x: &CsrMatrix, y: &[Sentiment]) -> Result<GridSearchOutcome> {
        if x.n_rows() != y.len() {
            return Err(SentiscopeError::training(format!(
                "{} rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }

        let folds = StratifiedKFold::new(self.config.folds)?.split(y)?;
        let jobs: Vec<(usize, usize)> = (0..self.config.c_grid.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let threads = self.config.n_jobs.unwrap_or_else(num_cpus::get).min(jobs.len());
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("grid-search-{i}"))
            .build()
            .map_err(|e| SentiscopeError::training(format!("Failed to create thread pool: {e}")))?;

        info!(
            "Grid search over C={:?} with {}-fold CV ({} fits on {} threads)",
            self.config.c_grid,
            folds.len(),
            jobs.len(),
            threads
        );

        let scores: Vec<f64> = pool.install(|| {
            jobs.par_iter()
                .map(|&(c_idx, f_idx)| {
                    let fold = &folds[f_idx];
                    let train_y: Vec<Sentiment> = fold.train.iter().map(|&i| y[i]).collect();
                    let test_y: Vec<Sentiment> = fold.test.iter().map(|&i| y[i]).collect();

                    let (model, _) = self
                        .estimator(self.config.c_grid[c_idx])
                        .fit(&x.select_rows(&fold.train), &train_y)?;
                    let predicted = model.predict(&x.select_rows(&fold.test))?;
                    metrics::weighted_f1(&test_y, &predicted)
                })
                .collect::<Result<Vec<f64>>>()
        })?;

        let candidates: Vec<CandidateScore> = self
            .config
            .c_grid
            .iter()
            .zip(scores.chunks(folds.len()))
            .map(|(&c, fold_scores)| {
                let (mean, std) = mean_std(fold_scores);
                CandidateScore {
                    c,
                    fold_scores: fold_scores.to_vec(),
                    mean,
                    std,
                }
            })
            .collect();

        for candidate in &candidates {
            info!(
                "  C={:<6} mean F1={:.4} (+/- {:.4})",
                candidate.c, candidate.mean, candidate.std
            );
        }

        let mut best = 0;
        for (i, candidate) in candidates.iter().enumerate().skip(1) {
            if candidate.mean > candidates[best].mean {
                best = i;
            }
        }
        let best_c = candidates[best].c;
        let best_score = candidates[best].mean;
        info!("Best C={best_c} with CV weighted F1={best_score:.4}");

        let (classifier, diagnostics) = pool.install(|| self.estimator(best_c).fit(x, y))?;

        Ok(GridSearchOutcome {
            best_c,
            best_score,
            candidates,
            classifier,
            diagnostics,
        })
    }

    fn estimator(&self, c: f64) -> LogisticRegression {
        LogisticRegression::new(c)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol)
    }
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
