//! Sentiment classifier training.
//!
//! A multinomial logistic regression fitted with L-BFGS, plus the
//! cross-validated grid search that picks its regularisation strength.

pub mod cross_validation;
pub mod grid_search;
pub mod lbfgs;
pub mod logistic;

pub use cross_validation::{Fold, StratifiedKFold};
pub use grid_search::{CandidateScore, GridSearch, GridSearchConfig, GridSearchOutcome};
pub use logistic::{FitDiagnostics, LinearClassifier, LogisticRegression, Prediction};
