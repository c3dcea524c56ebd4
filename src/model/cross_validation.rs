//! Stratified k-fold splitting.
//!
//! Folds are built without shuffling. Labels are ordered by class and dealt
//! round-robin into folds, which fixes how many members of each class every
//! fold receives; the members of a class then fill the folds in their
//! original order as contiguous blocks.

use log::warn;

use crate::error::{Result, SentiscopeError};
use crate::sentiment::Sentiment;

/// One train/test partition of example indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Deterministic stratified k-fold splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(SentiscopeError::training(format!(
                "cross-validation needs at least 2 folds, got {n_splits}"
            )));
        }
        Ok(StratifiedKFold { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Split `labels` into `n_splits` folds.
    pub fn split(&self, labels: &[Sentiment]) -> Result<Vec<Fold>> {
        let k = self.n_splits;
        let n = labels.len();
        if n < k {
            return Err(SentiscopeError::training(format!(
                "cannot make {k} folds from {n} examples"
            )));
        }

        let mut counts = [0usize; 3];
        for label in labels {
            counts[label.index()] += 1;
        }
        let largest = counts.iter().copied().max().unwrap_or(0);
        if largest < k {
            return Err(SentiscopeError::training(format!(
                "{k} folds requested but no class has that many members"
            )));
        }
        if let Some(sentiment) = Sentiment::ALL
            .iter()
            .find(|s| counts[s.index()] > 0 && counts[s.index()] < k)
        {
            warn!(
                "class {} has only {} members, fewer than {k} folds",
                sentiment.display_name(),
                counts[sentiment.index()]
            );
        }

        // allocation[fold][class]: members of `class` assigned to `fold`.
        let mut sorted = labels.to_vec();
        sorted.sort();
        let mut allocation = vec![[0usize; 3]; k];
        for (position, label) in sorted.iter().enumerate() {
            allocation[position % k][label.index()] += 1;
        }

        let mut fold_of = vec![0usize; n];
        let mut next_slot = [0usize; 3];
        let mut fold_cursor = [0usize; 3];
        for (i, label) in labels.iter().enumerate() {
            let class = label.index();
            while next_slot[class] >= allocation[fold_cursor[class]][class] {
                next_slot[class] = 0;
                fold_cursor[class] += 1;
            }
            fold_of[i] = fold_cursor[class];
            next_slot[class] += 1;
        }

        Ok((0..k)
            .map(|fold| {
                let (test, train) = (0..n).partition(|&i| fold_of[i] == fold);
                Fold { train, test }
            })
            .collect())
    }
}
