//! Multinomial logistic regression with L2 regularisation.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};
use crate::feature::{CsrMatrix, SparseRow, SparseVector};
use crate::model::lbfgs::{self, LbfgsConfig};
use crate::sentiment::Sentiment;

/// Trainer settings. `c` is the inverse regularisation strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        LogisticRegression {
            c: 1.0,
            max_iter: 200,
            tol: 1e-4,
        }
    }
}

/// What happened during a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub c: f64,
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
    pub gradient_norm: f64,
    pub n_samples: usize,
    pub n_features: usize,
}

/// Class probabilities for one input, over all three sentiments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Sentiment,
    /// Probability of `label`.
    pub confidence: f64,
    /// Indexed by [`Sentiment::index`]; classes unseen in training get 0.
    pub probabilities: [f64; 3],
}

impl LogisticRegression {
    pub fn new(c: f64) -> Self {
        LogisticRegression {
            c,
            ..Self::default()
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit on the rows of `x` with labels `y`.
    pub fn fit(&self, x: &CsrMatrix, y: &[Sentiment]) -> Result<(LinearClassifier, FitDiagnostics)> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SentiscopeError::training(format!(
                "C must be a positive number, got {}",
                self.c
            )));
        }
        if x.n_rows() != y.len() {
            return Err(SentiscopeError::training(format!(
                "{} rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        if x.n_rows() == 0 {
            return Err(SentiscopeError::training("cannot fit on zero examples"));
        }

        let mut classes: Vec<Sentiment> = y.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(SentiscopeError::training(format!(
                "need at least 2 classes to fit, found {}",
                classes.len()
            )));
        }

        // Position of each label within `classes`.
        let targets: Vec<usize> = y
            .iter()
            .map(|label| classes.iter().position(|c| c == label).unwrap_or(0))
            .collect();

        let n_classes = classes.len();
        let n_features = x.n_cols();
        let n = x.n_rows() as f64;
        let coef_len = n_classes * n_features;
        let alpha = 1.0 / (self.c * n);

        let objective = |params: &[f64], grad: &mut [f64]| -> f64 {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let (coef, intercept) = params.split_at(coef_len);
            let (grad_coef, grad_intercept) = grad.split_at_mut(coef_len);

            let mut loss = 0.0;
            let mut probs = vec![0.0; n_classes];
            for (i, row) in x.rows().enumerate() {
                scores_into(&row, coef, intercept, n_features, &mut probs);
                let lse = softmax_in_place(&mut probs);
                let target = targets[i];
                loss += lse - logit(&row, coef, intercept, n_features, target);

                for (k, &p) in probs.iter().enumerate() {
                    let residual = (p - if k == target { 1.0 } else { 0.0 }) / n;
                    let base = k * n_features;
                    for (&j, &v) in row.indices.iter().zip(row.values) {
                        grad_coef[base + j] += residual * v;
                    }
                    grad_intercept[k] += residual;
                }
            }
            loss /= n;

            let mut penalty = 0.0;
            for (g, &w) in grad_coef.iter_mut().zip(coef) {
                penalty += w * w;
                *g += alpha * w;
            }
            loss + 0.5 * alpha * penalty
        };

        let config = LbfgsConfig {
            max_iter: self.max_iter,
            tol: self.tol,
            ..LbfgsConfig::default()
        };
        let result = lbfgs::minimize(objective, vec![0.0; coef_len + n_classes], &config)?;

        if result.converged {
            debug!(
                "C={} converged after {} iterations (loss {:.6})",
                self.c, result.iterations, result.value
            );
        } else {
            warn!(
                "C={} did not converge within {} iterations (gradient {:.3e})",
                self.c, self.max_iter, result.gradient_norm
            );
        }

        let diagnostics = FitDiagnostics {
            c: self.c,
            iterations: result.iterations,
            converged: result.converged,
            final_loss: result.value,
            gradient_norm: result.gradient_norm,
            n_samples: x.n_rows(),
            n_features,
        };

        let mut params = result.x;
        let intercept = params.split_off(coef_len);
        let classifier = LinearClassifier {
            classes,
            n_features,
            coef: params,
            intercept,
        };
        Ok((classifier, diagnostics))
    }
}

/// A fitted linear model over a fixed feature space.
///
/// `coef` is row-major, one row of `n_features` weights per entry of
/// `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    classes: Vec<Sentiment>,
    n_features: usize,
    coef: Vec<f64>,
    intercept: Vec<f64>,
}

impl LinearClassifier {
    pub fn classes(&self) -> &[Sentiment] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Weights for the class at position `k` of [`classes`](Self::classes).
    pub fn coefficients(&self, k: usize) -> &[f64] {
        &self.coef[k * self.n_features..(k + 1) * self.n_features]
    }

    /// Check internal consistency, e.g. after deserialisation.
    pub fn validate(&self) -> Result<()> {
        let k = self.classes.len();
        if k < 2 {
            return Err(SentiscopeError::artifact(format!(
                "classifier has {k} classes, expected at least 2"
            )));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SentiscopeError::artifact("classifier classes are not sorted"));
        }
        if self.coef.len() != k * self.n_features || self.intercept.len() != k {
            return Err(SentiscopeError::artifact(format!(
                "classifier weights do not match {} classes x {} features",
                k, self.n_features
            )));
        }
        if self.coef.iter().chain(&self.intercept).any(|w| !w.is_finite()) {
            return Err(SentiscopeError::artifact("classifier weights are not finite"));
        }
        Ok(())
    }

    /// Probabilities over [`classes`](Self::classes) for one row.
    pub fn predict_proba_row(&self, row: &SparseRow<'_>) -> Vec<f64> {
        let mut probs = vec![0.0; self.classes.len()];
        scores_into(row, &self.coef, &self.intercept, self.n_features, &mut probs);
        softmax_in_place(&mut probs);
        probs
    }

    /// Probabilities for every row of `x`.
    pub fn predict_proba(&self, x: &CsrMatrix) -> Result<Vec<Vec<f64>>> {
        self.check_width(x.n_cols())?;
        Ok(x.rows().map(|row| self.predict_proba_row(&row)).collect())
    }

    /// Most probable class for every row of `x`. Ties go to the lower class.
    pub fn predict(&self, x: &CsrMatrix) -> Result<Vec<Sentiment>> {
        self.check_width(x.n_cols())?;
        Ok(x
            .rows()
            .map(|row| self.classes[argmax(&self.predict_proba_row(&row))])
            .collect())
    }

    /// Full prediction for a single feature vector.
    pub fn predict_one(&self, features: &SparseVector) -> Result<Prediction> {
        self.check_width(features.dim())?;
        let probs = self.predict_proba_row(&features.as_row());
        let best = argmax(&probs);

        let mut probabilities = [0.0; 3];
        for (class, p) in self.classes.iter().zip(&probs) {
            probabilities[class.index()] = *p;
        }
        Ok(Prediction {
            label: self.classes[best],
            confidence: probs[best],
            probabilities,
        })
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.n_features {
            return Err(SentiscopeError::prediction(format!(
                "feature width {width} does not match model width {}",
                self.n_features
            )));
        }
        Ok(())
    }
}

fn scores_into(
    row: &SparseRow<'_>,
    coef: &[f64],
    intercept: &[f64],
    n_features: usize,
    out: &mut [f64],
) {
    for (k, score) in out.iter_mut().enumerate() {
        *score = logit(row, coef, intercept, n_features, k);
    }
}

#[inline]
fn logit(row: &SparseRow<'_>, coef: &[f64], intercept: &[f64], n_features: usize, k: usize) -> f64 {
    row.dot(&coef[k * n_features..(k + 1) * n_features]) + intercept[k]
}

/// Replace scores with softmax probabilities; returns log-sum-exp of the scores.
fn softmax_in_place(values: &mut [f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
    max + sum.ln()
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feature 0 marks positive, 1 negative, 2 neutral.
    fn toy_data() -> (CsrMatrix, Vec<Sentiment>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let (feature, label) = match i % 3 {
                0 => (0, Sentiment::Positive),
                1 => (1, Sentiment::Negative),
                _ => (2, Sentiment::Neutral),
            };
            rows.push(SparseVector::from_pairs(4, vec![(feature, 1.0), (3, 0.5)]).unwrap());
            labels.push(label);
        }
        (CsrMatrix::from_rows(4, &rows).unwrap(), labels)
    }

    #[test]
    fn test_fit_separable() {
        let (x, y) = toy_data();
        let (model, diagnostics) = LogisticRegression::new(10.0).fit(&x, &y).unwrap();

        assert_eq!(
            model.classes(),
            &[Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive]
        );
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(diagnostics.iterations > 0);
        assert!(diagnostics.final_loss < 0.5);
        model.validate().unwrap();
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = toy_data();
        let (model, _) = LogisticRegression::new(1.0).fit(&x, &y).unwrap();

        for probs in model.predict_proba(&x).unwrap() {
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }

        let v = SparseVector::from_pairs(4, vec![(0, 1.0)]).unwrap();
        let prediction = model.predict_one(&v).unwrap();
        assert_eq!(prediction.label, Sentiment::Positive);
        assert!(prediction.confidence > 1.0 / 3.0);
        assert!((prediction.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stronger_regularisation_shrinks_weights() {
        let (x, y) = toy_data();
        let (loose, _) = LogisticRegression::new(10.0).fit(&x, &y).unwrap();
        let (tight, _) = LogisticRegression::new(0.1).fit(&x, &y).unwrap();

        let norm = |m: &LinearClassifier| -> f64 {
            (0..m.classes().len())
                .flat_map(|k| m.coefficients(k).to_vec())
                .map(|w| w * w)
                .sum()
        };
        assert!(norm(&tight) < norm(&loose));
    }

    #[test]
    fn test_two_classes_fill_missing_probability() {
        let rows = vec![
            SparseVector::from_pairs(2, vec![(0, 1.0)]).unwrap(),
            SparseVector::from_pairs(2, vec![(1, 1.0)]).unwrap(),
        ];
        let x = CsrMatrix::from_rows(2, &rows).unwrap();
        let y = vec![Sentiment::Positive, Sentiment::Negative];
        let (model, _) = LogisticRegression::new(1.0).fit(&x, &y).unwrap();

        let prediction = model.predict_one(&rows[0]).unwrap();
        assert_eq!(prediction.label, Sentiment::Positive);
        assert_eq!(prediction.probabilities[Sentiment::Neutral.index()], 0.0);
    }

    #[test]
    fn test_fit_errors() {
        let (x, y) = toy_data();
        assert!(LogisticRegression::new(0.0).fit(&x, &y).is_err());
        assert!(LogisticRegression::new(1.0).fit(&x, &y[..3]).is_err());

        let single = vec![Sentiment::Positive; x.n_rows()];
        let err = LogisticRegression::new(1.0).fit(&x, &single).unwrap_err();
        assert!(matches!(err, SentiscopeError::Training(_)));
    }

    #[test]
    fn test_width_mismatch() {
        let (x, y) = toy_data();
        let (model, _) = LogisticRegression::new(1.0).fit(&x, &y).unwrap();
        let wrong = SparseVector::zeros(7);
        assert!(model.predict_one(&wrong).is_err());
    }
}
