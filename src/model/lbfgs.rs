//! Limited-memory BFGS minimizer.
//!
//! Unconstrained minimisation of a smooth objective given as a closure that
//! writes the gradient into its second argument and returns the value.
//! Uses the two-loop recursion for the search direction and a backtracking
//! Armijo line search.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError};

/// Relative reduction below which the objective is considered flat.
const FTOL: f64 = 2.220446049250313e-9;
/// Sufficient decrease constant for the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LbfgsConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Stop once the largest absolute gradient entry is at most this.
    pub tol: f64,
    /// Number of correction pairs kept.
    pub memory: usize,
    /// Maximum number of step halvings per line search.
    pub max_line_search: usize,
}

impl Default for LbfgsConfig {
    fn default() -> Self {
        LbfgsConfig {
            max_iter: 200,
            tol: 1e-4,
            memory: 10,
            max_line_search: 40,
        }
    }
}

/// Outcome of a minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
    /// Largest absolute gradient entry at `x`.
    pub gradient_norm: f64,
}

/// Minimise `objective` starting from `x0`.
///
/// Hitting `max_iter` is not an error: the result carries
/// `converged = false` and the best point found.
pub fn minimize<F>(objective: F, x0: Vec<f64>, config: &LbfgsConfig) -> Result<OptimizeResult>
where
    F: Fn(&[f64], &mut [f64]) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(SentiscopeError::training("cannot optimise zero parameters"));
    }

    let mut x = x0;
    let mut grad = vec![0.0; n];
    let mut value = objective(&x, &mut grad);
    if !value.is_finite() {
        return Err(SentiscopeError::training(
            "objective is not finite at the starting point",
        ));
    }

    let mut history: VecDeque<(Vec<f64>, Vec<f64>, f64)> = VecDeque::with_capacity(config.memory);
    let mut x_new = vec![0.0; n];
    let mut grad_new = vec![0.0; n];
    let mut iterations = 0;
    let mut converged = max_abs(&grad) <= config.tol;

    while !converged && iterations < config.max_iter {
        iterations += 1;

        let mut direction = two_loop_direction(&grad, &history);
        let mut slope = dot(&grad, &direction);
        if slope >= 0.0 {
            // Curvature information went stale; restart from steepest descent.
            history.clear();
            direction = grad.iter().map(|g| -g).collect();
            slope = -dot(&grad, &grad);
        }

        let mut step = if history.is_empty() {
            (1.0 / dot(&grad, &grad).sqrt()).min(1.0)
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..config.max_line_search {
            for i in 0..n {
                x_new[i] = x[i] + step * direction[i];
            }
            let candidate = objective(&x_new, &mut grad_new);
            if candidate.is_finite() && candidate <= value + ARMIJO_C1 * step * slope {
                accepted = Some(candidate);
                break;
            }
            step *= 0.5;
        }

        let Some(new_value) = accepted else {
            debug!("line search failed after {iterations} iterations");
            break;
        };

        let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy > 1e-10 {
            if history.len() == config.memory {
                history.pop_front();
            }
            history.push_back((s, y, 1.0 / sy));
        }

        let reduction = (value - new_value) / value.abs().max(new_value.abs()).max(1.0);
        std::mem::swap(&mut x, &mut x_new);
        std::mem::swap(&mut grad, &mut grad_new);
        value = new_value;

        if max_abs(&grad) <= config.tol || reduction <= FTOL {
            converged = true;
        }
    }

    Ok(OptimizeResult {
        gradient_norm: max_abs(&grad),
        x,
        value,
        iterations,
        converged,
    })
}

/// `-H * grad` from the stored correction pairs.
fn two_loop_direction(grad: &[f64], history: &VecDeque<(Vec<f64>, Vec<f64>, f64)>) -> Vec<f64> {
    let mut q: Vec<f64> = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());

    for (s, y, rho) in history.iter().rev() {
        let alpha = rho * dot(s, &q);
        for (qi, yi) in q.iter_mut().zip(y) {
            *qi -= alpha * yi;
        }
        alphas.push(alpha);
    }

    if let Some((s, y, _)) = history.back() {
        let gamma = dot(s, y) / dot(y, y);
        for qi in &mut q {
            *qi *= gamma;
        }
    }

    for ((s, y, rho), alpha) in history.iter().zip(alphas.into_iter().rev()) {
        let beta = rho * dot(y, &q);
        for (qi, si) in q.iter_mut().zip(s) {
            *qi += (alpha - beta) * si;
        }
    }

    for qi in &mut q {
        *qi = -*qi;
    }
    q
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}
