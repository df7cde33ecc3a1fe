// src/utils.rs

//! Small numeric helpers shared by the booster and the explainer.

/// Smallest hessian allowed for log-loss style objectives.
pub(crate) const HESS_MIN: f64 = 1e-16;

/// Probabilities are clamped to `[PROB_EPS, 1 - PROB_EPS]` before taking logs.
pub(crate) const PROB_EPS: f64 = 1e-15;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// In-place softmax with the max-subtraction trick.
pub fn softmax_inplace(scores: &mut [f64]) {
    let max_val = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max_val).exp();
        sum += *s;
    }
    if sum > 0.0 {
        for s in scores.iter_mut() {
            *s /= sum;
        }
    }
}

/// L1 soft-thresholding of a gradient sum.
#[inline]
pub fn threshold_l1(grad_sum: f64, alpha: f64) -> f64 {
    if alpha <= 0.0 {
        return grad_sum;
    }
    let reduced = grad_sum.abs() - alpha;
    if reduced <= 0.0 {
        0.0
    } else {
        reduced.copysign(grad_sum)
    }
}

/// Regularized leaf objective `T(G)^2 / (H + lambda)`.
#[inline]
pub fn leaf_gain(grad_sum: f64, hess_sum: f64, alpha: f64, lambda: f64) -> f64 {
    let g = threshold_l1(grad_sum, alpha);
    let denom = hess_sum + lambda;
    if denom <= 0.0 {
        0.0
    } else {
        g * g / denom
    }
}

/// Newton step `-T(G) / (H + lambda)`.
#[inline]
pub fn leaf_output(grad_sum: f64, hess_sum: f64, alpha: f64, lambda: f64) -> f64 {
    let denom = hess_sum + lambda;
    if denom <= 0.0 {
        0.0
    } else {
        -threshold_l1(grad_sum, alpha) / denom
    }
}
