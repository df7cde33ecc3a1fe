// src/gbm/objective.rs

//! Training objectives: initial scores, first and second order gradients, and the
//! transform from raw margins to the prediction space.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut2, Axis};

use crate::utils::{sigmoid, softmax_inplace, HESS_MIN, PROB_EPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Squared error.
    Regression,
    /// Log-loss on labels in `{0, 1}`.
    Binary,
    /// Softmax cross-entropy on labels in `0..n_classes`.
    Multiclass { n_classes: usize },
}

impl Objective {
    /// Number of raw outputs, i.e. trees per boosting round.
    pub fn n_outputs(&self) -> usize {
        match self {
            Objective::Regression | Objective::Binary => 1,
            Objective::Multiclass { n_classes } => *n_classes,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Objective::Regression => "regression",
            Objective::Binary => "binary",
            Objective::Multiclass { .. } => "multiclass",
        }
    }

    /// Boost-from-average starting margins, one per output.
    ///
    /// `target` holds regression values or encoded class indices.
    pub fn init_scores(&self, target: ArrayView1<'_, f64>) -> Vec<f64> {
        let n = target.len().max(1) as f64;
        match self {
            Objective::Regression => vec![target.sum() / n],
            Objective::Binary => {
                let p = (target.sum() / n).clamp(PROB_EPS, 1.0 - PROB_EPS);
                vec![(p / (1.0 - p)).ln()]
            }
            Objective::Multiclass { n_classes } => {
                let mut counts = vec![0.0; *n_classes];
                for &y in target.iter() {
                    counts[y as usize] += 1.0;
                }
                counts.iter().map(|c| (c / n).max(PROB_EPS).ln()).collect()
            }
        }
    }

    /// Fills `grad` and `hess` (both `samples x outputs`) from the current raw margins.
    pub fn gradients(
        &self,
        target: ArrayView1<'_, f64>,
        raw: ArrayView2<'_, f64>,
        mut grad: ArrayViewMut2<'_, f64>,
        mut hess: ArrayViewMut2<'_, f64>,
    ) {
        match self {
            Objective::Regression => {
                for i in 0..target.len() {
                    grad[[i, 0]] = raw[[i, 0]] - target[i];
                    hess[[i, 0]] = 1.0;
                }
            }
            Objective::Binary => {
                for i in 0..target.len() {
                    let p = sigmoid(raw[[i, 0]]);
                    grad[[i, 0]] = p - target[i];
                    hess[[i, 0]] = (p * (1.0 - p)).max(HESS_MIN);
                }
            }
            Objective::Multiclass { n_classes } => {
                let k = *n_classes;
                let factor = k as f64 / (k as f64 - 1.0);
                let mut probs = vec![0.0; k];
                for i in 0..target.len() {
                    for (c, p) in probs.iter_mut().enumerate() {
                        *p = raw[[i, c]];
                    }
                    softmax_inplace(&mut probs);
                    let label = target[i] as usize;
                    for (c, &p) in probs.iter().enumerate() {
                        let indicator = if c == label { 1.0 } else { 0.0 };
                        grad[[i, c]] = p - indicator;
                        hess[[i, c]] = (factor * p * (1.0 - p)).max(HESS_MIN);
                    }
                }
            }
        }
    }

    /// Maps raw margins to predictions: identity for regression, class probabilities
    /// (`samples x classes`) for classification.
    pub fn transform(&self, raw: Array2<f64>) -> Array2<f64> {
        match self {
            Objective::Regression => raw,
            Objective::Binary => {
                let mut proba = Array2::<f64>::zeros((raw.nrows(), 2));
                for (i, &margin) in raw.column(0).iter().enumerate() {
                    let p = sigmoid(margin);
                    proba[[i, 0]] = 1.0 - p;
                    proba[[i, 1]] = p;
                }
                proba
            }
            Objective::Multiclass { .. } => {
                let mut proba = raw;
                let mut buf = vec![0.0; proba.ncols()];
                for mut row in proba.axis_iter_mut(Axis(0)) {
                    for (dst, &src) in buf.iter_mut().zip(row.iter()) {
                        *dst = src;
                    }
                    softmax_inplace(&mut buf);
                    for (dst, &src) in row.iter_mut().zip(buf.iter()) {
                        *dst = src;
                    }
                }
                proba
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn regression_gradients_are_residuals() {
        let target = array![1.0, 2.0, 6.0];
        let obj = Objective::Regression;
        let init = obj.init_scores(target.view());
        assert_abs_diff_eq!(init[0], 3.0);

        let raw = Array2::from_elem((3, 1), init[0]);
        let mut grad = Array2::zeros((3, 1));
        let mut hess = Array2::zeros((3, 1));
        obj.gradients(target.view(), raw.view(), grad.view_mut(), hess.view_mut());
        assert_eq!(grad.column(0).to_vec(), vec![2.0, 1.0, -3.0]);
        assert_eq!(hess.column(0).to_vec(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn binary_init_is_log_odds() {
        let target = array![0.0, 1.0, 1.0, 1.0];
        let init = Objective::Binary.init_scores(target.view());
        assert_abs_diff_eq!(init[0], 3.0f64.ln(), epsilon = 1e-12);

        let raw = array![[0.0], [0.0], [0.0], [0.0]];
        let mut grad = Array2::zeros((4, 1));
        let mut hess = Array2::zeros((4, 1));
        Objective::Binary.gradients(target.view(), raw.view(), grad.view_mut(), hess.view_mut());
        assert_abs_diff_eq!(grad[[0, 0]], 0.5);
        assert_abs_diff_eq!(grad[[1, 0]], -0.5);
        assert_abs_diff_eq!(hess[[2, 0]], 0.25);
    }

    #[test]
    fn single_class_binary_init_is_finite() {
        let target = array![0.0, 0.0, 0.0];
        let init = Objective::Binary.init_scores(target.view());
        assert!(init[0].is_finite() && init[0] < -30.0);
    }

    #[test]
    fn multiclass_gradients_sum_to_zero() {
        let obj = Objective::Multiclass { n_classes: 3 };
        let target = array![0.0, 1.0, 2.0, 2.0];
        let init = obj.init_scores(target.view());
        assert_abs_diff_eq!(init[2], 0.5f64.ln(), epsilon = 1e-12);

        let raw = array![[0.1, 0.2, 0.3], [1.0, -1.0, 0.0], [0.0, 0.0, 0.0], [2.0, 0.5, -0.5]];
        let mut grad = Array2::zeros((4, 3));
        let mut hess = Array2::zeros((4, 3));
        obj.gradients(target.view(), raw.view(), grad.view_mut(), hess.view_mut());
        for row in grad.rows() {
            assert_abs_diff_eq!(row.sum(), 0.0, epsilon = 1e-12);
        }
        assert!(hess.iter().all(|&h| h > 0.0));
    }

    #[test]
    fn transforms_produce_probabilities() {
        let proba = Objective::Binary.transform(array![[0.0], [100.0]]);
        assert_eq!(proba.dim(), (2, 2));
        assert_abs_diff_eq!(proba[[0, 1]], 0.5);
        assert_abs_diff_eq!(proba[[1, 1]], 1.0, epsilon = 1e-12);

        let proba = Objective::Multiclass { n_classes: 3 }.transform(array![[1.0, 1.0, 1.0]]);
        for &p in proba.iter() {
            assert_abs_diff_eq!(p, 1.0 / 3.0, epsilon = 1e-12);
        }
    }
}
