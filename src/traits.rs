// src/traits.rs
use ndarray::{Array1, Array2, ArrayView2};

use crate::core::{Result, ShapError};
use crate::gbm::Tree;

/// A fitted model that maps a feature matrix to one prediction per row.
pub trait PredictModel {
    /// Predict for every row of `instances` (`samples x features`).
    fn predict(&self, instances: ArrayView2<'_, f64>) -> Result<Array1<f64>>;

    /// Number of input features the model was fitted on.
    fn num_features(&self) -> usize;
}

/// What the tree explainer needs from an additive tree ensemble.
///
/// The raw prediction for output `k` is `init_scores()[k]` plus the leaf value of
/// every tree `t` with `tree_outputs()[t] == k`.
pub trait TreeModel: Sync {
    fn trees(&self) -> &[Tree];

    /// Output (class) index each tree contributes to, parallel to `trees()`.
    fn tree_outputs(&self) -> &[usize];

    fn n_outputs(&self) -> usize;

    /// Per-output constant added before any tree.
    fn init_scores(&self) -> &[f64];

    fn n_features(&self) -> usize;

    /// Raw margin predictions with shape `(samples, outputs)`.
    fn predict_raw(&self, instances: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if instances.ncols() != self.n_features() {
            return Err(ShapError::IncompatibleDimensions(format!(
                "Data has {} features, but model expects {}.",
                instances.ncols(),
                self.n_features()
            )));
        }
        let n_outputs = self.n_outputs();
        let mut out = Array2::<f64>::zeros((instances.nrows(), n_outputs));
        for (mut out_row, row) in out.rows_mut().into_iter().zip(instances.rows()) {
            for k in 0..n_outputs {
                out_row[k] = self.init_scores()[k];
            }
            for (tree, &output) in self.trees().iter().zip(self.tree_outputs()) {
                out_row[output] += tree.predict_row(row);
            }
        }
        Ok(out)
    }
}
