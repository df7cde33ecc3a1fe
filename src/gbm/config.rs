// src/gbm/config.rs
use crate::core::{Result, ShapError};

/// Hyper-parameters of the gradient boosted surrogate.
///
/// Defaults follow LightGBM's scikit-learn estimators, so a default-configured
/// surrogate behaves like `LGBMRegressor()` / `LGBMClassifier()`.
#[derive(Debug, Clone)]
pub struct GbmConfig {
    /// Number of boosting rounds.
    pub n_estimators: usize,
    /// Shrinkage applied to every leaf output.
    pub learning_rate: f64,
    /// Maximum number of leaves per tree. Trees grow leaf-wise.
    pub num_leaves: usize,
    /// Maximum depth per tree. `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Minimum number of rows in a leaf.
    pub min_child_samples: usize,
    /// Minimum hessian sum in a leaf.
    pub min_child_weight: f64,
    /// Minimum gain required to split a leaf.
    pub min_split_gain: f64,
    /// L1 regularization on leaf outputs.
    pub reg_alpha: f64,
    /// L2 regularization on leaf outputs.
    pub reg_lambda: f64,
    /// Fraction of rows used per bagging round.
    pub subsample: f64,
    /// Re-draw the bag every `subsample_freq` rounds. 0 disables bagging.
    pub subsample_freq: usize,
    /// Fraction of features sampled per tree.
    pub colsample_bytree: f64,
    pub seed: u64,
    /// Categorical features with at most this many categories use one-vs-rest splits.
    pub max_cat_to_onehot: usize,
    /// Maximum number of categories on the left side of a many-vs-many split.
    pub max_cat_threshold: usize,
    /// Smoothing added to the hessian when ordering categories. Categories with
    /// fewer rows than this are not considered for the left side.
    pub cat_smooth: f64,
    /// Extra L2 regularization for many-vs-many categorical splits.
    pub cat_l2: f64,
    /// Minimum rows per category group in many-vs-many splits.
    pub min_data_per_group: usize,
}

impl Default for GbmConfig {
    fn default() -> Self {
        GbmConfig {
            n_estimators: 100,
            learning_rate: 0.1,
            num_leaves: 31,
            max_depth: None,
            min_child_samples: 20,
            min_child_weight: 1e-3,
            min_split_gain: 0.0,
            reg_alpha: 0.0,
            reg_lambda: 0.0,
            subsample: 1.0,
            subsample_freq: 0,
            colsample_bytree: 1.0,
            seed: 0,
            max_cat_to_onehot: 4,
            max_cat_threshold: 32,
            cat_smooth: 10.0,
            cat_l2: 10.0,
            min_data_per_group: 100,
        }
    }
}

impl GbmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ShapError::InvalidConfig("n_estimators must be > 0".to_string()));
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(ShapError::InvalidConfig("learning_rate must be a positive number".to_string()));
        }
        if self.num_leaves < 2 {
            return Err(ShapError::InvalidConfig("num_leaves must be >= 2".to_string()));
        }
        if self.max_depth == Some(0) {
            return Err(ShapError::InvalidConfig("max_depth must be > 0 when set".to_string()));
        }
        if self.min_child_samples == 0 {
            return Err(ShapError::InvalidConfig("min_child_samples must be > 0".to_string()));
        }
        for (name, value) in [
            ("min_child_weight", self.min_child_weight),
            ("min_split_gain", self.min_split_gain),
            ("reg_alpha", self.reg_alpha),
            ("reg_lambda", self.reg_lambda),
            ("cat_smooth", self.cat_smooth),
            ("cat_l2", self.cat_l2),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ShapError::InvalidConfig(format!("{} must be a finite value >= 0", name)));
            }
        }
        for (name, value) in [("subsample", self.subsample), ("colsample_bytree", self.colsample_bytree)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ShapError::InvalidConfig(format!("{} must be in (0, 1]", name)));
            }
        }
        if self.max_cat_to_onehot == 0 || self.max_cat_threshold == 0 {
            return Err(ShapError::InvalidConfig(
                "max_cat_to_onehot and max_cat_threshold must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether rows are re-sampled during training.
    pub fn uses_bagging(&self) -> bool {
        self.subsample < 1.0 && self.subsample_freq > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GbmConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.uses_bagging());
        assert_eq!(config.num_leaves, 31);
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            GbmConfig { n_estimators: 0, ..Default::default() },
            GbmConfig { learning_rate: 0.0, ..Default::default() },
            GbmConfig { learning_rate: f64::NAN, ..Default::default() },
            GbmConfig { num_leaves: 1, ..Default::default() },
            GbmConfig { max_depth: Some(0), ..Default::default() },
            GbmConfig { min_child_samples: 0, ..Default::default() },
            GbmConfig { reg_lambda: -1.0, ..Default::default() },
            GbmConfig { subsample: 0.0, ..Default::default() },
            GbmConfig { colsample_bytree: 1.5, ..Default::default() },
            GbmConfig { max_cat_threshold: 0, ..Default::default() },
        ];
        for config in cases.iter() {
            assert!(
                matches!(config.validate(), Err(ShapError::InvalidConfig(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn bagging_needs_fraction_and_frequency() {
        let config = GbmConfig { subsample: 0.8, subsample_freq: 1, ..Default::default() };
        assert!(config.uses_bagging());
        let config = GbmConfig { subsample: 0.8, ..Default::default() };
        assert!(!config.uses_bagging());
    }
}
