// src/lib.rs

//! `error_shap` explains where a model makes its mistakes.
//!
//! A gradient boosted tree surrogate is fitted to the model's error signal, the surrogate
//! is explained with exact TreeSHAP, and the attributions are reduced to a global
//! importance score per input feature. See [`compute_global_importance`].

pub mod algorithms;
pub mod core;
pub mod gbm;
pub mod importance;
pub mod traits;
pub mod utils;

pub use crate::algorithms::{TreeExplainer, TreeShapConfig};
pub use crate::core::{ClassAxis, Dataset, Explanation, Instance, ModelTask, Result, ShapError};
pub use crate::gbm::{Booster, GbmClassifier, GbmConfig, GbmRegressor};
pub use crate::importance::{
    compute_global_importance, compute_global_importance_with, mean_abs_importance, normalize_attributions,
    ImportanceConfig,
};
pub use crate::traits::{PredictModel, TreeModel};
