// src/importance.rs

//! Global error importance: which input features explain where a model goes wrong.
//!
//! A gradient boosted surrogate is fitted to predict the error signal (`diff`) from the
//! inputs, explained with TreeSHAP, and the attributions are reduced to one
//! mean-absolute value per input column.

use ndarray::{Array3, ArrayD, ArrayView1, ArrayView2, ArrayView3, Axis, Ix3};

use crate::algorithms::{TreeExplainer, TreeShapConfig};
use crate::core::{ClassAxis, ModelTask, Result, ShapError};
use crate::gbm::{Booster, GbmClassifier, GbmConfig, GbmRegressor};

/// Settings for the surrogate model and its explainer.
#[derive(Debug, Clone, Default)]
pub struct ImportanceConfig {
    pub gbm: GbmConfig,
    pub shap: TreeShapConfig,
}

/// Brings an attribution array into `(classes, samples, features)` layout.
///
/// A 2-D array is a single output, either a regression or a classifier whose class
/// axis was collapsed, and gets a leading class axis of size 1. A 3-D array is only
/// accepted for classification, with its class axis where `class_axis` says.
pub fn normalize_attributions(values: ArrayD<f64>, model_task: ModelTask, class_axis: ClassAxis) -> Result<Array3<f64>> {
    match (model_task, values.ndim()) {
        (_, 2) => Ok(values.insert_axis(Axis(0)).into_dimensionality::<Ix3>()?),
        (ModelTask::Classification, 3) => {
            let values = values.into_dimensionality::<Ix3>()?;
            Ok(match class_axis {
                ClassAxis::Leading => values,
                ClassAxis::Trailing => values.permuted_axes([2, 0, 1]),
            })
        }
        (task, ndim) => Err(ShapError::IncompatibleDimensions(format!(
            "Cannot reduce {}-dimensional attributions for a {} task.",
            ndim, task
        ))),
    }
}

/// Mean of `|v|` over samples, then over classes. Input is `(classes, samples, features)`.
pub fn mean_abs_importance(values: ArrayView3<'_, f64>) -> Result<Vec<f64>> {
    let magnitudes = values.mapv(f64::abs);
    let per_class = magnitudes
        .mean_axis(Axis(1))
        .ok_or_else(|| ShapError::InvalidInput("No samples to average attributions over.".to_string()))?;
    let per_feature = per_class
        .mean_axis(Axis(0))
        .ok_or_else(|| ShapError::InvalidInput("No classes to average attributions over.".to_string()))?;
    Ok(per_feature.to_vec())
}

/// Per-feature importance of `input_data` for explaining `diff`, with default settings.
///
/// Returns one non-negative value per column of `input_data`, in column order.
pub fn compute_global_importance(
    input_data: ArrayView2<'_, f64>,
    diff: ArrayView1<'_, f64>,
    model_task: ModelTask,
    categorical_indexes: &[usize],
) -> Result<Vec<f64>> {
    compute_global_importance_with(input_data, diff, model_task, categorical_indexes, &ImportanceConfig::default())
}

pub fn compute_global_importance_with(
    input_data: ArrayView2<'_, f64>,
    diff: ArrayView1<'_, f64>,
    model_task: ModelTask,
    categorical_indexes: &[usize],
    config: &ImportanceConfig,
) -> Result<Vec<f64>> {
    let surrogate = fit_surrogate(input_data, diff, model_task, categorical_indexes, &config.gbm)?;

    let explainer = TreeExplainer::new(&surrogate, Some(config.shap.clone()))?;
    let values = explainer.shap_values(input_data)?;

    let values = normalize_attributions(values, model_task, ClassAxis::Trailing)?;
    mean_abs_importance(values.view())
}

fn fit_surrogate(
    input_data: ArrayView2<'_, f64>,
    diff: ArrayView1<'_, f64>,
    model_task: ModelTask,
    categorical_indexes: &[usize],
    config: &GbmConfig,
) -> Result<Booster> {
    match model_task {
        ModelTask::Classification => {
            let mut model = GbmClassifier::new(config.clone());
            model.fit(input_data, diff, categorical_indexes)?;
            model.into_booster()
        }
        ModelTask::Regression => {
            let mut model = GbmRegressor::new(config.clone());
            model.fit(input_data, diff, categorical_indexes)?;
            model.into_booster()
        }
    }
}
