// src/gbm/model.rs
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;

use super::config::GbmConfig;
use super::grower::TreeGrower;
use super::objective::Objective;
use super::tree::Tree;
use crate::core::{Result, ShapError};
use crate::traits::{PredictModel, TreeModel};

/// A fitted additive tree ensemble.
#[derive(Debug, Clone)]
pub struct Booster {
    objective: Objective,
    trees: Vec<Tree>,
    tree_outputs: Vec<usize>,
    init_scores: Vec<f64>,
    n_features: usize,
    categorical: Vec<bool>,
}

impl Booster {
    /// Trains a booster. `target` holds regression values or encoded class indices.
    pub fn train(
        features: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
        objective: Objective,
        categorical_feature: &[usize],
        config: &GbmConfig,
    ) -> Result<Self> {
        config.validate()?;
        let categorical = validate_training_data(features, target, categorical_feature)?;
        let (n_rows, n_features) = features.dim();
        let n_outputs = objective.n_outputs();

        info!(
            "Training {} booster: {} rows, {} features ({} categorical), up to {} rounds",
            objective.name(),
            n_rows,
            n_features,
            categorical.iter().filter(|&&c| c).count(),
            config.n_estimators
        );

        let init_scores = objective.init_scores(target);
        let mut raw = Array2::from_shape_fn((n_rows, n_outputs), |(_, k)| init_scores[k]);
        let mut grad = Array2::<f64>::zeros((n_rows, n_outputs));
        let mut hess = Array2::<f64>::zeros((n_rows, n_outputs));

        let mut rng = StdRng::seed_from_u64(config.seed);
        let all_features: Vec<usize> = (0..n_features).collect();
        let n_tree_features = ((n_features as f64 * config.colsample_bytree).round() as usize).clamp(1, n_features);
        let bag_size = ((n_rows as f64 * config.subsample).round() as usize).clamp(1, n_rows);
        let mut bag: Vec<usize> = (0..n_rows).collect();

        let grower = TreeGrower::new(features.view(), categorical.clone(), config);
        let mut trees = Vec::with_capacity(config.n_estimators * n_outputs);
        let mut tree_outputs = Vec::with_capacity(config.n_estimators * n_outputs);

        for round in 0..config.n_estimators {
            objective.gradients(target, raw.view(), grad.view_mut(), hess.view_mut());

            if config.uses_bagging() && round % config.subsample_freq == 0 {
                bag = index::sample(&mut rng, n_rows, bag_size).into_vec();
                bag.sort_unstable();
            }

            let mut round_trees = Vec::with_capacity(n_outputs);
            for output in 0..n_outputs {
                let tree_features: Vec<usize> = if n_tree_features < n_features {
                    let mut chosen: Vec<usize> = all_features
                        .choose_multiple(&mut rng, n_tree_features)
                        .cloned()
                        .collect();
                    chosen.sort_unstable();
                    chosen
                } else {
                    all_features.clone()
                };
                let tree = grower.grow(grad.column(output), hess.column(output), &bag, &tree_features);
                round_trees.push(tree);
            }

            if round_trees.iter().all(|t| t.n_leaves() <= 1) {
                info!(
                    "Stopped after {} rounds: no leaf meets the split requirements",
                    round
                );
                break;
            }

            for (output, tree) in round_trees.into_iter().enumerate() {
                for (i, row) in features.axis_iter(Axis(0)).enumerate() {
                    raw[[i, output]] += tree.predict_row(row);
                }
                debug!(
                    "Round {} output {}: {} leaves, depth {}",
                    round + 1,
                    output,
                    tree.n_leaves(),
                    tree.max_depth()
                );
                trees.push(tree);
                tree_outputs.push(output);
            }
        }

        info!("Training completed with {} trees", trees.len());

        Ok(Booster {
            objective,
            trees,
            tree_outputs,
            init_scores,
            n_features,
            categorical,
        })
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Column indexes treated as categorical during training.
    pub fn categorical_features(&self) -> Vec<usize> {
        self.categorical
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| if c { Some(i) } else { None })
            .collect()
    }
}

impl TreeModel for Booster {
    fn trees(&self) -> &[Tree] {
        &self.trees
    }

    fn tree_outputs(&self) -> &[usize] {
        &self.tree_outputs
    }

    fn n_outputs(&self) -> usize {
        self.objective.n_outputs()
    }

    fn init_scores(&self) -> &[f64] {
        &self.init_scores
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

fn validate_training_data(
    features: ArrayView2<'_, f64>,
    target: ArrayView1<'_, f64>,
    categorical_feature: &[usize],
) -> Result<Vec<bool>> {
    let (n_rows, n_features) = features.dim();
    if n_rows == 0 {
        return Err(ShapError::InvalidInput("Training data cannot be empty.".to_string()));
    }
    if n_features == 0 {
        return Err(ShapError::InvalidInput("Training data has no features.".to_string()));
    }
    if target.len() != n_rows {
        return Err(ShapError::IncompatibleDimensions(format!(
            "Training data has {} rows, but target has {} values.",
            n_rows,
            target.len()
        )));
    }
    if let Some(i) = target.iter().position(|v| !v.is_finite()) {
        return Err(ShapError::InvalidInput(format!(
            "Target value at row {} is not finite: {}",
            i, target[i]
        )));
    }

    let mut categorical = vec![false; n_features];
    for &index in categorical_feature {
        if index >= n_features {
            return Err(ShapError::InvalidCategorical(format!(
                "Categorical index {} is out of range for {} features.",
                index, n_features
            )));
        }
        if let Some(bad) = features
            .column(index)
            .iter()
            .find(|&&v| !v.is_nan() && v > i32::MAX as f64)
        {
            return Err(ShapError::InvalidCategorical(format!(
                "Categorical feature {} has value {} which exceeds the largest category {}.",
                index,
                bad,
                i32::MAX
            )));
        }
        categorical[index] = true;
    }
    Ok(categorical)
}

/// Gradient boosted regressor trained on squared error.
#[derive(Debug, Clone, Default)]
pub struct GbmRegressor {
    config: GbmConfig,
    booster: Option<Booster>,
}

impl GbmRegressor {
    pub fn new(config: GbmConfig) -> Self {
        GbmRegressor { config, booster: None }
    }

    pub fn config(&self) -> &GbmConfig {
        &self.config
    }

    /// Fits the model, treating the columns in `categorical_feature` as categorical.
    pub fn fit(
        &mut self,
        features: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
        categorical_feature: &[usize],
    ) -> Result<()> {
        let booster = Booster::train(features, target, Objective::Regression, categorical_feature, &self.config)?;
        self.booster = Some(booster);
        Ok(())
    }

    pub fn booster(&self) -> Result<&Booster> {
        self.booster
            .as_ref()
            .ok_or_else(|| ShapError::NotFitted("GbmRegressor has not been fitted.".to_string()))
    }

    pub fn into_booster(self) -> Result<Booster> {
        self.booster
            .ok_or_else(|| ShapError::NotFitted("GbmRegressor has not been fitted.".to_string()))
    }
}

impl PredictModel for GbmRegressor {
    fn predict(&self, instances: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let raw = self.booster()?.predict_raw(instances)?;
        Ok(raw.column(0).to_owned())
    }

    fn num_features(&self) -> usize {
        self.booster.as_ref().map_or(0, |b| b.n_features)
    }
}

/// Gradient boosted classifier. Labels may be any finite values; they are encoded by
/// their sorted order. Two classes train a single log-odds output, more classes train
/// one softmax output per class.
#[derive(Debug, Clone, Default)]
pub struct GbmClassifier {
    config: GbmConfig,
    booster: Option<Booster>,
    classes: Vec<f64>,
}

impl GbmClassifier {
    pub fn new(config: GbmConfig) -> Self {
        GbmClassifier {
            config,
            booster: None,
            classes: Vec::new(),
        }
    }

    pub fn config(&self) -> &GbmConfig {
        &self.config
    }

    pub fn fit(
        &mut self,
        features: ArrayView2<'_, f64>,
        labels: ArrayView1<'_, f64>,
        categorical_feature: &[usize],
    ) -> Result<()> {
        if let Some(i) = labels.iter().position(|v| !v.is_finite()) {
            return Err(ShapError::InvalidInput(format!(
                "Label at row {} is not finite: {}",
                i, labels[i]
            )));
        }
        let mut classes: Vec<f64> = labels.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup_by(|a, b| a == b);

        let objective = match classes.len() {
            0 => {
                return Err(ShapError::InvalidInput("Training data cannot be empty.".to_string()));
            }
            1 => {
                warn!(
                    "Only one class ({}) present in the labels; the classifier cannot learn any split",
                    classes[0]
                );
                Objective::Binary
            }
            2 => Objective::Binary,
            n => Objective::Multiclass { n_classes: n },
        };

        let encoded = labels.mapv(|v| classes.partition_point(|&c| c < v) as f64);
        let booster = Booster::train(features, encoded.view(), objective, categorical_feature, &self.config)?;
        self.booster = Some(booster);
        self.classes = classes;
        Ok(())
    }

    /// Distinct label values in encoding order.
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn booster(&self) -> Result<&Booster> {
        self.booster
            .as_ref()
            .ok_or_else(|| ShapError::NotFitted("GbmClassifier has not been fitted.".to_string()))
    }

    pub fn into_booster(self) -> Result<Booster> {
        self.booster
            .ok_or_else(|| ShapError::NotFitted("GbmClassifier has not been fitted.".to_string()))
    }

    /// Class probabilities with shape `(samples, classes)`.
    pub fn predict_proba(&self, instances: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let booster = self.booster()?;
        let raw = booster.predict_raw(instances)?;
        if self.classes.len() == 1 {
            return Ok(Array2::ones((raw.nrows(), 1)));
        }
        Ok(booster.objective().transform(raw))
    }
}

impl PredictModel for GbmClassifier {
    /// Predicted label values (not encoded indices).
    fn predict(&self, instances: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(instances)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (k, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = k;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    fn num_features(&self) -> usize {
        self.booster.as_ref().map_or(0, |b| b.n_features)
    }
}
