// src/algorithms/tree_shap.rs

//! Path-dependent TreeSHAP (Lundberg et al., "From local explanations to global
//! understanding with explainable AI for trees", 2020).
//!
//! For every sample the algorithm walks each tree once, tracking for the features on
//! the current path the proportion of all feature subsets that would reach the node.
//! Branches the sample does not take are weighted by their training cover, so the
//! values are exact Shapley values of the cover-conditional expectation of the model.

use log::debug;
use ndarray::{Array1, Array3, ArrayD, ArrayView1, ArrayView2, Axis};

use crate::core::{Explanation, Result, ShapError};
use crate::gbm::{Node, Tree};
use crate::traits::TreeModel;

/// Configuration for the tree explainer.
#[derive(Debug, Clone)]
pub struct TreeShapConfig {
    /// Verify that attributions plus the expected value reproduce the raw prediction.
    pub check_additivity: bool,
    /// Allowed absolute error, scaled by `1 + |prediction|`.
    pub additivity_tolerance: f64,
}

impl Default for TreeShapConfig {
    fn default() -> Self {
        TreeShapConfig {
            check_additivity: true,
            additivity_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

/// Extends the path by one feature, updating the subset-size weights.
fn extend_path(path: &mut [PathElement], unique_depth: usize, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    path[unique_depth] = PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    };
    let depth_plus_one = (unique_depth + 1) as f64;
    for i in (0..unique_depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / depth_plus_one;
        path[i].pweight = zero_fraction * path[i].pweight * (unique_depth - i) as f64 / depth_plus_one;
    }
}

/// Undoes the extension at `path_index`.
fn unwind_path(path: &mut [PathElement], unique_depth: usize, path_index: usize) {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let depth_plus_one = (unique_depth + 1) as f64;
    let mut next_one_portion = path[unique_depth].pweight;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * depth_plus_one / ((i + 1) as f64 * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (unique_depth - i) as f64 / depth_plus_one;
        } else {
            path[i].pweight = path[i].pweight * depth_plus_one / (zero_fraction * (unique_depth - i) as f64);
        }
    }

    for i in path_index..unique_depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight the path would have if `path_index` were unwound.
fn unwound_path_sum(path: &[PathElement], unique_depth: usize, path_index: usize) -> f64 {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0;

    if one_fraction != 0.0 {
        for i in (0..unique_depth).rev() {
            let tmp = next_one_portion / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * (unique_depth - i) as f64;
        }
    } else {
        for i in (0..unique_depth).rev() {
            total += path[i].pweight / (zero_fraction * (unique_depth - i) as f64);
        }
    }
    total * (unique_depth + 1) as f64
}

/// Exact SHAP values for additive tree ensembles.
#[derive(Debug)]
pub struct TreeExplainer<'a, M: TreeModel> {
    model: &'a M,
    expected_values: Vec<f64>,
    max_depth: usize,
    config: TreeShapConfig,
}

impl<'a, M: TreeModel> TreeExplainer<'a, M> {
    pub fn new(model: &'a M, config: Option<TreeShapConfig>) -> Result<Self> {
        let n_outputs = model.n_outputs();
        if n_outputs == 0 {
            return Err(ShapError::InvalidInput("Model has no outputs to explain.".to_string()));
        }
        if model.init_scores().len() != n_outputs {
            return Err(ShapError::IncompatibleDimensions(format!(
                "Model has {} outputs but {} init scores.",
                n_outputs,
                model.init_scores().len()
            )));
        }
        if model.trees().len() != model.tree_outputs().len() {
            return Err(ShapError::IncompatibleDimensions(format!(
                "Model has {} trees but {} tree output assignments.",
                model.trees().len(),
                model.tree_outputs().len()
            )));
        }

        let mut expected_values = model.init_scores().to_vec();
        let mut max_depth = 0;
        for (t, (tree, &output)) in model.trees().iter().zip(model.tree_outputs()).enumerate() {
            if output >= n_outputs {
                return Err(ShapError::InvalidInput(format!(
                    "Tree {} contributes to output {}, but the model has {} outputs.",
                    t, output, n_outputs
                )));
            }
            let bad_cover = tree.nodes().iter().any(|n| matches!(n, Node::Split { cover, .. } if *cover <= 0.0));
            if bad_cover {
                return Err(ShapError::InvalidInput(format!(
                    "Tree {} has a split node without cover; TreeSHAP needs training covers.",
                    t
                )));
            }
            expected_values[output] += tree.expected_value();
            max_depth = max_depth.max(tree.max_depth());
        }

        Ok(TreeExplainer {
            model,
            expected_values,
            max_depth,
            config: config.unwrap_or_default(),
        })
    }

    /// E[f(x)] per output, in raw margin space.
    pub fn expected_value(&self) -> &[f64] {
        &self.expected_values
    }

    pub fn n_outputs(&self) -> usize {
        self.expected_values.len()
    }

    pub fn num_features(&self) -> usize {
        self.model.n_features()
    }

    pub fn config(&self) -> &TreeShapConfig {
        &self.config
    }

    /// SHAP values for every row of `data`.
    ///
    /// Single-output models give a `(samples, features)` array; models with several
    /// outputs give `(samples, features, outputs)`.
    pub fn shap_values(&self, data: ArrayView2<'_, f64>) -> Result<ArrayD<f64>> {
        let values = self.shap_values_3d(data)?;
        if self.n_outputs() == 1 {
            Ok(values.index_axis_move(Axis(2), 0).into_dyn())
        } else {
            Ok(values.into_dyn())
        }
    }

    /// SHAP values as `(samples, features, outputs)` regardless of the output count.
    pub fn shap_values_3d(&self, data: ArrayView2<'_, f64>) -> Result<Array3<f64>> {
        let n_features = self.num_features();
        if data.ncols() != n_features {
            return Err(ShapError::IncompatibleDimensions(format!(
                "Data to explain has {} features, but explainer expects {}.",
                data.ncols(),
                n_features
            )));
        }
        let n_samples = data.nrows();
        let n_outputs = self.n_outputs();
        debug!(
            "Explaining {} samples over {} trees (max depth {})",
            n_samples,
            self.model.trees().len(),
            self.max_depth
        );

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f64>> = {
            use rayon::prelude::*;
            (0..n_samples)
                .into_par_iter()
                .map(|i| self.row_attributions(data.row(i)))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f64>> = (0..n_samples).map(|i| self.row_attributions(data.row(i))).collect();

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let values = Array3::from_shape_vec((n_samples, n_features, n_outputs), flat)?;

        if self.config.check_additivity {
            self.check_additivity(data, &values)?;
        }
        Ok(values)
    }

    /// Explanation of one instance for one model output.
    pub fn explain(&self, instance: ArrayView1<'_, f64>, output: usize) -> Result<Explanation> {
        if output >= self.n_outputs() {
            return Err(ShapError::InvalidInput(format!(
                "Output {} requested, but the model has {} outputs.",
                output,
                self.n_outputs()
            )));
        }
        let data = instance.insert_axis(Axis(0));
        let values = self.shap_values_3d(data)?;
        let raw = self.model.predict_raw(data)?;
        Ok(Explanation {
            shap_values: values.slice(ndarray::s![0, .., output]).to_owned(),
            expected_value: self.expected_values[output],
            actual_prediction: raw[[0, output]],
            output,
            instance: Some(Array1::from(instance.to_vec())),
        })
    }

    fn check_additivity(&self, data: ArrayView2<'_, f64>, values: &Array3<f64>) -> Result<()> {
        let raw = self.model.predict_raw(data)?;
        let tolerance = self.config.additivity_tolerance;
        for ((sample, output), &prediction) in raw.indexed_iter() {
            let reconstructed = self.expected_values[output] + values.slice(ndarray::s![sample, .., output]).sum();
            if (reconstructed - prediction).abs() > tolerance * (1.0 + prediction.abs()) {
                return Err(ShapError::AdditivityCheckFailed(format!(
                    "Sample {} output {}: expected value plus SHAP values is {}, but the model predicts {}.",
                    sample, output, reconstructed, prediction
                )));
            }
        }
        Ok(())
    }

    /// Attributions for one row, laid out as `features x outputs`.
    fn row_attributions(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let n_outputs = self.n_outputs();
        let mut phi = vec![0.0; self.num_features() * n_outputs];
        let max_d = self.max_depth + 2;
        let mut path = vec![PathElement::default(); max_d * (max_d + 1) / 2];

        for (tree, &output) in self.model.trees().iter().zip(self.model.tree_outputs()) {
            if tree.n_nodes() == 1 {
                continue;
            }
            let mut walk = TreeWalk {
                tree,
                row,
                phi: &mut phi,
                n_outputs,
                output,
            };
            walk.recurse(0, 0, &mut path, 1.0, 1.0, None);
        }
        phi
    }
}

/// State for explaining one row against one tree.
struct TreeWalk<'t, 'r, 'p> {
    tree: &'t Tree,
    row: ArrayView1<'r, f64>,
    phi: &'p mut [f64],
    n_outputs: usize,
    output: usize,
}

impl TreeWalk<'_, '_, '_> {
    fn recurse(
        &mut self,
        node: usize,
        unique_depth: usize,
        parent_path: &mut [PathElement],
        parent_zero_fraction: f64,
        parent_one_fraction: f64,
        parent_feature: Option<usize>,
    ) {
        let tree = self.tree;
        let (parent, unique_path) = parent_path.split_at_mut(unique_depth + 1);
        unique_path[..unique_depth + 1].copy_from_slice(parent);
        extend_path(unique_path, unique_depth, parent_zero_fraction, parent_one_fraction, parent_feature);

        match tree.node(node) {
            Node::Leaf { value, .. } => {
                for i in 1..=unique_depth {
                    let w = unwound_path_sum(unique_path, unique_depth, i);
                    let el = unique_path[i];
                    if let Some(feature) = el.feature {
                        self.phi[feature * self.n_outputs + self.output] +=
                            w * (el.one_fraction - el.zero_fraction) * value;
                    }
                }
            }
            Node::Split {
                feature,
                left,
                right,
                cover,
                ..
            } => {
                let split_feature = *feature;
                let (hot, cold) = if tree.goes_left(node, self.row) {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                let hot_zero_fraction = tree.node(hot).cover() / cover;
                let cold_zero_fraction = tree.node(cold).cover() / cover;

                let mut incoming_zero_fraction = 1.0;
                let mut incoming_one_fraction = 1.0;
                let mut depth = unique_depth;
                if let Some(path_index) = (1..=unique_depth).find(|&i| unique_path[i].feature == Some(split_feature)) {
                    incoming_zero_fraction = unique_path[path_index].zero_fraction;
                    incoming_one_fraction = unique_path[path_index].one_fraction;
                    unwind_path(unique_path, unique_depth, path_index);
                    depth -= 1;
                }

                self.recurse(
                    hot,
                    depth + 1,
                    unique_path,
                    hot_zero_fraction * incoming_zero_fraction,
                    incoming_one_fraction,
                    Some(split_feature),
                );
                self.recurse(
                    cold,
                    depth + 1,
                    unique_path,
                    cold_zero_fraction * incoming_zero_fraction,
                    0.0,
                    Some(split_feature),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbm::{CategorySet, GbmClassifier, GbmConfig, GbmRegressor, SplitCondition};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Minimal hand-built ensemble.
    struct ManualEnsemble {
        trees: Vec<Tree>,
        outputs: Vec<usize>,
        init: Vec<f64>,
        n_features: usize,
        /// Added to predictions to break additivity on purpose.
        prediction_offset: f64,
    }

    impl ManualEnsemble {
        fn single(tree: Tree, n_features: usize) -> Self {
            ManualEnsemble {
                trees: vec![tree],
                outputs: vec![0],
                init: vec![0.0],
                n_features,
                prediction_offset: 0.0,
            }
        }
    }

    impl TreeModel for ManualEnsemble {
        fn trees(&self) -> &[Tree] {
            &self.trees
        }
        fn tree_outputs(&self) -> &[usize] {
            &self.outputs
        }
        fn n_outputs(&self) -> usize {
            self.init.len()
        }
        fn init_scores(&self) -> &[f64] {
            &self.init
        }
        fn n_features(&self) -> usize {
            self.n_features
        }
        fn predict_raw(&self, instances: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
            let mut out = Array2::from_shape_fn((instances.nrows(), self.init.len()), |(_, k)| self.init[k]);
            for (i, row) in instances.rows().into_iter().enumerate() {
                for (tree, &k) in self.trees.iter().zip(&self.outputs) {
                    out[[i, k]] += tree.predict_row(row);
                }
            }
            Ok(out.mapv(|v| v + self.prediction_offset))
        }
    }

    fn split(feature: usize, threshold: f64, left: usize, right: usize, cover: f64) -> Node {
        Node::Split {
            feature,
            condition: SplitCondition::Numerical { threshold },
            default_left: true,
            left,
            right,
            gain: 1.0,
            cover,
        }
    }

    fn leaf(value: f64, cover: f64) -> Node {
        Node::Leaf { value, cover }
    }

    /// Depth-3 tree that splits on feature 0 twice along one path, plus a categorical node.
    fn repeated_feature_tree() -> Tree {
        Tree::new(vec![
            split(0, 0.5, 1, 2, 100.0),
            split(1, 0.0, 3, 4, 60.0),
            Node::Split {
                feature: 2,
                condition: SplitCondition::Categorical {
                    left_categories: CategorySet::from_categories([1, 2]),
                },
                default_left: false,
                left: 5,
                right: 6,
                gain: 1.0,
                cover: 40.0,
            },
            split(0, -0.5, 7, 8, 25.0),
            leaf(2.0, 35.0),
            leaf(-3.0, 10.0),
            leaf(1.5, 30.0),
            leaf(-1.0, 5.0),
            leaf(4.0, 20.0),
        ])
        .unwrap()
    }

    /// Cover-weighted conditional expectation with the features in `known` fixed to `x`.
    fn conditional_expectation(tree: &Tree, node: usize, x: ArrayView1<'_, f64>, known: &[bool]) -> f64 {
        match tree.node(node) {
            Node::Leaf { value, .. } => *value,
            Node::Split {
                feature,
                left,
                right,
                cover,
                ..
            } => {
                if known[*feature] {
                    let next = if tree.goes_left(node, x) { *left } else { *right };
                    conditional_expectation(tree, next, x, known)
                } else {
                    let l = tree.node(*left).cover();
                    let r = tree.node(*right).cover();
                    (l * conditional_expectation(tree, *left, x, known)
                        + r * conditional_expectation(tree, *right, x, known))
                        / cover
                }
            }
        }
    }

    /// Shapley values by enumerating every feature subset.
    fn brute_force_shap(tree: &Tree, x: ArrayView1<'_, f64>) -> Vec<f64> {
        let m = x.len();
        let factorial = |n: usize| (1..=n).map(|v| v as f64).product::<f64>();
        let mut phi = vec![0.0; m];
        for i in 0..m {
            for mask in 0..(1usize << m) {
                if mask & (1 << i) != 0 {
                    continue;
                }
                let size = mask.count_ones() as usize;
                let weight = factorial(size) * factorial(m - size - 1) / factorial(m);
                let mut known: Vec<bool> = (0..m).map(|j| mask & (1 << j) != 0).collect();
                let without = conditional_expectation(tree, 0, x, &known);
                known[i] = true;
                let with = conditional_expectation(tree, 0, x, &known);
                phi[i] += weight * (with - without);
            }
        }
        phi
    }

    #[test]
    fn stump_attribution() -> Result<()> {
        let tree = Tree::new(vec![split(0, 0.5, 1, 2, 100.0), leaf(-1.0, 40.0), leaf(1.0, 60.0)])?;
        let model = ManualEnsemble::single(tree, 2);
        let explainer = TreeExplainer::new(&model, None)?;
        assert_abs_diff_eq!(explainer.expected_value()[0], 0.2, epsilon = 1e-12);

        let values = explainer.shap_values(array![[0.0, 7.0], [1.0, 7.0]].view())?;
        assert_eq!(values.shape(), &[2, 2]);
        assert_abs_diff_eq!(values[[0, 0]], -1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(values[[1, 0]], 0.8, epsilon = 1e-12);
        assert_eq!(values[[0, 1]], 0.0);
        Ok(())
    }

    #[test]
    fn matches_brute_force_shapley_values() -> Result<()> {
        let tree = repeated_feature_tree();
        let model = ManualEnsemble::single(tree.clone(), 3);
        let explainer = TreeExplainer::new(&model, None)?;

        let instances = array![
            [0.0, -1.0, 1.0],
            [-1.0, 1.0, 0.0],
            [0.7, 0.3, 2.0],
            [0.7, 0.3, 5.0],
            [-0.6, -2.0, f64::NAN],
        ];
        let values = explainer.shap_values(instances.view())?;
        for (i, x) in instances.rows().into_iter().enumerate() {
            let expected = brute_force_shap(&tree, x);
            for f in 0..3 {
                assert_abs_diff_eq!(values[[i, f]], expected[f], epsilon = 1e-10);
            }
        }
        Ok(())
    }

    #[test]
    fn regression_model_is_additive() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(5);
        let features = Array2::from_shape_fn((120, 4), |_| rng.gen_range(-2.0..2.0));
        let target = features.map_axis(Axis(1), |r| r[0] * r[0] + 2.0 * r[1] - r[2]);
        let mut model = GbmRegressor::new(GbmConfig { n_estimators: 30, ..Default::default() });
        model.fit(features.view(), target.view(), &[])?;
        let booster = model.booster()?;

        let explainer = TreeExplainer::new(booster, None)?;
        let values = explainer.shap_values(features.view())?;
        assert_eq!(values.ndim(), 2);
        assert_eq!(values.shape(), &[120, 4]);

        let raw = booster.predict_raw(features.view())?;
        for i in 0..120 {
            let total: f64 = (0..4).map(|f| values[[i, f]]).sum::<f64>() + explainer.expected_value()[0];
            assert_abs_diff_eq!(total, raw[[i, 0]], epsilon = 1e-8);
        }
        Ok(())
    }

    #[test]
    fn classification_shapes_follow_output_count() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(9);
        let features = Array2::from_shape_fn((90, 3), |_| rng.gen_range(0.0f64..3.0));
        let binary = features.column(0).mapv(|x| if x > 1.5 { 1.0 } else { 0.0 });
        let multi = features.column(0).mapv(|x| x.floor());
        let config = GbmConfig { n_estimators: 10, ..Default::default() };

        let mut model = GbmClassifier::new(config.clone());
        model.fit(features.view(), binary.view(), &[])?;
        let explainer = TreeExplainer::new(model.booster()?, None)?;
        assert_eq!(explainer.shap_values(features.view())?.shape(), &[90, 3]);

        let mut model = GbmClassifier::new(config);
        model.fit(features.view(), multi.view(), &[])?;
        let explainer = TreeExplainer::new(model.booster()?, None)?;
        assert_eq!(explainer.expected_value().len(), 3);
        assert_eq!(explainer.shap_values(features.view())?.shape(), &[90, 3, 3]);
        Ok(())
    }

    #[test]
    fn explain_single_instance() -> Result<()> {
        let model = ManualEnsemble::single(repeated_feature_tree(), 3);
        let explainer = TreeExplainer::new(&model, None)?;
        // Right at the root, then category 5 is outside {1, 2}: leaf 1.5.
        let instance = array![0.7, 0.3, 5.0];
        let explanation = explainer.explain(instance.view(), 0)?;
        assert_abs_diff_eq!(explanation.actual_prediction, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(explanation.reconstructed_prediction(), 1.5, epsilon = 1e-10);
        assert_eq!(explanation.instance, Some(instance.clone()));
        assert!(matches!(explainer.explain(instance.view(), 1), Err(ShapError::InvalidInput(_))));

        // Category 2 goes left at the categorical node: leaf -3.0.
        let explanation = explainer.explain(array![0.7, 0.3, 2.0].view(), 0)?;
        assert_abs_diff_eq!(explanation.actual_prediction, -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(explanation.reconstructed_prediction(), -3.0, epsilon = 1e-10);
        Ok(())
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_rows_match_sequential_rows() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(13);
        let features = Array2::from_shape_fn((80, 3), |_| rng.gen_range(0.0f64..3.0));
        let labels = features.column(2).mapv(|x| x.floor());
        let mut model = GbmClassifier::new(GbmConfig { n_estimators: 10, ..Default::default() });
        model.fit(features.view(), labels.view(), &[])?;
        let explainer = TreeExplainer::new(model.booster()?, None)?;

        let values = explainer.shap_values_3d(features.view())?;
        let n_outputs = explainer.n_outputs();
        assert_eq!(n_outputs, 3);
        for (i, row) in features.rows().into_iter().enumerate() {
            let sequential = Array2::from_shape_vec((3, n_outputs), explainer.row_attributions(row))?;
            assert_eq!(values.index_axis(Axis(0), i), sequential);
        }
        Ok(())
    }

    #[test]
    fn constant_trees_only_move_the_expected_value() -> Result<()> {
        let model = ManualEnsemble {
            trees: vec![Tree::constant(0.5, 10.0), Tree::constant(-0.25, 10.0)],
            outputs: vec![0, 0],
            init: vec![1.0],
            n_features: 2,
            prediction_offset: 0.0,
        };
        let explainer = TreeExplainer::new(&model, None)?;
        assert_abs_diff_eq!(explainer.expected_value()[0], 1.25);
        let values = explainer.shap_values(array![[3.0, 4.0]].view())?;
        assert!(values.iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn detects_broken_additivity() -> Result<()> {
        let mut model = ManualEnsemble::single(repeated_feature_tree(), 3);
        model.prediction_offset = 0.5;
        let data = array![[0.0, -1.0, 1.0]];

        let explainer = TreeExplainer::new(&model, None)?;
        assert!(matches!(
            explainer.shap_values(data.view()),
            Err(ShapError::AdditivityCheckFailed(_))
        ));

        let lenient = TreeShapConfig {
            check_additivity: false,
            ..Default::default()
        };
        let explainer = TreeExplainer::new(&model, Some(lenient))?;
        assert!(explainer.shap_values(data.view()).is_ok());
        Ok(())
    }

    #[test]
    fn rejects_mismatched_inputs() -> Result<()> {
        let model = ManualEnsemble::single(repeated_feature_tree(), 3);
        let explainer = TreeExplainer::new(&model, None)?;
        assert!(matches!(
            explainer.shap_values(Array2::<f64>::zeros((2, 4)).view()),
            Err(ShapError::IncompatibleDimensions(_))
        ));

        let bad = ManualEnsemble {
            outputs: vec![1],
            ..ManualEnsemble::single(repeated_feature_tree(), 3)
        };
        assert!(matches!(TreeExplainer::new(&bad, None), Err(ShapError::InvalidInput(_))));

        let uncovered = ManualEnsemble::single(
            Tree::new(vec![split(0, 0.0, 1, 2, 0.0), leaf(1.0, 0.0), leaf(2.0, 0.0)])?,
            1,
        );
        assert!(matches!(TreeExplainer::new(&uncovered, None), Err(ShapError::InvalidInput(_))));
        Ok(())
    }
}
