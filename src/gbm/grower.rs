// src/gbm/grower.rs

//! Leaf-wise tree growth.
//!
//! Each round the leaf with the highest split gain is expanded, until the tree has
//! `num_leaves` leaves or no leaf has a split that passes the constraints. Numerical
//! splits scan sorted feature values; categorical splits either try one category
//! against the rest or order categories by their smoothed gradient ratio and scan
//! prefixes from both ends.

use std::collections::BTreeMap;

use ndarray::{ArrayView1, ArrayView2};

use super::config::GbmConfig;
use super::tree::{category_of, CategorySet, Node, SplitCondition, Tree};
use crate::utils::{leaf_gain, leaf_output};

/// Gains at or below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-10;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct GradStats {
    grad: f64,
    hess: f64,
    count: usize,
}

impl GradStats {
    #[inline]
    fn add(&mut self, grad: f64, hess: f64) {
        self.grad += grad;
        self.hess += hess;
        self.count += 1;
    }

    #[inline]
    fn merge(&mut self, other: &GradStats) {
        self.grad += other.grad;
        self.hess += other.hess;
        self.count += other.count;
    }

    #[inline]
    fn minus(&self, other: &GradStats) -> GradStats {
        GradStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature: usize,
    condition: SplitCondition,
    default_left: bool,
    gain: f64,
}

#[derive(Debug)]
struct GrowingLeaf {
    node: usize,
    rows: Vec<usize>,
    depth: usize,
    stats: GradStats,
    best: Option<SplitCandidate>,
}

/// Grows one regression tree on gradient statistics.
pub(crate) struct TreeGrower<'d, 'c> {
    features: ArrayView2<'d, f64>,
    categorical: Vec<bool>,
    config: &'c GbmConfig,
}

impl<'d, 'c> TreeGrower<'d, 'c> {
    pub(crate) fn new(features: ArrayView2<'d, f64>, categorical: Vec<bool>, config: &'c GbmConfig) -> Self {
        TreeGrower {
            features,
            categorical,
            config,
        }
    }

    /// Grows a tree over `rows` using only the columns in `feature_subset`.
    /// Leaf values are already multiplied by the learning rate.
    pub(crate) fn grow(
        &self,
        grad: ArrayView1<'_, f64>,
        hess: ArrayView1<'_, f64>,
        rows: &[usize],
        feature_subset: &[usize],
    ) -> Tree {
        let mut nodes = vec![Node::Leaf {
            value: 0.0,
            cover: rows.len() as f64,
        }];
        let mut leaves = vec![self.new_leaf(0, rows.to_vec(), 0, grad, hess, feature_subset)];

        while leaves.len() < self.config.num_leaves {
            let mut pick: Option<(usize, f64)> = None;
            for (i, leaf) in leaves.iter().enumerate() {
                if let Some(best) = &leaf.best {
                    if pick.map_or(true, |(_, gain)| best.gain > gain) {
                        pick = Some((i, best.gain));
                    }
                }
            }
            let Some((index, _)) = pick else {
                break;
            };

            let leaf = leaves.remove(index);
            let split = match leaf.best {
                Some(split) => split,
                None => break,
            };
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
                .rows
                .iter()
                .partition(|&&r| split.condition.goes_left(self.features[[r, split.feature]], split.default_left));

            let left_node = nodes.len();
            let right_node = left_node + 1;
            nodes.push(Node::Leaf {
                value: 0.0,
                cover: left_rows.len() as f64,
            });
            nodes.push(Node::Leaf {
                value: 0.0,
                cover: right_rows.len() as f64,
            });
            nodes[leaf.node] = Node::Split {
                feature: split.feature,
                condition: split.condition,
                default_left: split.default_left,
                left: left_node,
                right: right_node,
                gain: split.gain,
                cover: leaf.rows.len() as f64,
            };

            let depth = leaf.depth + 1;
            leaves.push(self.new_leaf(left_node, left_rows, depth, grad, hess, feature_subset));
            leaves.push(self.new_leaf(right_node, right_rows, depth, grad, hess, feature_subset));
        }

        for leaf in &leaves {
            let value = leaf_output(leaf.stats.grad, leaf.stats.hess, self.config.reg_alpha, self.config.reg_lambda)
                * self.config.learning_rate;
            nodes[leaf.node] = Node::Leaf {
                value,
                cover: leaf.rows.len() as f64,
            };
        }

        Tree::from_nodes_unchecked(nodes)
    }

    fn new_leaf(
        &self,
        node: usize,
        rows: Vec<usize>,
        depth: usize,
        grad: ArrayView1<'_, f64>,
        hess: ArrayView1<'_, f64>,
        feature_subset: &[usize],
    ) -> GrowingLeaf {
        let mut stats = GradStats::default();
        for &r in &rows {
            stats.add(grad[r], hess[r]);
        }
        let depth_ok = self.config.max_depth.map_or(true, |max| depth < max);
        let best = if depth_ok && rows.len() >= 2 * self.config.min_child_samples {
            self.find_best_split(&rows, &stats, grad, hess, feature_subset)
        } else {
            None
        };
        GrowingLeaf {
            node,
            rows,
            depth,
            stats,
            best,
        }
    }

    fn find_best_split(
        &self,
        rows: &[usize],
        total: &GradStats,
        grad: ArrayView1<'_, f64>,
        hess: ArrayView1<'_, f64>,
        feature_subset: &[usize],
    ) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;
        for &feature in feature_subset {
            let candidate = if self.categorical[feature] {
                self.best_categorical_split(feature, rows, total, grad, hess)
            } else {
                self.best_numerical_split(feature, rows, total, grad, hess)
            };
            if let Some(candidate) = candidate {
                if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    #[inline]
    fn valid_children(&self, left: &GradStats, right: &GradStats) -> bool {
        let min_count = self.config.min_child_samples;
        let min_hess = self.config.min_child_weight;
        left.count >= min_count && right.count >= min_count && left.hess >= min_hess && right.hess >= min_hess
    }

    #[inline]
    fn split_gain(&self, left: &GradStats, right: &GradStats, lambda: f64) -> f64 {
        let alpha = self.config.reg_alpha;
        leaf_gain(left.grad, left.hess, alpha, lambda) + leaf_gain(right.grad, right.hess, alpha, lambda)
    }

    fn best_numerical_split(
        &self,
        feature: usize,
        rows: &[usize],
        total: &GradStats,
        grad: ArrayView1<'_, f64>,
        hess: ArrayView1<'_, f64>,
    ) -> Option<SplitCandidate> {
        let lambda = self.config.reg_lambda;
        let parent_gain = leaf_gain(total.grad, total.hess, self.config.reg_alpha, lambda) + self.config.min_split_gain;

        let mut missing = GradStats::default();
        let mut present: Vec<(f64, f64, f64)> = Vec::with_capacity(rows.len());
        for &r in rows {
            let value = self.features[[r, feature]];
            if value.is_nan() {
                missing.add(grad[r], hess[r]);
            } else {
                present.push((value, grad[r], hess[r]));
            }
        }
        if present.is_empty() {
            return None;
        }
        present.sort_by(|a, b| a.0.total_cmp(&b.0));
        let has_missing = missing.count > 0;

        let mut best: Option<SplitCandidate> = None;
        let mut best_gain = MIN_GAIN;
        let directions: &[bool] = if has_missing { &[false, true] } else { &[false] };
        for &missing_left in directions {
            let mut left = if missing_left { missing } else { GradStats::default() };
            for i in 0..present.len() {
                let (value, g, h) = present[i];
                left.add(g, h);
                let last = i + 1 == present.len();
                if last {
                    // Only meaningful as "every present value left, missing right".
                    if missing_left || !has_missing {
                        continue;
                    }
                } else if value == present[i + 1].0 {
                    continue;
                }
                let right = total.minus(&left);
                if !self.valid_children(&left, &right) {
                    continue;
                }
                let gain = self.split_gain(&left, &right, lambda) - parent_gain;
                if gain > best_gain {
                    best_gain = gain;
                    let threshold = if last { value } else { midpoint(value, present[i + 1].0) };
                    let default_left = if has_missing { missing_left } else { 0.0 <= threshold };
                    best = Some(SplitCandidate {
                        feature,
                        condition: SplitCondition::Numerical { threshold },
                        default_left,
                        gain,
                    });
                }
            }
        }
        best
    }

    fn best_categorical_split(
        &self,
        feature: usize,
        rows: &[usize],
        total: &GradStats,
        grad: ArrayView1<'_, f64>,
        hess: ArrayView1<'_, f64>,
    ) -> Option<SplitCandidate> {
        let mut per_category: BTreeMap<u32, GradStats> = BTreeMap::new();
        let mut missing = GradStats::default();
        for &r in rows {
            match category_of(self.features[[r, feature]]) {
                Some(cat) => per_category.entry(cat).or_default().add(grad[r], hess[r]),
                None => missing.add(grad[r], hess[r]),
            }
        }
        let categories: Vec<(u32, GradStats)> = per_category.into_iter().collect();
        if categories.is_empty() || (categories.len() == 1 && missing.count == 0) {
            return None;
        }

        if categories.len() <= self.config.max_cat_to_onehot {
            self.one_vs_rest_split(feature, &categories, total)
        } else {
            self.many_vs_many_split(feature, categories, total)
        }
    }

    fn one_vs_rest_split(
        &self,
        feature: usize,
        categories: &[(u32, GradStats)],
        total: &GradStats,
    ) -> Option<SplitCandidate> {
        let lambda = self.config.reg_lambda;
        let parent_gain = leaf_gain(total.grad, total.hess, self.config.reg_alpha, lambda) + self.config.min_split_gain;
        let mut best: Option<SplitCandidate> = None;
        let mut best_gain = MIN_GAIN;
        for (cat, stats) in categories {
            let right = total.minus(stats);
            if !self.valid_children(stats, &right) {
                continue;
            }
            let gain = self.split_gain(stats, &right, lambda) - parent_gain;
            if gain > best_gain {
                best_gain = gain;
                best = Some(SplitCandidate {
                    feature,
                    condition: SplitCondition::Categorical {
                        left_categories: CategorySet::from_categories([*cat]),
                    },
                    default_left: false,
                    gain,
                });
            }
        }
        best
    }

    fn many_vs_many_split(
        &self,
        feature: usize,
        categories: Vec<(u32, GradStats)>,
        total: &GradStats,
    ) -> Option<SplitCandidate> {
        let config = self.config;
        let lambda = config.reg_lambda + config.cat_l2;
        let parent_gain = leaf_gain(total.grad, total.hess, config.reg_alpha, lambda) + config.min_split_gain;

        let mut usable: Vec<(u32, GradStats)> = categories
            .into_iter()
            .filter(|(_, s)| s.count as f64 >= config.cat_smooth)
            .collect();
        if usable.len() < 2 {
            return None;
        }
        usable.sort_by(|a, b| {
            let ra = a.1.grad / (a.1.hess + config.cat_smooth);
            let rb = b.1.grad / (b.1.hess + config.cat_smooth);
            ra.total_cmp(&rb)
        });
        let max_left = config.max_cat_threshold.min((usable.len() + 1) / 2);

        let mut best: Option<(f64, Vec<u32>)> = None;
        let mut best_gain = MIN_GAIN;
        for reverse in [false, true] {
            let ordered: Vec<&(u32, GradStats)> = if reverse {
                usable.iter().rev().collect()
            } else {
                usable.iter().collect()
            };
            let mut left = GradStats::default();
            let mut group_count = 0usize;
            for (i, (_, stats)) in ordered.iter().enumerate().take(max_left) {
                left.merge(stats);
                group_count += stats.count;
                if left.count < config.min_child_samples || left.hess < config.min_child_weight {
                    continue;
                }
                let right = total.minus(&left);
                if right.count < config.min_child_samples
                    || right.count < config.min_data_per_group
                    || right.hess < config.min_child_weight
                {
                    break;
                }
                if group_count < config.min_data_per_group {
                    continue;
                }
                group_count = 0;
                let gain = self.split_gain(&left, &right, lambda) - parent_gain;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((gain, ordered[..=i].iter().map(|(cat, _)| *cat).collect()));
                }
            }
        }

        best.map(|(gain, cats)| SplitCandidate {
            feature,
            condition: SplitCondition::Categorical {
                left_categories: CategorySet::from_categories(cats),
            },
            default_left: false,
            gain,
        })
    }
}

/// A threshold strictly below `hi` and not below `lo`.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= lo && mid < hi {
        mid
    } else {
        lo
    }
}
