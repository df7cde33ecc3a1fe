// src/gbm/tree.rs

//! Fitted regression trees.
//!
//! A tree is a flat vector of nodes with index 0 as the root. Every node carries its
//! cover, the number of training rows that reached it, which TreeSHAP uses to weigh
//! the branches a sample does not take.

use ndarray::ArrayView1;

use crate::core::{Result, ShapError};

/// Set of categories routed to the left child of a categorical split.
///
/// Stored as a sorted list, so memory follows the number of categories in the set
/// rather than the largest category value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<u32>,
}

impl CategorySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_categories<I: IntoIterator<Item = u32>>(categories: I) -> Self {
        let mut categories: Vec<u32> = categories.into_iter().collect();
        categories.sort_unstable();
        categories.dedup();
        CategorySet { categories }
    }

    pub fn insert(&mut self, cat: u32) {
        if let Err(pos) = self.categories.binary_search(&cat) {
            self.categories.insert(pos, cat);
        }
    }

    #[inline]
    pub fn contains(&self, cat: u32) -> bool {
        self.categories.binary_search(&cat).is_ok()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.categories.iter().copied()
    }
}

/// Maps a raw feature value to a category. `NaN`, negative and out-of-range values are missing.
#[inline]
pub fn category_of(value: f64) -> Option<u32> {
    if value.is_nan() || value < 0.0 || value > i32::MAX as f64 {
        None
    } else {
        Some(value.trunc() as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitCondition {
    /// `x <= threshold` goes left.
    Numerical { threshold: f64 },
    /// Categories in the set go left; everything else, including missing, goes right.
    Categorical { left_categories: CategorySet },
}

impl SplitCondition {
    #[inline]
    pub fn goes_left(&self, value: f64, default_left: bool) -> bool {
        match self {
            SplitCondition::Numerical { threshold } => {
                if value.is_nan() {
                    default_left
                } else {
                    value <= *threshold
                }
            }
            SplitCondition::Categorical { left_categories } => match category_of(value) {
                Some(cat) => left_categories.contains(cat),
                None => default_left,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf {
        value: f64,
        cover: f64,
    },
    Split {
        feature: usize,
        condition: SplitCondition,
        /// Direction taken by missing values.
        default_left: bool,
        left: usize,
        right: usize,
        gain: f64,
        cover: f64,
    },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match self {
            Node::Leaf { cover, .. } | Node::Split { cover, .. } => *cover,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds a tree from nodes, root first. Child indices must point forward and
    /// every node except the root must have exactly one parent.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ShapError::InvalidInput("A tree needs at least one node.".to_string()));
        }
        let mut parents = vec![0usize; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                for &child in [left, right].iter() {
                    if *child <= i || *child >= nodes.len() {
                        return Err(ShapError::InvalidInput(format!(
                            "Node {} has invalid child index {}.",
                            i, child
                        )));
                    }
                    parents[*child] += 1;
                }
            }
            if node.cover() < 0.0 || !node.cover().is_finite() {
                return Err(ShapError::InvalidInput(format!(
                    "Node {} has invalid cover {}.",
                    i,
                    node.cover()
                )));
            }
        }
        if let Some(orphan) = (1..nodes.len()).find(|&i| parents[i] != 1) {
            return Err(ShapError::InvalidInput(format!(
                "Node {} is not referenced by exactly one parent.",
                orphan
            )));
        }
        Ok(Tree { nodes })
    }

    /// A single-leaf tree.
    pub fn constant(value: f64, cover: f64) -> Self {
        Tree {
            nodes: vec![Node::Leaf { value, cover }],
        }
    }

    pub(crate) fn from_nodes_unchecked(nodes: Vec<Node>) -> Self {
        Tree { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path, counted in edges.
    pub fn max_depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                depth[*left] = depth[i] + 1;
                depth[*right] = depth[i] + 1;
                max_depth = max_depth.max(depth[i] + 1);
            }
        }
        max_depth
    }

    /// Whether `row` descends to the left child of split node `index`.
    #[inline]
    pub fn goes_left(&self, index: usize, row: ArrayView1<'_, f64>) -> bool {
        match &self.nodes[index] {
            Node::Leaf { .. } => false,
            Node::Split {
                feature,
                condition,
                default_left,
                ..
            } => condition.goes_left(row[*feature], *default_left),
        }
    }

    /// Index of the leaf `row` lands in.
    pub fn leaf_index(&self, row: ArrayView1<'_, f64>) -> usize {
        let mut index = 0;
        while let Node::Split { left, right, .. } = &self.nodes[index] {
            index = if self.goes_left(index, row) { *left } else { *right };
        }
        index
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        match &self.nodes[self.leaf_index(row)] {
            Node::Leaf { value, .. } => *value,
            Node::Split { .. } => unreachable!("leaf_index always stops at a leaf"),
        }
    }

    /// Cover-weighted mean of the leaf values: the tree's prediction with no feature known.
    pub fn expected_value(&self) -> f64 {
        let root_cover = self.nodes[0].cover();
        if root_cover <= 0.0 {
            return 0.0;
        }
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Leaf { value, cover } => Some(value * cover),
                Node::Split { .. } => None,
            })
            .sum::<f64>()
            / root_cover
    }
}
