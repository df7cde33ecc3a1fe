// src/algorithms/mod.rs

pub mod tree_shap;

pub use tree_shap::{TreeExplainer, TreeShapConfig};
