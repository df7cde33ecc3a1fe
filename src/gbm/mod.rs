// src/gbm/mod.rs

//! Gradient boosted decision trees used as the error surrogate.

pub mod config;
mod grower;
pub mod model;
pub mod objective;
pub mod tree;

pub use config::GbmConfig;
pub use model::{Booster, GbmClassifier, GbmRegressor};
pub use objective::Objective;
pub use tree::{CategorySet, Node, SplitCondition, Tree};
