// src/core/errors.rs
use std::fmt;

#[derive(Debug)]
pub enum ShapError {
    InvalidInput(String),
    IncompatibleDimensions(String),
    InvalidCategorical(String),
    InvalidConfig(String),
    NotFitted(String),
    AdditivityCheckFailed(String),
    NdarrayError(String),
}

impl fmt::Display for ShapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ShapError::IncompatibleDimensions(msg) => write!(f, "Incompatible Dimensions: {}", msg),
            ShapError::InvalidCategorical(msg) => write!(f, "Invalid Categorical Feature: {}", msg),
            ShapError::InvalidConfig(msg) => write!(f, "Invalid Config: {}", msg),
            ShapError::NotFitted(msg) => write!(f, "Model Not Fitted: {}", msg),
            ShapError::AdditivityCheckFailed(msg) => write!(f, "Additivity Check Failed: {}", msg),
            ShapError::NdarrayError(msg) => write!(f, "Ndarray Error: {}", msg),
        }
    }
}

impl std::error::Error for ShapError {}

impl From<ndarray::ShapeError> for ShapError {
    fn from(err: ndarray::ShapeError) -> Self {
        ShapError::NdarrayError(format!("ndarray ShapeError: {}", err))
    }
}

/// Convenience type alias for Result
pub type Result<T> = std::result::Result<T, ShapError>;
