// src/core/data.rs
use ndarray::{Array1, Array2};
use std::fmt;
use std::str::FromStr;

use super::errors::ShapError;

/// Represents a single data instance (a row of features).
pub type Instance = Array1<f64>;

/// Represents a dataset: rows are samples, columns are features.
/// Missing values are encoded as `NaN`.
pub type Dataset = Array2<f64>;

/// The kind of model whose errors are being analysed. Selects the surrogate family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTask {
    Classification,
    Regression,
}

impl ModelTask {
    pub fn is_classification(self) -> bool {
        self == ModelTask::Classification
    }
}

impl fmt::Display for ModelTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTask::Classification => write!(f, "classification"),
            ModelTask::Regression => write!(f, "regression"),
        }
    }
}

impl FromStr for ModelTask {
    type Err = ShapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Ok(ModelTask::Classification),
            "regression" => Ok(ModelTask::Regression),
            other => Err(ShapError::InvalidInput(format!(
                "Unknown model task '{}'. Expected 'classification' or 'regression'.",
                other
            ))),
        }
    }
}

/// Where the class axis sits in a 3-D attribution array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassAxis {
    /// `(classes, samples, features)`
    Leading,
    /// `(samples, features, classes)`
    #[default]
    Trailing,
}

/// Represents the output of a SHAP explanation for a single instance and model output.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// SHAP values, one for each feature.
    pub shap_values: Array1<f64>,
    /// The base value, E[f(x)], taken over the training covers of the trees.
    pub expected_value: f64,
    /// The raw (margin space) prediction for the instance being explained.
    pub actual_prediction: f64,
    /// Index of the model output (class) this explanation refers to.
    pub output: usize,
    /// The instance that was explained.
    pub instance: Option<Instance>,
}

impl Explanation {
    /// `expected_value + sum(shap_values)`, which reconstructs the raw prediction.
    pub fn reconstructed_prediction(&self) -> f64 {
        self.expected_value + self.shap_values.sum()
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Explanation (output {}):", self.output)?;
        writeln!(f, "  Expected Value (Base): {:.4}", self.expected_value)?;
        writeln!(f, "  Actual Prediction:     {:.4}", self.actual_prediction)?;
        writeln!(f, "  SHAP Values:")?;
        for (i, val) in self.shap_values.iter().enumerate() {
            writeln!(f, "    Feature {}: {:.4}", i, val)?;
        }
        if let Some(inst) = &self.instance {
            writeln!(f, "  Instance Values (first 10):")?;
            for (i, val) in inst.iter().take(10).enumerate() {
                writeln!(f, "    Feature {}: {:.4}", i, val)?;
            }
            if inst.len() > 10 {
                writeln!(f, "    ...")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn model_task_parses_case_insensitively() {
        assert_eq!("Classification".parse::<ModelTask>().unwrap(), ModelTask::Classification);
        assert_eq!(" regression ".parse::<ModelTask>().unwrap(), ModelTask::Regression);
        assert!("unknown".parse::<ModelTask>().is_err());
        assert_eq!(ModelTask::Regression.to_string(), "regression");
    }

    #[test]
    fn explanation_reconstructs_prediction() {
        let explanation = Explanation {
            shap_values: array![0.5, -0.25, 1.0],
            expected_value: 2.0,
            actual_prediction: 3.25,
            output: 0,
            instance: Some(array![1.0, 2.0, 3.0]),
        };
        assert!((explanation.reconstructed_prediction() - 3.25).abs() < 1e-12);
        let rendered = explanation.to_string();
        assert!(rendered.contains("Feature 2: 1.0000"));
    }
}
