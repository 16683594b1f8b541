use serde::{Serialize, Deserialize};

use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::mse::MseLoss;

/// Selects which loss function training and evaluation use.
///
/// - `CrossEntropy` — categorical cross-entropy; pair with a Softmax output.
///   When the last layer is Softmax the trainer uses the combined gradient
///   `predicted - expected` and skips the Softmax Jacobian.
/// - `Mse`          — mean-squared error; pair with Identity, Tanh or Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    CrossEntropy,
    Mse,
}

impl LossType {
    /// Scalar loss for one sample.
    pub fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
            LossType::Mse          => MseLoss::loss(predicted, expected),
        }
    }

    /// ∂L/∂predicted for one sample.
    pub fn derivative(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::CrossEntropy => CrossEntropyLoss::derivative(predicted, expected),
            LossType::Mse          => MseLoss::derivative(predicted, expected),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossType::CrossEntropy => "cross-entropy",
            LossType::Mse          => "mse",
        }
    }
}
