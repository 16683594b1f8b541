use serde::{Serialize, Deserialize};
use std::f64::consts::{E, PI};

/// Element-wise activation functions available to `ActivationLayer`.
///
/// Softmax is not listed here: it couples every output to every input and
/// lives in its own layer (`SoftmaxLayer`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivationFunction {
    Tanh,
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    Identity,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Gelu,
    Swish,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (E.powf(x) - 1.0) }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationFunction::Swish => x / (1.0 + E.powf(-x)),
        }
    }

    /// Derivative at `x`, where `fx = self.function(x)` was cached by the
    /// forward pass.  Tanh and Sigmoid read the cached output instead of
    /// re-evaluating the exponential.
    pub fn derivative(&self, x: f64, fx: f64) -> f64 {
        match self {
            ActivationFunction::Tanh => 1.0 - fx * fx,
            ActivationFunction::Sigmoid => fx * (1.0 - fx),
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { 1.0 } else { fx + alpha }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                let inner = c * (x + 0.044715 * x.powi(3));
                let tanh_inner = inner.tanh();
                let sech2 = 1.0 - tanh_inner * tanh_inner;
                let d_inner = c * (1.0 + 3.0 * 0.044715 * x.powi(2));
                0.5 * tanh_inner + 0.5 * x * sech2 * d_inner + 0.5
            }
            ActivationFunction::Swish => {
                let sig = 1.0 / (1.0 + E.powf(-x));
                sig + x * sig * (1.0 - sig)
            }
        }
    }

    /// Short display name used in reports and log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Tanh => "Tanh",
            ActivationFunction::Sigmoid => "Sigmoid",
            ActivationFunction::ReLU => "ReLU",
            ActivationFunction::Identity => "Identity",
            ActivationFunction::LeakyReLU { .. } => "LeakyReLU",
            ActivationFunction::Elu { .. } => "ELU",
            ActivationFunction::Gelu => "GELU",
            ActivationFunction::Swish => "Swish",
        }
    }

    /// False for parameterized variants whose parameter is not a finite number.
    pub fn is_valid(&self) -> bool {
        match self {
            ActivationFunction::LeakyReLU { alpha } | ActivationFunction::Elu { alpha } => alpha.is_finite(),
            _ => true,
        }
    }
}
