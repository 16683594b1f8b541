pub mod activation;
pub mod linear;
pub mod softmax;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::network::spec::LayerSpec;

pub use activation::ActivationLayer;
pub use linear::LinearLayer;
pub use softmax::SoftmaxLayer;

/// One stage of a feed-forward network.
///
/// Every variant follows the same contract:
/// - `forward` caches what the next `backward` needs and leaves parameters alone;
/// - `backward` must be called exactly once per `forward`; it adds this
///   layer's parameter gradients to an accumulator and returns the gradient
///   for the previous layer;
/// - `apply_gradients` is the only place parameters change.
///
/// The serde tag (`"type"`) is the layer's identity in saved model files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Linear(LinearLayer),
    Activation(ActivationLayer),
    Softmax(SoftmaxLayer),
}

impl Layer {
    /// Resolves `spec` into a concrete layer fed by `input_size` values.
    pub fn initialize<R: Rng + ?Sized>(spec: &LayerSpec, input_size: usize, rng: &mut R) -> Result<Layer> {
        if input_size == 0 {
            return Err(NetError::dimension(format!("{} layer input", spec.name()), 1, 0));
        }
        match *spec {
            LayerSpec::Linear { outputs } => {
                if outputs == 0 {
                    return Err(NetError::dimension("Linear layer output", 1, 0));
                }
                Ok(Layer::Linear(LinearLayer::new(input_size, outputs, rng)?))
            }
            LayerSpec::Activation(function) => {
                if !function.is_valid() {
                    return Err(NetError::Configuration(format!(
                        "{} activation has a non-finite parameter",
                        function.name()
                    )));
                }
                Ok(Layer::Activation(ActivationLayer::new(function, input_size)))
            }
            LayerSpec::Softmax => Ok(Layer::Softmax(SoftmaxLayer::new(input_size))),
        }
    }

    pub fn input_size(&self) -> usize {
        match self {
            Layer::Linear(l) => l.inputs,
            Layer::Activation(l) => l.size,
            Layer::Softmax(l) => l.size,
        }
    }

    pub fn output_size(&self) -> usize {
        match self {
            Layer::Linear(l) => l.outputs,
            Layer::Activation(l) => l.size,
            Layer::Softmax(l) => l.size,
        }
    }

    /// Forward pass without touching any cache; used for prediction.
    pub fn infer(&self, input: &[f64]) -> Vec<f64> {
        match self {
            Layer::Linear(l) => l.infer(input),
            Layer::Activation(l) => l.infer(input),
            Layer::Softmax(l) => l.infer(input),
        }
    }

    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        match self {
            Layer::Linear(l) => l.forward(input),
            Layer::Activation(l) => l.forward(input),
            Layer::Softmax(l) => l.forward(input),
        }
    }

    pub fn backward(&mut self, output_grad: &[f64]) -> Vec<f64> {
        match self {
            Layer::Linear(l) => l.backward(output_grad),
            Layer::Activation(l) => l.backward(output_grad),
            Layer::Softmax(l) => l.backward(output_grad),
        }
    }

    /// No-op for stateless layers.
    pub fn apply_gradients(&mut self, learning_rate: f64, batch_len: usize) {
        if let Layer::Linear(l) = self {
            l.apply_gradients(learning_rate, batch_len);
        }
    }

    pub fn parameter_count(&self) -> usize {
        match self {
            Layer::Linear(l) => l.parameter_count(),
            Layer::Activation(_) | Layer::Softmax(_) => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Linear(_) => "Linear",
            Layer::Activation(l) => l.function.name(),
            Layer::Softmax(_) => "Softmax",
        }
    }

    pub(crate) fn reset_gradients(&mut self) {
        if let Layer::Linear(l) = self {
            l.reset_gradients();
        }
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Layer::Linear(l) => l.validate(),
            Layer::Activation(l) if l.size == 0 => Err(format!("{} layer has zero width", l.function.name())),
            Layer::Activation(l) if !l.function.is_valid() => {
                Err(format!("{} activation has a non-finite parameter", l.function.name()))
            }
            Layer::Softmax(l) if l.size == 0 => Err("Softmax layer has zero width".into()),
            _ => Ok(()),
        }
    }
}
