use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::loss::loss_type::LossType;
use crate::network::network::Network;

/// Describes one layer before its input width is known.
///
/// `Network::initialize` resolves each spec into a concrete `Layer`, feeding
/// it the previous layer's output width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Fully connected layer with `outputs` neurons.
    Linear { outputs: usize },
    /// Element-wise activation; output width equals input width.
    Activation(ActivationFunction),
    /// Softmax over the whole input vector.
    Softmax,
}

impl LayerSpec {
    pub fn linear(outputs: usize) -> LayerSpec {
        LayerSpec::Linear { outputs }
    }

    pub fn tanh() -> LayerSpec {
        LayerSpec::Activation(ActivationFunction::Tanh)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayerSpec::Linear { .. } => "Linear",
            LayerSpec::Activation(f) => f.name(),
            LayerSpec::Softmax => "Softmax",
        }
    }
}

/// A fully serializable description of a network architecture plus its
/// training hyperparameters.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of any
/// trained weights, so a topology can be written down before training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Width of every input example.
    pub input_size: usize,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub loss: LossType,
}

fn default_batch_size() -> usize {
    Network::DEFAULT_BATCH_SIZE
}

fn default_learning_rate() -> f64 {
    Network::DEFAULT_LEARNING_RATE
}

impl NetworkSpec {
    pub fn new(input_size: usize, layers: Vec<LayerSpec>) -> NetworkSpec {
        NetworkSpec {
            input_size,
            layers,
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            loss: LossType::default(),
        }
    }

    /// Initializes a fresh network with this topology and hyperparameters.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        let mut network = Network::initialize(self.input_size, &self.layers, rng)?;
        network.batch_size = self.batch_size;
        network.learning_rate = self.learning_rate;
        network.loss = self.loss;
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| NetError::io(path, e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| NetError::io(path, std::io::Error::new(std::io::ErrorKind::Other, e)))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path).map_err(|e| NetError::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| NetError::CorruptFormat(format!("network spec '{}': {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn parses_minimal_json_with_defaults() {
        let json = r#"{
            "input_size": 2,
            "layers": [
                { "type": "linear", "outputs": 7 },
                { "type": "activation", "kind": "tanh" },
                { "type": "linear", "outputs": 3 },
                { "type": "softmax" }
            ]
        }"#;
        let spec: NetworkSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.layers[1], LayerSpec::tanh());
        assert_eq!(spec.batch_size, Network::DEFAULT_BATCH_SIZE);
        assert_eq!(spec.loss, LossType::CrossEntropy);

        let network = spec.build(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(network.output_size(), 3);
    }

    #[test]
    fn build_carries_hyperparameters() {
        let mut spec = NetworkSpec::new(4, vec![LayerSpec::linear(2)]);
        spec.batch_size = 5;
        spec.learning_rate = 0.25;
        spec.loss = LossType::Mse;
        let network = spec.build(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(network.batch_size, 5);
        assert_eq!(network.learning_rate, 0.25);
        assert_eq!(network.loss, LossType::Mse);
    }
}
