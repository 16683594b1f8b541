use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::data::example::Example;
use crate::error::{NetError, Result};
use crate::layers::Layer;
use crate::loss::loss_type::LossType;
use crate::math::vector;
use crate::network::spec::LayerSpec;

/// Mean loss and argmax accuracy of a network over a set of examples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub mean_loss: f64,
    /// Fraction in [0, 1] of examples whose output argmax matches the target argmax.
    pub accuracy: f64,
}

/// An ordered stack of layers plus the hyperparameters used to train it.
///
/// Adjacent layers always agree on width: `layers[i].output_size() ==
/// layers[i + 1].input_size()`, and the first layer accepts `input_size`
/// values.  Fields that would break that chain are private.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    input_size: usize,
    /// Examples per gradient step.
    pub batch_size: usize,
    /// Step size for gradient descent.
    pub learning_rate: f64,
    /// Loss used for training and evaluation.
    pub loss: LossType,
    layers: Vec<Layer>,
}

impl Network {
    pub const DEFAULT_BATCH_SIZE: usize = 32;
    pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

    /// Wires `specs` input-to-output.  Each layer is initialized with the
    /// previous layer's output width; the first receives `input_size`.
    pub fn initialize<R: Rng + ?Sized>(input_size: usize, specs: &[LayerSpec], rng: &mut R) -> Result<Network> {
        if specs.is_empty() {
            return Err(NetError::Configuration("a network needs at least one layer".into()));
        }

        let mut layers = Vec::with_capacity(specs.len());
        let mut width = input_size;
        for (i, spec) in specs.iter().enumerate() {
            let layer = Layer::initialize(spec, width, rng).map_err(|e| {
                NetError::Configuration(format!("layer {} ({}) rejected input width {}: {}", i, spec.name(), width, e))
            })?;
            width = layer.output_size();
            layers.push(layer);
        }

        Ok(Network {
            input_size,
            batch_size: Network::DEFAULT_BATCH_SIZE,
            learning_rate: Network::DEFAULT_LEARNING_RATE,
            loss: LossType::default(),
            layers,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, |l| l.output_size())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Runs `input` through every layer.  Touches no cache and no parameter,
    /// so equal inputs give equal outputs until the next optimizer step.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_size {
            return Err(NetError::dimension("network input", self.input_size, input.len()));
        }
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.infer(&current);
        }
        Ok(current)
    }

    /// Mean loss and argmax accuracy over `examples`.  An empty slice scores
    /// zero on both.
    pub fn evaluate(&self, examples: &[Example]) -> Result<Evaluation> {
        if examples.is_empty() {
            return Ok(Evaluation { mean_loss: 0.0, accuracy: 0.0 });
        }
        let mut total_loss = 0.0;
        let mut correct = 0usize;
        for example in examples {
            self.check_example(example)?;
            let output = self.predict(&example.input)?;
            total_loss += self.loss.loss(&output, &example.output);
            if vector::argmax(&output) == vector::argmax(&example.output) {
                correct += 1;
            }
        }
        let n = examples.len() as f64;
        Ok(Evaluation { mean_loss: total_loss / n, accuracy: correct as f64 / n })
    }

    /// Forward + backward for one example.  Parameter gradients are added to
    /// each layer's accumulator; nothing is applied.  Returns the example's loss.
    ///
    /// Under cross-entropy with a Softmax output the output-layer delta is
    /// `prediction - target`; otherwise the loss derivative is propagated
    /// through every layer, Softmax included.
    pub fn accumulate_gradients(&mut self, example: &Example) -> Result<f64> {
        self.check_example(example)?;

        let mut current = example.input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current);
        }
        let loss = self.loss.loss(&current, &example.output);

        let depth = self.layers.len();
        let (mut delta, backprop_len) = match (self.loss, self.layers.last_mut()) {
            (LossType::CrossEntropy, Some(Layer::Softmax(softmax))) => {
                (softmax.backward_cross_entropy(&example.output), depth - 1)
            }
            _ => (self.loss.derivative(&current, &example.output), depth),
        };
        for layer in self.layers[..backprop_len].iter_mut().rev() {
            delta = layer.backward(&delta);
        }

        Ok(loss)
    }

    /// Errors with `Dimension` unless `example` fits this network's input and
    /// output widths.
    pub fn check_example(&self, example: &Example) -> Result<()> {
        if example.input.len() != self.input_size {
            return Err(NetError::dimension("example input", self.input_size, example.input.len()));
        }
        if example.output.len() != self.output_size() {
            return Err(NetError::dimension("example target", self.output_size(), example.output.len()));
        }
        Ok(())
    }

    /// Checks the width chain and every layer's own invariants, including
    /// finiteness of every parameter.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".into());
        }
        let mut width = self.input_size;
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|e| format!("layer {}: {}", i, e))?;
            if layer.input_size() != width {
                return Err(format!(
                    "layer {} ({}) expects {} inputs but receives {}",
                    i,
                    layer.name(),
                    layer.input_size(),
                    width
                ));
            }
            width = layer.output_size();
        }
        Ok(())
    }

    /// `validate`, then allocates fresh gradient accumulators.  Used on
    /// deserialized networks.
    pub(crate) fn validate_and_prepare(&mut self) -> std::result::Result<(), String> {
        self.validate()?;
        for layer in &mut self.layers {
            layer.reset_gradients();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LinearLayer;
    use crate::math::matrix::Matrix;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn spiral_topology() -> Vec<LayerSpec> {
        vec![LayerSpec::linear(7), LayerSpec::tanh(), LayerSpec::linear(3), LayerSpec::Softmax]
    }

    #[test]
    fn initialize_wires_widths() {
        let net = Network::initialize(2, &spiral_topology(), &mut StdRng::seed_from_u64(1)).unwrap();
        let widths: Vec<(usize, usize)> = net.layers().iter().map(|l| (l.input_size(), l.output_size())).collect();
        assert_eq!(widths, vec![(2, 7), (7, 7), (7, 3), (3, 3)]);
        assert_eq!(net.parameter_count(), 2 * 7 + 7 + 7 * 3 + 3);
        assert_eq!(net.batch_size, Network::DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn initialize_rejects_empty_and_bad_layers() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(Network::initialize(2, &[], &mut rng), Err(NetError::Configuration(_))));
        assert!(matches!(
            Network::initialize(2, &[LayerSpec::linear(0), LayerSpec::Softmax], &mut rng),
            Err(NetError::Configuration(_))
        ));
        assert!(matches!(
            Network::initialize(0, &[LayerSpec::Softmax], &mut rng),
            Err(NetError::Configuration(_))
        ));
    }

    #[test]
    fn predict_is_pure() {
        let net = Network::initialize(2, &spiral_topology(), &mut StdRng::seed_from_u64(4)).unwrap();
        let first = net.predict(&[0.3, -0.8]).unwrap();
        let second = net.predict(&[0.3, -0.8]).unwrap();
        assert_eq!(first, second);
        assert_abs_diff_eq!(first.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn predict_checks_width() {
        let net = Network::initialize(2, &spiral_topology(), &mut StdRng::seed_from_u64(4)).unwrap();
        assert!(matches!(
            net.predict(&[1.0, 2.0, 3.0]),
            Err(NetError::Dimension { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn evaluate_scores_argmax_and_loss() {
        let mut net = Network::initialize(2, &[LayerSpec::linear(2), LayerSpec::Softmax], &mut StdRng::seed_from_u64(0)).unwrap();
        // Identity weights: class 0 wins when x > y.
        if let Layer::Linear(l) = &mut net.layers_mut()[0] {
            *l = LinearLayer::with_parameters(Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]), vec![0.0, 0.0]);
        }
        let examples = vec![
            Example::one_hot(vec![2.0, 0.0], 0, 2),
            Example::one_hot(vec![0.0, 2.0], 1, 2),
            Example::one_hot(vec![0.0, 2.0], 0, 2),
            Example::one_hot(vec![3.0, 1.0], 0, 2),
        ];
        let eval = net.evaluate(&examples).unwrap();
        assert_abs_diff_eq!(eval.accuracy, 0.75, epsilon = 1e-12);

        let p = 1.0 / (1.0 + (-2.0f64).exp());
        let expected = (3.0 * -(p + 1e-12).ln() + -(1.0 - p + 1e-12).ln()) / 4.0;
        assert_abs_diff_eq!(eval.mean_loss, expected, epsilon = 1e-12);

        assert_eq!(net.evaluate(&[]).unwrap(), Evaluation { mean_loss: 0.0, accuracy: 0.0 });
    }

    #[test]
    fn accumulate_rejects_wrong_target_width() {
        let mut net = Network::initialize(2, &spiral_topology(), &mut StdRng::seed_from_u64(4)).unwrap();
        let bad = Example::new(vec![0.0, 0.0], vec![1.0, 0.0]);
        assert!(matches!(
            net.accumulate_gradients(&bad),
            Err(NetError::Dimension { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn whole_network_gradient_matches_finite_differences() {
        for loss in [LossType::CrossEntropy, LossType::Mse] {
            let mut net = Network::initialize(2, &spiral_topology(), &mut StdRng::seed_from_u64(11)).unwrap();
            net.loss = loss;
            let example = Example::one_hot(vec![0.4, -0.9], 1, 3);
            net.accumulate_gradients(&example).unwrap();

            let analytic = match &net.layers()[0] {
                Layer::Linear(l) => l.weights_grad().clone(),
                _ => unreachable!(),
            };
            let h = 1e-5;
            for r in 0..7 {
                for c in 0..2 {
                    let mut plus = net.clone();
                    let mut minus = net.clone();
                    if let Layer::Linear(l) = &mut plus.layers_mut()[0] { l.weights.data[r][c] += h; }
                    if let Layer::Linear(l) = &mut minus.layers_mut()[0] { l.weights.data[r][c] -= h; }
                    let lp = loss.loss(&plus.predict(&example.input).unwrap(), &example.output);
                    let lm = loss.loss(&minus.predict(&example.input).unwrap(), &example.output);
                    assert_abs_diff_eq!((lp - lm) / (2.0 * h), analytic.data[r][c], epsilon = 1e-4);
                }
            }
        }
    }
}
