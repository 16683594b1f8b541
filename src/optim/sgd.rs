use crate::network::network::Network;

/// Plain mini-batch gradient descent.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one averaged update to every layer from the gradients
    /// accumulated over `batch_len` examples, then clears the accumulators.
    /// `batch_len` is the true number of examples, so a short final batch is
    /// averaged over what it actually contains.
    pub fn step(&self, network: &mut Network, batch_len: usize) {
        for layer in network.layers_mut() {
            layer.apply_gradients(self.learning_rate, batch_len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example::Example;
    use crate::layers::Layer;
    use crate::network::spec::LayerSpec;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn step_applies_mean_of_per_example_gradients() {
        let mut net = Network::initialize(2, &[LayerSpec::linear(3), LayerSpec::Softmax], &mut StdRng::seed_from_u64(2)).unwrap();
        let batch = [
            Example::one_hot(vec![1.0, 0.5], 0, 3),
            Example::one_hot(vec![-0.3, 0.8], 2, 3),
            Example::one_hot(vec![0.0, -1.0], 1, 3),
        ];

        // Per-example gradients taken one at a time from the untouched network.
        let mut summed = vec![vec![0.0; 2]; 3];
        for example in &batch {
            let mut single = net.clone();
            single.accumulate_gradients(example).unwrap();
            if let Layer::Linear(l) = &single.layers()[0] {
                for (acc, g) in summed.iter_mut().flatten().zip(l.weights_grad().data.iter().flatten()) {
                    *acc += g;
                }
            }
        }

        let before = match &net.layers()[0] { Layer::Linear(l) => l.weights.clone(), _ => unreachable!() };
        for example in &batch {
            net.accumulate_gradients(example).unwrap();
        }
        Sgd::new(0.5).step(&mut net, batch.len());

        let Layer::Linear(after) = &net.layers()[0] else { unreachable!() };
        for r in 0..3 {
            for c in 0..2 {
                let expected = before.data[r][c] - 0.5 * summed[r][c] / 3.0;
                assert_abs_diff_eq!(after.weights.data[r][c], expected, epsilon = 1e-12);
            }
        }
        assert!(after.weights_grad().data.iter().flatten().all(|&g| g == 0.0));
    }
}
