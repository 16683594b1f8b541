use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::math::{matrix::Matrix, vector};

/// Fully connected layer: `output = W·input + b`.
///
/// `weights` has shape `[outputs × inputs]`; `biases` has length `outputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearLayer {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Matrix,
    pub biases: Vec<f64>,
    #[serde(skip)]
    weights_grad: Matrix,
    #[serde(skip)]
    biases_grad: Vec<f64>,
    /// Input of the last `forward`, consumed by the matching `backward`.
    #[serde(skip)]
    input: Vec<f64>,
}

impl LinearLayer {
    /// Xavier-initialized weights, zero biases.
    pub fn new<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Result<LinearLayer> {
        if inputs == 0 {
            return Err(NetError::Configuration("linear layer needs at least one input".into()));
        }
        if outputs == 0 {
            return Err(NetError::Configuration("linear layer needs at least one output".into()));
        }
        Ok(LinearLayer::with_parameters(Matrix::xavier(outputs, inputs, rng), vec![0.0; outputs]))
    }

    /// Builds a layer around existing parameters.  Shapes are taken from
    /// `weights`; `biases` must have one entry per weight row.
    ///
    /// # Panics
    ///
    /// Panics if `biases.len() != weights.rows`.
    pub fn with_parameters(weights: Matrix, biases: Vec<f64>) -> LinearLayer {
        assert_eq!(weights.rows, biases.len(), "bias length must equal weight rows");
        let (outputs, inputs) = (weights.rows, weights.cols);
        LinearLayer {
            inputs,
            outputs,
            weights,
            biases,
            weights_grad: Matrix::zeros(outputs, inputs),
            biases_grad: vec![0.0; outputs],
            input: Vec::new(),
        }
    }

    pub fn infer(&self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.mul_vec(input);
        vector::add_assign(&mut z, &self.biases);
        z
    }

    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let z = self.infer(input);
        self.input = input.to_vec();
        z
    }

    /// Accumulates `dW += g ⊗ x` and `db += g`, returns `Wᵀ·g`.
    pub fn backward(&mut self, output_grad: &[f64]) -> Vec<f64> {
        let input = std::mem::take(&mut self.input);
        assert_eq!(input.len(), self.inputs, "backward called without a matching forward");

        self.weights_grad.add_outer(output_grad, &input);
        vector::add_assign(&mut self.biases_grad, output_grad);
        self.weights.transpose_mul_vec(output_grad)
    }

    /// `param -= lr * accumulated / batch_len`, then clears the accumulators.
    pub fn apply_gradients(&mut self, learning_rate: f64, batch_len: usize) {
        if batch_len == 0 {
            return;
        }
        let scale = learning_rate / batch_len as f64;
        self.weights.sub_scaled(&self.weights_grad, scale);
        vector::sub_scaled(&mut self.biases, &self.biases_grad, scale);
        self.reset_gradients();
    }

    pub fn weights_grad(&self) -> &Matrix {
        &self.weights_grad
    }

    pub fn biases_grad(&self) -> &[f64] {
        &self.biases_grad
    }

    /// Zeroes (and, after deserialization, allocates) the accumulators.
    pub(crate) fn reset_gradients(&mut self) {
        if self.weights_grad.rows != self.outputs || self.weights_grad.cols != self.inputs {
            self.weights_grad = Matrix::zeros(self.outputs, self.inputs);
        } else {
            self.weights_grad.fill(0.0);
        }
        self.biases_grad.clear();
        self.biases_grad.resize(self.outputs, 0.0);
    }

    pub fn parameter_count(&self) -> usize {
        self.outputs * self.inputs + self.outputs
    }

    /// Shape and finiteness checks for parameters that came from outside.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err(format!("linear layer has empty shape {}x{}", self.outputs, self.inputs));
        }
        if self.weights.rows != self.outputs || self.weights.cols != self.inputs {
            return Err(format!(
                "linear weights declared {}x{} but layer is {}x{}",
                self.weights.rows, self.weights.cols, self.outputs, self.inputs
            ));
        }
        if !self.weights.is_well_formed() {
            return Err("linear weights are ragged or non-finite".into());
        }
        if self.biases.len() != self.outputs || !self.biases.iter().all(|b| b.is_finite()) {
            return Err(format!(
                "linear biases must be {} finite values, got {}",
                self.outputs,
                self.biases.len()
            ));
        }
        Ok(())
    }
}
