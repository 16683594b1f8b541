use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;

/// Stateless element-wise activation (`Tanh`, `Sigmoid`, `ReLU`, ...).
/// Input and output widths are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationLayer {
    pub function: ActivationFunction,
    pub size: usize,
    #[serde(skip)]
    input: Vec<f64>,
    #[serde(skip)]
    output: Vec<f64>,
}

impl ActivationLayer {
    pub fn new(function: ActivationFunction, size: usize) -> ActivationLayer {
        ActivationLayer { function, size, input: Vec::new(), output: Vec::new() }
    }

    pub fn infer(&self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.function.function(x)).collect()
    }

    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let output = self.infer(input);
        self.input = input.to_vec();
        self.output = output.clone();
        output
    }

    /// `g_in_i = g_out_i * f'(x_i)`; for Tanh that is `g_out_i * (1 - y_i²)`.
    pub fn backward(&mut self, output_grad: &[f64]) -> Vec<f64> {
        let input = std::mem::take(&mut self.input);
        let output = std::mem::take(&mut self.output);
        assert_eq!(input.len(), self.size, "backward called without a matching forward");
        assert_eq!(output_grad.len(), self.size, "gradient width mismatch");

        output_grad.iter()
            .zip(input.iter().zip(&output))
            .map(|(g, (&x, &y))| g * self.function.derivative(x, y))
            .collect()
    }
}
