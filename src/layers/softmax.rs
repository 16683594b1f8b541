use serde::{Serialize, Deserialize};

use crate::math::vector;

/// Vector-valued softmax.  Usually the last layer of a classifier trained
/// with cross-entropy, in which case the trainer calls
/// `backward_cross_entropy` and the Jacobian never appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxLayer {
    pub size: usize,
    #[serde(skip)]
    output: Vec<f64>,
}

impl SoftmaxLayer {
    pub fn new(size: usize) -> SoftmaxLayer {
        SoftmaxLayer { size, output: Vec::new() }
    }

    /// `exp(x_i - max) / Σ exp(x_j - max)`.
    pub fn infer(&self, input: &[f64]) -> Vec<f64> {
        let max = vector::max(input);
        let exps: Vec<f64> = input.iter().map(|&x| (x - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    }

    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let output = self.infer(input);
        self.output = output.clone();
        output
    }

    /// Jacobian-vector product `s_i * (g_i - Σ_j g_j s_j)`, in O(n).
    pub fn backward(&mut self, output_grad: &[f64]) -> Vec<f64> {
        let s = self.take_output();
        let weighted = vector::dot(output_grad, &s);
        s.iter().zip(output_grad).map(|(s_i, g_i)| s_i * (g_i - weighted)).collect()
    }

    /// Gradient of `cross_entropy(softmax(x), target)` w.r.t. `x`, which
    /// collapses to `softmax(x) - target`.
    pub fn backward_cross_entropy(&mut self, target: &[f64]) -> Vec<f64> {
        let s = self.take_output();
        assert_eq!(target.len(), self.size, "target width mismatch");
        s.iter().zip(target).map(|(p, t)| p - t).collect()
    }

    fn take_output(&mut self) -> Vec<f64> {
        let s = std::mem::take(&mut self.output);
        assert_eq!(s.len(), self.size, "backward called without a matching forward");
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn huge_logits_do_not_overflow() {
        let s = SoftmaxLayer::new(3).infer(&[1000.0, 1000.0, -1000.0]);
        assert_abs_diff_eq!(s[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(s[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(s[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn outputs_sum_to_one() {
        let s = SoftmaxLayer::new(4).infer(&[0.3, -1.2, 2.5, 0.0]);
        assert_abs_diff_eq!(s.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(s.iter().all(|&p| p > 0.0));
    }
}
