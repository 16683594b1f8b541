use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

/// Dense row-major matrix.  `data[r][c]` is row `r`, column `c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Keeps the variance of activations and gradients roughly equal across
    /// layers for Tanh/Sigmoid networks.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (1.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.len());
        assert!(data.iter().all(|row| row.len() == cols), "ragged matrix rows");
        Matrix { rows, cols, data }
    }

    /// `self · v` for a column vector `v` of length `cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.cols, "Matrix and vector are of incorrect sizes");
        self.data.iter().map(|row| super::vector::dot(row, v)).collect()
    }

    /// `selfᵀ · v` for a column vector `v` of length `rows`, without
    /// materializing the transpose.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.rows, "Matrix and vector are of incorrect sizes");
        let mut res = vec![0.0; self.cols];
        for (row, &scale) in self.data.iter().zip(v) {
            for (acc, &x) in res.iter_mut().zip(row) {
                *acc += x * scale;
            }
        }
        res
    }

    /// Adds the outer product `a ⊗ b` in place: `self[i][j] += a[i] * b[j]`.
    pub fn add_outer(&mut self, a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), self.rows, "outer product rows mismatch");
        assert_eq!(b.len(), self.cols, "outer product cols mismatch");
        for (row, &ai) in self.data.iter_mut().zip(a) {
            for (cell, &bj) in row.iter_mut().zip(b) {
                *cell += ai * bj;
            }
        }
    }

    /// `self -= scale * other`, element-wise.
    pub fn sub_scaled(&mut self, other: &Matrix, scale: f64) {
        assert!(self.rows == other.rows && self.cols == other.cols, "Matrices are of incorrect sizes");
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            super::vector::sub_scaled(row, other_row, scale);
        }
    }

    pub fn fill(&mut self, value: f64) {
        for row in &mut self.data {
            row.iter_mut().for_each(|x| *x = value);
        }
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// True when every entry is finite and every row has `cols` entries.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows
            && self.data.iter().all(|row| row.len() == self.cols && row.iter().all(|x| x.is_finite()))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
