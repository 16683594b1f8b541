//! Free functions over `&[f64]` vectors.

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Vectors are of incorrect sizes");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `a += b`, element-wise.
pub fn add_assign(a: &mut [f64], b: &[f64]) {
    assert_eq!(a.len(), b.len(), "Vectors are of incorrect sizes");
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
}

/// `a -= scale * b`, element-wise.
pub fn sub_scaled(a: &mut [f64], b: &[f64], scale: f64) {
    assert_eq!(a.len(), b.len(), "Vectors are of incorrect sizes");
    for (x, y) in a.iter_mut().zip(b) {
        *x -= scale * y;
    }
}

/// Index of the maximum element in a slice.  Ties and NaNs resolve to the
/// earlier index; an empty slice yields 0.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] {
            best = i;
        }
    }
    best
}

/// Largest element, or `-inf` for an empty slice.
pub fn max(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
