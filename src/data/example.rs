use serde::{Serialize, Deserialize};

/// One labeled sample: an input vector and the target the network should
/// produce for it (typically a one-hot class label).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

impl Example {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Example {
        Example { input, output }
    }

    /// Builds an example whose target is a one-hot vector of `classes`
    /// entries with `label` set.
    ///
    /// # Panics
    ///
    /// Panics if `label >= classes`.
    pub fn one_hot(input: Vec<f64>, label: usize, classes: usize) -> Example {
        assert!(label < classes, "label {} out of range for {} classes", label, classes);
        let mut output = vec![0.0; classes];
        output[label] = 1.0;
        Example { input, output }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_sets_single_entry() {
        let e = Example::one_hot(vec![0.5, -0.5], 2, 3);
        assert_eq!(e.output, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn one_hot_panics_on_label_past_last_class() {
        Example::one_hot(vec![0.0], 3, 3);
    }
}
