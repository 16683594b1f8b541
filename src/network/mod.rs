pub mod network;
pub mod persist;
pub mod spec;

pub use network::{Evaluation, Network};
pub use spec::{NetworkSpec, LayerSpec};
