pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{Layer, LinearLayer, ActivationLayer, SoftmaxLayer};
pub use network::{Evaluation, Network, NetworkSpec, LayerSpec};
pub use loss::{CrossEntropyLoss, MseLoss, LossType};
pub use optim::sgd::Sgd;
pub use train::{train_loop, Clock, EpochStats, SteppingClock, SystemClock, TrainConfig, TrainReport, TrainState};
pub use data::example::Example;
pub use error::{NetError, Result};
