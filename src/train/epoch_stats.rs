use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::network::network::Evaluation;

/// Per-epoch training statistics emitted by `train_loop`.
///
/// Sent on `TrainConfig::progress_tx` (when set) at the end of every
/// completed epoch, and collected in `TrainReport::history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean training loss over the epoch, measured during the forward passes.
    pub train_loss: f64,
    /// Mean held-out loss; `None` when there is no held-out set or per-epoch
    /// evaluation is disabled.
    pub test_loss: Option<f64>,
    /// Held-out accuracy as a fraction in [0, 1].
    pub test_accuracy: Option<f64>,
    /// Time since training started, in milliseconds.
    pub elapsed_ms: u64,
}

/// Summary returned by `train_loop` once it reaches `Done`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Epochs whose every batch was applied.
    pub epochs_completed: usize,
    /// Optimizer steps applied, including those of a partial final epoch.
    pub batches_completed: usize,
    /// Elapsed time at the batch boundary where the budget was found spent.
    pub elapsed: Duration,
    pub history: Vec<EpochStats>,
    /// Held-out score after the budget expired, if requested and possible.
    pub final_evaluation: Option<Evaluation>,
}
