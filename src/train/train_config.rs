use std::sync::mpsc;
use std::time::Duration;

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `time_budget`          — wall-clock time after which training stops; checked
///                            after every batch, so the last batch always completes
/// - `evaluate_every_epoch` — score the held-out set after each completed epoch
///                            (diagnostic only, never affects control flow)
/// - `final_evaluation`     — score the held-out set once more when the budget expires
/// - `progress_tx`          — optional channel sender; one `EpochStats` is sent per
///                            completed epoch.  A dropped receiver is ignored.
pub struct TrainConfig {
    pub time_budget: Duration,
    pub evaluate_every_epoch: bool,
    pub final_evaluation: bool,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with both evaluations enabled and no progress channel.
    pub fn new(time_budget: Duration) -> Self {
        TrainConfig {
            time_budget,
            evaluate_every_epoch: true,
            final_evaluation: true,
            progress_tx: None,
        }
    }
}
