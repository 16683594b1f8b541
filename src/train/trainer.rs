use std::time::Duration;

use rand::Rng;

use crate::data::example::Example;
use crate::error::Result;
use crate::network::network::Network;
use crate::train::clock::SystemClock;
use crate::train::epoch_stats::TrainReport;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;

impl Network {
    /// Trains on `training` for `time_budget` of wall-clock time, scoring
    /// `testing` after every epoch and once at the end.
    ///
    /// Uses the network's own `batch_size`, `learning_rate` and `loss`.  For a
    /// fake clock, a progress channel or other switches call `train_loop`.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        training: &[Example],
        testing: &[Example],
        time_budget: Duration,
        rng: &mut R,
    ) -> Result<TrainReport> {
        train_loop(self, training, testing, &TrainConfig::new(time_budget), &SystemClock::new(), rng)
    }
}
