pub mod clock;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;
pub mod trainer;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use epoch_stats::{EpochStats, TrainReport};
pub use train_config::TrainConfig;
pub use loop_fn::{train_loop, TrainState};
