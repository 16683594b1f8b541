use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::example::Example;
use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::clock::Clock;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::train_config::TrainConfig;

/// Lifecycle of one `train_loop` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    /// Epochs and batches are being processed.
    Running,
    /// A batch boundary found `elapsed >= time_budget`.
    BudgetExpired,
    /// Terminal; parameters reflect the last applied batch.
    Done,
}

/// Bookkeeping that lives only as long as one `train_loop` call.
struct TrainingRun {
    start: Duration,
    order: Vec<usize>,
    epochs_completed: usize,
    batches_completed: usize,
    elapsed: Duration,
    history: Vec<EpochStats>,
}

/// How far one pass over the shuffled training set got.
struct EpochOutcome {
    /// Mean loss of the epoch, present only if every batch was applied.
    train_loss: Option<f64>,
    budget_expired: bool,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch gradient descent until `config.time_budget`
/// is spent.
///
/// # Arguments
/// - `network`  — modified in place; its `batch_size`, `learning_rate` and `loss` apply
/// - `training` — examples to learn from, re-shuffled every epoch with `rng`
/// - `testing`  — held-out examples, scored for diagnostics only (may be empty)
/// - `config`   — time budget, evaluation switches, optional progress channel
/// - `clock`    — time source read once at start and once after every batch
/// - `rng`      — drives the per-epoch shuffle
///
/// The budget is the only stopping rule; there is no convergence check.
///
/// # Errors
/// `Configuration` for an empty training set, a zero batch size or a learning
/// rate that is not a positive finite number; `Dimension` for any example
/// whose widths do not fit the network.  Both are reported before anything
/// is modified.
pub fn train_loop<C, R>(
    network: &mut Network,
    training: &[Example],
    testing: &[Example],
    config: &TrainConfig,
    clock: &C,
    rng: &mut R,
) -> Result<TrainReport>
where
    C: Clock + ?Sized,
    R: Rng + ?Sized,
{
    validate(network, training, testing)?;

    tracing::info!(
        "Training {} parameters on {} examples ({} held out), batch size {}, learning rate {}, budget {:?}",
        network.parameter_count(),
        training.len(),
        testing.len(),
        network.batch_size,
        network.learning_rate,
        config.time_budget
    );

    let optimizer = Sgd::new(network.learning_rate);
    let mut run = TrainingRun {
        start: clock.now(),
        order: (0..training.len()).collect(),
        epochs_completed: 0,
        batches_completed: 0,
        elapsed: Duration::ZERO,
        history: Vec::new(),
    };
    let mut final_evaluation = None;
    let mut state = TrainState::Running;

    while state != TrainState::Done {
        state = match state {
            TrainState::Running => {
                let outcome = run_one_epoch(network, training, &optimizer, config, clock, &mut run, rng)?;
                if let Some(train_loss) = outcome.train_loss {
                    run.epochs_completed += 1;
                    record_epoch(network, testing, config, &mut run, train_loss)?;
                }
                if outcome.budget_expired {
                    TrainState::BudgetExpired
                } else {
                    TrainState::Running
                }
            }
            TrainState::BudgetExpired => {
                tracing::info!(
                    "Time budget spent after {} batches ({} full epochs) in {:?}",
                    run.batches_completed,
                    run.epochs_completed,
                    run.elapsed
                );
                if config.final_evaluation && !testing.is_empty() {
                    let eval = network.evaluate(testing)?;
                    tracing::info!(
                        "Held-out loss {:.6}, accuracy {:.2}%",
                        eval.mean_loss,
                        eval.accuracy * 100.0
                    );
                    final_evaluation = Some(eval);
                }
                TrainState::Done
            }
            TrainState::Done => TrainState::Done,
        };
    }

    Ok(TrainReport {
        epochs_completed: run.epochs_completed,
        batches_completed: run.batches_completed,
        elapsed: run.elapsed,
        history: run.history,
        final_evaluation,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn validate(network: &Network, training: &[Example], testing: &[Example]) -> Result<()> {
    if training.is_empty() {
        return Err(NetError::Configuration("training set is empty".into()));
    }
    if network.batch_size == 0 {
        return Err(NetError::Configuration("batch size must be at least 1".into()));
    }
    if !(network.learning_rate.is_finite() && network.learning_rate > 0.0) {
        return Err(NetError::Configuration(format!(
            "learning rate must be a positive number, got {}",
            network.learning_rate
        )));
    }
    for example in training.iter().chain(testing) {
        network.check_example(example)?;
    }
    Ok(())
}

/// One shuffled pass, stopping early at the first batch boundary where the
/// budget is spent.
fn run_one_epoch<C, R>(
    network: &mut Network,
    training: &[Example],
    optimizer: &Sgd,
    config: &TrainConfig,
    clock: &C,
    run: &mut TrainingRun,
    rng: &mut R,
) -> Result<EpochOutcome>
where
    C: Clock + ?Sized,
    R: Rng + ?Sized,
{
    run.order.shuffle(rng);

    let batch_count = run.order.len().div_ceil(network.batch_size);
    let mut total_loss = 0.0;

    for (i, batch) in run.order.chunks(network.batch_size).enumerate() {
        for &idx in batch {
            total_loss += network.accumulate_gradients(&training[idx])?;
        }
        optimizer.step(network, batch.len());
        run.batches_completed += 1;

        run.elapsed = clock.now().saturating_sub(run.start);
        if run.elapsed >= config.time_budget {
            let finished_epoch = i + 1 == batch_count;
            return Ok(EpochOutcome {
                train_loss: finished_epoch.then(|| total_loss / training.len() as f64),
                budget_expired: true,
            });
        }
    }

    Ok(EpochOutcome {
        train_loss: Some(total_loss / training.len() as f64),
        budget_expired: false,
    })
}

fn record_epoch(
    network: &Network,
    testing: &[Example],
    config: &TrainConfig,
    run: &mut TrainingRun,
    train_loss: f64,
) -> Result<()> {
    let (test_loss, test_accuracy) = if config.evaluate_every_epoch && !testing.is_empty() {
        let eval = network.evaluate(testing)?;
        (Some(eval.mean_loss), Some(eval.accuracy))
    } else {
        (None, None)
    };

    let stats = EpochStats {
        epoch: run.epochs_completed,
        train_loss,
        test_loss,
        test_accuracy,
        elapsed_ms: run.elapsed.as_millis() as u64,
    };
    tracing::debug!(
        "Epoch {}: train loss {:.6}, test loss {:?}, test accuracy {:?}",
        stats.epoch,
        stats.train_loss,
        stats.test_loss,
        stats.test_accuracy
    );

    if let Some(ref tx) = config.progress_tx {
        // A dropped receiver only means nobody is listening any more.
        let _ = tx.send(stats.clone());
    }
    run.history.push(stats);
    Ok(())
}
