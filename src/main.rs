//! Three-arm spiral classification demo for lossless-nn.
//!
//! Architecture: 2 → 7 (Linear) → Tanh → 3 (Linear) → Softmax
//! Loss:         cross-entropy (combined with Softmax — gradient is predicted - expected)
//! Batch size:   32, learning rate 1.0, 10 second budget (all overridable)
//!
//! Run with:
//!   cargo run --release -- --seconds 10
//!
//! The trained model lands in `savednetworks/MyMLP.json` and a readable
//! report in `savednetworks/MyMLP.txt`.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use lossless_nn::{Example, LayerSpec, Network, NetworkSpec};

#[derive(Parser, Debug)]
#[command(name = "lossless-nn", about = "Train a small classifier on a three-arm spiral")]
struct Cli {
    /// Wall-clock training budget in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Examples per gradient step [default: 32, or the architecture file's].
    #[arg(long)]
    batch_size: Option<usize>,

    /// Gradient descent step size [default: 1.0, or the architecture file's].
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Seed for dataset shuffling, weight initialization and batch order.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of spiral points used for training; the rest are held out.
    #[arg(long, default_value_t = 120)]
    train_size: usize,

    /// Optional NetworkSpec JSON replacing the built-in topology.
    #[arg(long)]
    architecture: Option<String>,

    #[arg(long, default_value = "savednetworks")]
    out_dir: String,

    #[arg(long, default_value = "MyMLP")]
    name: String,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Three interleaved spiral arms, 2.049 radians apart, one class each.
fn spiral_dataset(rng: &mut StdRng) -> Vec<Example> {
    let mut points = Vec::new();
    let mut r = 0.2;
    while r < 3.0 {
        for (class, offset) in [0.0, 2.049, -2.049].into_iter().enumerate() {
            let angle: f64 = r + offset;
            points.push(Example::one_hot(vec![r * angle.sin(), r * angle.cos()], class, 3));
        }
        r += 0.05;
    }
    points.shuffle(rng);
    points
}

fn build_network(cli: &Cli, rng: &mut StdRng) -> Result<Network> {
    let mut network = match &cli.architecture {
        Some(path) => NetworkSpec::load_json(path)
            .and_then(|spec| spec.build(rng))
            .with_context(|| format!("Cannot build network from '{}'", path))?,
        None => {
            let mut network = Network::initialize(
                2,
                &[LayerSpec::linear(7), LayerSpec::tanh(), LayerSpec::linear(3), LayerSpec::Softmax],
                rng,
            )?;
            network.batch_size = 32;
            network.learning_rate = 1.0;
            network
        }
    };
    if let Some(batch_size) = cli.batch_size {
        network.batch_size = batch_size;
    }
    if let Some(learning_rate) = cli.learning_rate {
        network.learning_rate = learning_rate;
    }
    Ok(network)
}

/// `--seconds` as a `Duration`.  Negative, NaN and overflowing values are
/// errors rather than panics.
fn time_budget(seconds: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(budget) => Ok(budget),
        Err(e) => bail!("--seconds must be a non-negative, representable number of seconds, got {}: {}", seconds, e),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lossless_nn=info")),
        )
        .init();

    let cli = Cli::parse();
    let budget = time_budget(cli.seconds)?;

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let data = spiral_dataset(&mut rng);
    if cli.train_size == 0 || cli.train_size > data.len() {
        bail!("--train-size must be between 1 and {}", data.len());
    }
    let (training, testing) = data.split_at(cli.train_size);

    let mut network = build_network(&cli, &mut rng)?;
    let report = network
        .train(training, testing, budget, &mut rng)
        .context("Training failed")?;

    if let Some(eval) = report.final_evaluation {
        println!(
            "{} epochs ({} batches): held-out loss {:.4}, accuracy {:.1}%",
            report.epochs_completed,
            report.batches_completed,
            eval.mean_loss,
            eval.accuracy * 100.0
        );
    }

    network
        .save(&cli.out_dir, &cli.name)
        .with_context(|| format!("Cannot save network to '{}'", cli.out_dir))?;
    network
        .pretty_print(&cli.out_dir, &cli.name)
        .with_context(|| format!("Cannot write report to '{}'", cli.out_dir))?;
    Ok(())
}
