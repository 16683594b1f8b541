use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lossless_nn::{
    train_loop, Example, Layer, LayerSpec, LossType, NetError, Network, NetworkSpec, SteppingClock, TrainConfig,
};

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lossless-nn-it-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

/// Two well separated Gaussian-ish blobs, labeled by quadrant.
fn blobs(rng: &mut StdRng, n: usize) -> Vec<Example> {
    use rand::Rng;
    (0..n)
        .map(|i| {
            let class = i % 2;
            let centre = if class == 0 { 1.5 } else { -1.5 };
            let x = centre + rng.gen_range(-0.5..0.5);
            let y = centre + rng.gen_range(-0.5..0.5);
            Example::one_hot(vec![x, y], class, 2)
        })
        .collect()
}

fn mlp(rng: &mut StdRng) -> Network {
    let mut net = Network::initialize(
        2,
        &[LayerSpec::linear(6), LayerSpec::tanh(), LayerSpec::linear(2), LayerSpec::Softmax],
        rng,
    )
    .unwrap();
    net.batch_size = 8;
    net.learning_rate = 0.5;
    net
}

#[test]
fn train_save_load_predict_end_to_end() {
    let mut rng = StdRng::seed_from_u64(2024);
    let training = blobs(&mut rng, 64);
    let testing = blobs(&mut rng, 16);
    let mut net = mlp(&mut rng);

    let clock = SteppingClock::new(Duration::from_millis(10));
    let report = train_loop(&mut net, &training, &testing, &TrainConfig::new(Duration::from_secs(2)), &clock, &mut rng).unwrap();
    assert_eq!(report.batches_completed, 200);
    assert_eq!(report.epochs_completed, 25);

    let eval = report.final_evaluation.unwrap();
    assert_eq!(eval.accuracy, 1.0);
    assert!(eval.mean_loss < report.history[0].test_loss.unwrap());

    let dir = scratch_dir("e2e");
    net.save(&dir, "blobs").unwrap();
    net.pretty_print(&dir, "blobs").unwrap();
    let loaded = Network::load(&dir, "blobs").unwrap();

    for example in &testing {
        assert_eq!(loaded.predict(&example.input).unwrap(), net.predict(&example.input).unwrap());
    }
    assert_eq!(loaded.evaluate(&testing).unwrap(), net.evaluate(&testing).unwrap());
    assert!(fs::read_to_string(Network::report_path(&dir, "blobs")).unwrap().contains("Softmax"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn loaded_network_keeps_training_like_the_original() {
    let mut rng = StdRng::seed_from_u64(5);
    let training = blobs(&mut rng, 20);
    let mut original = mlp(&mut rng);

    let dir = scratch_dir("resume");
    original.save(&dir, "start").unwrap();
    let mut reloaded = Network::load(&dir, "start").unwrap();
    fs::remove_dir_all(&dir).unwrap();

    let config = TrainConfig::new(Duration::from_secs(12));
    let step = Duration::from_secs(1);
    train_loop(&mut original, &training, &[], &config, &SteppingClock::new(step), &mut StdRng::seed_from_u64(1)).unwrap();
    train_loop(&mut reloaded, &training, &[], &config, &SteppingClock::new(step), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(original, reloaded);
}

#[test]
fn mse_regression_with_identity_output() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut net = Network::initialize(1, &[LayerSpec::linear(1)], &mut rng).unwrap();
    net.loss = LossType::Mse;
    net.batch_size = 4;
    net.learning_rate = 0.1;

    // y = 3x - 1
    let data: Vec<Example> = (0..8)
        .map(|i| {
            let x = i as f64 / 4.0 - 1.0;
            Example::new(vec![x], vec![3.0 * x - 1.0])
        })
        .collect();

    let clock = SteppingClock::new(Duration::from_secs(1));
    train_loop(&mut net, &data, &[], &TrainConfig::new(Duration::from_secs(2000)), &clock, &mut rng).unwrap();

    let Layer::Linear(l) = &net.layers()[0] else { panic!("expected a linear layer") };
    assert_abs_diff_eq!(l.weights.data[0][0], 3.0, epsilon = 1e-3);
    assert_abs_diff_eq!(l.biases[0], -1.0, epsilon = 1e-3);
}

#[test]
fn network_spec_file_builds_the_same_topology() {
    let dir = scratch_dir("spec");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("arch.json");
    let path = path.to_str().unwrap();

    let mut spec = NetworkSpec::new(2, vec![LayerSpec::linear(7), LayerSpec::tanh(), LayerSpec::linear(3), LayerSpec::Softmax]);
    spec.learning_rate = 1.0;
    spec.save_json(path).unwrap();
    let back = NetworkSpec::load_json(path).unwrap();
    assert_eq!(back, spec);

    let a = back.build(&mut StdRng::seed_from_u64(3)).unwrap();
    let b = Network::initialize(2, &spec.layers, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(a.layers(), b.layers());
    assert_eq!(a.learning_rate, 1.0);

    fs::write(path, "[1, 2").unwrap();
    assert!(matches!(NetworkSpec::load_json(path), Err(NetError::CorruptFormat(_))));
    fs::remove_dir_all(&dir).unwrap();
}
