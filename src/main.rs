// src/main.rs
//
// Thin harness around the randshoot library.
// All of the real logic lives in the lib crate (trainer, controllers,
// dynamics model).

use anyhow::Context;
use clap::Parser;

use randshoot::{make_env, train, Config, JsonlSink, NoopSink, TabularSink};

/// Command-line arguments for the randshoot binary.
#[derive(Parser, Debug)]
#[command(name = "randshoot")]
struct Cli {
    /// Environment name.
    #[arg(long, default_value = "point-mass")]
    env_name: String,

    /// Experiment name, recorded in the run parameters.
    #[arg(long, default_value = "mb_mpc")]
    exp_name: String,

    /// Master random seed.
    #[arg(long, default_value_t = 3)]
    seed: u64,

    /// Render each real environment step.
    #[arg(long)]
    render: bool,

    /// Learning rate for dynamics fitting.
    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f64,

    /// Number of on-policy aggregation iterations.
    #[arg(long, default_value_t = 10)]
    onpol_iters: usize,

    /// Dynamics-fit passes per aggregation iteration.
    #[arg(long, default_value_t = 60)]
    dyn_iters: usize,

    /// Minibatch size for dynamics fitting.
    #[arg(long, default_value_t = 512)]
    batch_size: usize,

    /// Number of random bootstrap trajectories.
    #[arg(long, default_value_t = 10)]
    random_paths: usize,

    /// Number of MPC trajectories per aggregation iteration.
    #[arg(long, default_value_t = 10)]
    onpol_paths: usize,

    /// Simulated candidate rollouts per MPC decision (K).
    #[arg(long, default_value_t = 1000)]
    simulated_paths: usize,

    /// Maximum timesteps per real episode.
    #[arg(long, default_value_t = 1000)]
    ep_len: usize,

    /// MPC planning horizon (H).
    #[arg(long, default_value_t = 15)]
    mpc_horizon: usize,

    /// Hidden layer count of the dynamics network.
    #[arg(long, default_value_t = 2)]
    n_layers: usize,

    /// Hidden layer width of the dynamics network.
    #[arg(long, default_value_t = 500)]
    size: usize,

    /// Optional JSONL path for run parameters + per-iteration metrics.
    #[arg(long)]
    log_jsonl: Option<String>,
}

/// Build the metric sink as a trait object so we can choose between
/// JsonlSink and NoopSink at runtime.
fn build_sink(log_jsonl: Option<&str>) -> Box<dyn TabularSink> {
    if let Some(path) = log_jsonl {
        match JsonlSink::create(path) {
            Ok(s) => Box::new(s),
            Err(err) => {
                eprintln!(
                    "Failed to create log file ({path}), \
                     falling back to NoopSink: {err}"
                );
                Box::new(NoopSink)
            }
        }
    } else {
        Box::new(NoopSink)
    }
}

fn build_config(cli: &Cli) -> Config {
    Config {
        env_name: cli.env_name.clone(),
        exp_name: cli.exp_name.clone(),
        seed: cli.seed,
        render: cli.render,
        learning_rate: cli.learning_rate,
        onpol_iters: cli.onpol_iters,
        dynamics_iters: cli.dyn_iters,
        batch_size: cli.batch_size,
        num_paths_random: cli.random_paths,
        num_paths_onpol: cli.onpol_paths,
        num_simulated_paths: cli.simulated_paths,
        env_horizon: cli.ep_len,
        mpc_horizon: cli.mpc_horizon,
        n_layers: cli.n_layers,
        hidden_size: cli.size,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = build_config(&cli);

    let (mut env, cost) = make_env(&cfg.env_name, cfg.seed)
        .with_context(|| format!("cannot construct environment '{}'", cfg.env_name))?;
    let mut sink = build_sink(cli.log_jsonl.as_deref());

    let summary = train(&cfg, env.as_mut(), cost.as_ref(), sink.as_mut())
        .context("training run failed")?;

    for record in &summary.records {
        println!(
            "iter {:>3}  cost {:>10.4}  return {:>10.4}  fit {:>6.2}s  sample {:>6.2}s",
            record.iteration,
            record.average_cost,
            record.average_return,
            record.fit_seconds,
            record.sample_seconds,
        );
    }
    println!(
        "done: {} iterations, {} trajectories collected",
        summary.records.len(),
        summary.num_trajectories
    );

    Ok(())
}
