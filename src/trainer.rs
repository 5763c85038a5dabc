// src/trainer.rs
//
// On-policy data aggregation loop.
//
// Bootstrapping: random rollouts -> normalization statistics -> dynamics
// model + MPC controller. Then N iterations of
//   fit (on ALL data so far) -> sample with MPC -> append to dataset,
// recording cost/return statistics and wall-clock timers per iteration.
//
// Every refit deliberately pools the full cumulative dataset with no
// mixing ratio or down-weighting of older data; iteration count is the
// sole termination condition.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::controller::{MpcController, RandomController};
use crate::cost::{trajectory_cost, CostFn};
use crate::dynamics::{DynamicsModel, MlpConfig, MlpDynamics};
use crate::env::Environment;
use crate::logging::TabularSink;
use crate::normalization::NormStats;
use crate::sampler::sample_rollouts;
use crate::types::{DataError, Trajectory};

/// Metrics recorded for one aggregation iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    // Planning-cost statistics of the on-policy trajectories.
    pub average_cost: f64,
    pub std_cost: f64,
    pub minimum_cost: f64,
    pub maximum_cost: f64,
    // True environment return statistics of the same trajectories.
    pub average_return: f64,
    pub std_return: f64,
    pub minimum_return: f64,
    pub maximum_return: f64,
    // Wall-clock timers.
    pub fit_seconds: f64,
    pub sample_seconds: f64,
    /// Final dynamics-fit loss this iteration (diagnostic).
    pub dynamics_loss: f64,
    /// Cumulative dataset size (trajectories) after aggregation.
    pub num_trajectories: usize,
}

/// Result of a full training run.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    /// One record per aggregation iteration, in order.
    pub records: Vec<IterationRecord>,
    /// Total trajectories in the final dataset (random + on-policy).
    pub num_trajectories: usize,
}

/// Errors that abort a training run.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    Config(ConfigError),
    Data(DataError),
}

impl From<ConfigError> for TrainError {
    fn from(e: ConfigError) -> Self {
        TrainError::Config(e)
    }
}

impl From<DataError> for TrainError {
    fn from(e: DataError) -> Self {
        TrainError::Data(e)
    }
}

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainError::Config(e) => write!(f, "configuration error: {}", e),
            TrainError::Data(e) => write!(f, "data error: {}", e),
        }
    }
}

impl std::error::Error for TrainError {}

/// Run the full model-based RL loop: bootstrap, then `onpol_iters`
/// rounds of refit + on-policy aggregation.
pub fn train(
    cfg: &Config,
    env: &mut dyn Environment,
    cost: &dyn CostFn,
    sink: &mut dyn TabularSink,
) -> Result<TrainSummary, TrainError> {
    cfg.validate()?;
    sink.save_params(cfg);

    // Bootstrap dataset from the random controller. The environment
    // itself is seeded with cfg.seed by its constructor; every other
    // consumer gets its own derived stream.
    let mut random_controller = RandomController::new(env, cfg.seed.wrapping_add(1));
    let mut dataset: Vec<Trajectory> = sample_rollouts(
        env,
        &mut random_controller,
        cfg.num_paths_random,
        cfg.env_horizon,
        cfg.render,
    );

    // Normalization statistics come from the random dataset only and
    // stay fixed for the rest of the run.
    let stats = NormStats::from_dataset(&dataset)?;

    let model = MlpDynamics::new(
        env.obs_dim(),
        env.action_dim(),
        stats,
        MlpConfig::from_config(cfg),
        cfg.seed.wrapping_add(2),
    );
    let mut mpc = MpcController::new(
        model,
        cost,
        env,
        cfg.mpc_horizon,
        cfg.num_simulated_paths,
        cfg.seed.wrapping_add(3),
    );

    let mut records = Vec::with_capacity(cfg.onpol_iters);
    for iteration in 0..cfg.onpol_iters {
        // Refit on everything collected so far.
        let fit_start = Instant::now();
        let losses = mpc.model_mut().fit(&dataset)?;
        let fit_seconds = fit_start.elapsed().as_secs_f64();

        // On-policy rollouts under the refit model.
        let sample_start = Instant::now();
        let onpol = sample_rollouts(
            env,
            &mut mpc,
            cfg.num_paths_onpol,
            cfg.env_horizon,
            cfg.render,
        );
        let sample_seconds = sample_start.elapsed().as_secs_f64();

        let costs: Vec<f64> = onpol.iter().map(|t| trajectory_cost(cost, t)).collect();
        let returns: Vec<f64> = onpol.iter().map(Trajectory::total_reward).collect();

        dataset.extend(onpol);

        let record = IterationRecord {
            iteration,
            average_cost: mean(&costs),
            std_cost: std(&costs),
            minimum_cost: min(&costs),
            maximum_cost: max(&costs),
            average_return: mean(&returns),
            std_return: std(&returns),
            minimum_return: min(&returns),
            maximum_return: max(&returns),
            fit_seconds,
            sample_seconds,
            dynamics_loss: losses.last().copied().unwrap_or(f64::NAN),
            num_trajectories: dataset.len(),
        };
        sink.log_row(&record);
        records.push(record);
    }

    Ok(TrainSummary {
        num_trajectories: dataset.len(),
        records,
    })
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn std(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64).sqrt()
}

fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
