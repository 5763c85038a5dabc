// src/config.rs
//
// Central experiment configuration.
//
// This is the single source of truth for every knob the aggregation loop
// and the MPC controller consume. The binary builds one of these from CLI
// arguments on top of `Config::default()` and it is immutable for the
// lifetime of a run; no ambient/global state.

use serde::Serialize;

/// Immutable experiment configuration for one training run.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Environment name (resolved by `env::make_env`).
    pub env_name: String,
    /// Experiment name, recorded in the run parameters.
    pub exp_name: String,
    /// Master random seed. Env, model and controller RNG streams are
    /// derived from this, so same seed + same config => same run.
    pub seed: u64,
    /// Call the environment's render hook on every real step.
    pub render: bool,
    /// Learning rate for dynamics fitting.
    pub learning_rate: f64,
    /// Number of on-policy aggregation iterations.
    pub onpol_iters: usize,
    /// Number of full passes over the transition set per dynamics fit.
    pub dynamics_iters: usize,
    /// Minibatch size for dynamics fitting.
    pub batch_size: usize,
    /// Number of random-policy bootstrap trajectories.
    pub num_paths_random: usize,
    /// Number of MPC trajectories collected per aggregation iteration.
    pub num_paths_onpol: usize,
    /// Number of simulated candidate rollouts per MPC decision (K).
    pub num_simulated_paths: usize,
    /// Maximum timesteps per real episode.
    pub env_horizon: usize,
    /// MPC planning horizon (H), in imagined timesteps.
    pub mpc_horizon: usize,
    /// Hidden layer count of the dynamics network.
    pub n_layers: usize,
    /// Hidden layer width of the dynamics network.
    pub hidden_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_name: "point-mass".to_string(),
            exp_name: "mb_mpc".to_string(),
            seed: 3,
            render: false,
            learning_rate: 1e-3,
            onpol_iters: 10,
            dynamics_iters: 60,
            batch_size: 512,
            num_paths_random: 10,
            num_paths_onpol: 10,
            num_simulated_paths: 1000,
            env_horizon: 1000,
            mpc_horizon: 15,
            n_layers: 2,
            hidden_size: 500,
        }
    }
}

impl Config {
    /// Validate structural configuration before the run starts.
    ///
    /// Non-positive counts and horizons are never silently corrected: a
    /// bad configuration aborts immediately with the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: usize) -> Result<(), ConfigError> {
            if value == 0 {
                Err(ConfigError::NonPositive { field })
            } else {
                Ok(())
            }
        }

        positive("onpol_iters", self.onpol_iters)?;
        positive("dynamics_iters", self.dynamics_iters)?;
        positive("batch_size", self.batch_size)?;
        positive("num_paths_random", self.num_paths_random)?;
        positive("num_paths_onpol", self.num_paths_onpol)?;
        positive("num_simulated_paths", self.num_simulated_paths)?;
        positive("env_horizon", self.env_horizon)?;
        positive("mpc_horizon", self.mpc_horizon)?;
        positive("n_layers", self.n_layers)?;
        positive("hidden_size", self.hidden_size)?;

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidLearningRate {
                value: self.learning_rate,
            });
        }

        Ok(())
    }
}

/// Structural configuration errors. These abort the run at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count or horizon that must be >= 1 was zero.
    NonPositive { field: &'static str },
    /// Learning rate must be finite and strictly positive.
    InvalidLearningRate { value: f64 },
    /// Environment name not recognized by the registry.
    UnknownEnv { name: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositive { field } => {
                write!(f, "config field '{}' must be >= 1", field)
            }
            ConfigError::InvalidLearningRate { value } => {
                write!(f, "learning rate must be finite and > 0, got {}", value)
            }
            ConfigError::UnknownEnv { name } => {
                write!(f, "unknown environment '{}'", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
