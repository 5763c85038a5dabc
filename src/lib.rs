//! Randshoot: model-based reinforcement learning via random-shooting MPC.
//!
//! The crate learns a one-step forward dynamics model from rollout data
//! and uses it inside a planning-time model-predictive controller, with
//! DAgger-style on-policy data aggregation. The binary (`src/main.rs`)
//! is just a thin CLI harness around these components.
//!
//! # Architecture
//!
//! - **Types** (`types`): trajectories and dataset flattening helpers.
//! - **Normalization** (`normalization`): fixed mean/std statistics
//!   computed once from the bootstrap dataset.
//! - **Dynamics** (`dynamics`): `DynamicsModel` capability trait and an
//!   MLP implementation predicting normalized state deltas.
//! - **Cost** (`cost`): per-step cost, scalar and batched.
//! - **Controllers** (`controller`): uniform `RandomController` for
//!   bootstrap data, `MpcController` for random-shooting planning.
//! - **Sampler** (`sampler`): episodic rollout collection.
//! - **Trainer** (`trainer`): the aggregation loop (fit on all data,
//!   sample on-policy, append, repeat).
//! - **Logging** (`logging`): tabular metric sinks (noop / JSONL).

pub mod config;
pub mod controller;
pub mod cost;
pub mod dynamics;
pub mod env;
pub mod logging;
pub mod normalization;
pub mod sampler;
pub mod trainer;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::{Config, ConfigError};

pub use controller::{select_best, Controller, MpcController, RandomController};

pub use cost::{trajectory_cost, CostFn, QuadraticCost};

pub use dynamics::{DynamicsModel, MlpConfig, MlpDynamics};

pub use env::{make_env, Environment, PointMassEnv, StepResult};

pub use logging::{JsonlSink, NoopSink, TabularSink};

pub use normalization::{NormStats, STD_EPS};

pub use sampler::sample_rollouts;

pub use trainer::{train, IterationRecord, TrainError, TrainSummary};

pub use types::{num_transitions, stack_transitions, DataError, Trajectory};
