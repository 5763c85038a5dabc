// src/types.rs
//
// Core data types for the model-based RL pipeline.
//
// - Trajectory: one episode's recorded (obs, act, next_obs, reward) arrays
// - Dataset helpers: flattening trajectories into transition matrices
// - DataError: fail-fast errors for operations that are undefined on
//   empty data (normalization, model fitting)
//
// Trajectories store timesteps as rows of contiguous ndarray buffers so
// that normalization and dynamics fitting can operate on whole batches
// without per-transition allocation.

use ndarray::{s, Array1, Array2};

/// One episode's recorded rollout.
///
/// Invariant: `observations`, `actions`, `next_observations` and `rewards`
/// all have the same number of rows (timesteps). Early-terminated episodes
/// are truncated, never padded.
///
/// Immutable once collected; owned by the dataset that aggregates it.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// States visited, one row per timestep (T x obs_dim).
    pub observations: Array2<f64>,
    /// Actions taken, one row per timestep (T x act_dim).
    pub actions: Array2<f64>,
    /// States observed after each action (T x obs_dim).
    pub next_observations: Array2<f64>,
    /// Per-step environment reward (T).
    pub rewards: Array1<f64>,
}

impl Trajectory {
    /// Number of timesteps in this trajectory.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Total environment return (sum of rewards). Used for reporting only;
    /// the planner minimizes cost, not reward.
    pub fn total_reward(&self) -> f64 {
        self.rewards.sum()
    }
}

/// Total number of transitions across all trajectories in a dataset.
pub fn num_transitions(dataset: &[Trajectory]) -> usize {
    dataset.iter().map(|t| t.len()).sum()
}

/// Flatten a dataset into (observations, actions, next_observations)
/// transition matrices of shape (N x dim), concatenated across all
/// trajectories in order.
///
/// The unit of batching downstream is the individual transition, not the
/// trajectory, so trajectory boundaries are deliberately discarded here.
pub fn stack_transitions(
    dataset: &[Trajectory],
) -> Result<(Array2<f64>, Array2<f64>, Array2<f64>), DataError> {
    let n = num_transitions(dataset);
    if n == 0 {
        return Err(DataError::EmptyDataset);
    }
    let obs_dim = dataset[0].observations.ncols();
    let act_dim = dataset[0].actions.ncols();

    let mut obs = Array2::zeros((n, obs_dim));
    let mut act = Array2::zeros((n, act_dim));
    let mut next_obs = Array2::zeros((n, obs_dim));

    let mut row = 0;
    for traj in dataset {
        let t = traj.len();
        obs.slice_mut(s![row..row + t, ..]).assign(&traj.observations);
        act.slice_mut(s![row..row + t, ..]).assign(&traj.actions);
        next_obs
            .slice_mut(s![row..row + t, ..])
            .assign(&traj.next_observations);
        row += t;
    }

    Ok((obs, act, next_obs))
}

/// Errors for operations that are undefined without collected data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Normalization statistics or model fitting requested on a dataset
    /// with zero transitions.
    EmptyDataset,
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptyDataset => {
                write!(f, "operation undefined on an empty dataset")
            }
        }
    }
}

impl std::error::Error for DataError {}
