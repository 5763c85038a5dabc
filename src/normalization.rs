// src/normalization.rs
//
// Input/output scaling statistics for the dynamics model.
//
// Six per-dimension vectors: mean/std of observations, of state deltas
// (next - current), and of actions. Computed exactly once from the
// bootstrap random dataset and held fixed for the whole run; the model
// always sees normalized inputs and is trained to emit normalized deltas.

use ndarray::{Array1, Array2, Axis};

use crate::types::{stack_transitions, DataError, Trajectory};

/// Floor applied to every standard deviation before it is used as a
/// divisor. Zero-variance dimensions must not produce non-finite
/// normalized values.
pub const STD_EPS: f64 = 1e-6;

/// Fixed normalization statistics, one mean/std pair per quantity.
#[derive(Debug, Clone)]
pub struct NormStats {
    pub obs_mean: Array1<f64>,
    pub obs_std: Array1<f64>,
    pub delta_mean: Array1<f64>,
    pub delta_std: Array1<f64>,
    pub act_mean: Array1<f64>,
    pub act_std: Array1<f64>,
}

impl NormStats {
    /// Compute statistics by concatenating all timesteps across all
    /// trajectories. Errors on an empty dataset (statistics are
    /// undefined without data).
    pub fn from_dataset(dataset: &[Trajectory]) -> Result<Self, DataError> {
        let (obs, act, next_obs) = stack_transitions(dataset)?;
        let deltas = &next_obs - &obs;

        let (obs_mean, obs_std) = mean_std(&obs)?;
        let (delta_mean, delta_std) = mean_std(&deltas)?;
        let (act_mean, act_std) = mean_std(&act)?;

        Ok(Self {
            obs_mean,
            obs_std,
            delta_mean,
            delta_std,
            act_mean,
            act_std,
        })
    }

    pub fn normalize_obs(&self, obs: &Array2<f64>) -> Array2<f64> {
        (obs - &self.obs_mean) / &self.obs_std
    }

    pub fn normalize_act(&self, act: &Array2<f64>) -> Array2<f64> {
        (act - &self.act_mean) / &self.act_std
    }

    pub fn normalize_delta(&self, delta: &Array2<f64>) -> Array2<f64> {
        (delta - &self.delta_mean) / &self.delta_std
    }

    /// Inverse of `normalize_delta`; maps model output back to raw
    /// state-delta space.
    pub fn denormalize_delta(&self, normalized: &Array2<f64>) -> Array2<f64> {
        normalized * &self.delta_std + &self.delta_mean
    }
}

/// Per-column mean and epsilon-floored std of a transition matrix.
fn mean_std(m: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>), DataError> {
    let mean = m.mean_axis(Axis(0)).ok_or(DataError::EmptyDataset)?;
    let std = m.std_axis(Axis(0), 0.0).mapv(|s| s.max(STD_EPS));
    Ok((mean, std))
}
