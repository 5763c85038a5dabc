// src/cost.rs
//
// Cost functions for planning and reporting.
//
// The planner is a minimizer: cost is a penalty, separate from the
// environment reward (which is maximized and used only for reporting).
// Every cost must be evaluable both per-transition and in batched form
// over (K candidates) rows, since MPC scores thousands of imagined
// rollouts per real decision.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::types::Trajectory;

/// A pure, stateless trajectory-step cost.
pub trait CostFn {
    /// Cost of a single (obs, act, next_obs) transition.
    fn step_cost(
        &self,
        obs: &ArrayView1<f64>,
        act: &ArrayView1<f64>,
        next_obs: &ArrayView1<f64>,
    ) -> f64;

    /// Batched form: one cost per row across matched (N x dim) matrices.
    /// This is the planning-time hot path and must not fall back to
    /// per-row iteration in implementations.
    fn step_cost_batch(
        &self,
        obs: &Array2<f64>,
        act: &Array2<f64>,
        next_obs: &Array2<f64>,
    ) -> Array1<f64>;
}

/// Total cost of a collected trajectory under `cost`.
pub fn trajectory_cost(cost: &dyn CostFn, traj: &Trajectory) -> f64 {
    cost.step_cost_batch(&traj.observations, &traj.actions, &traj.next_observations)
        .sum()
}

/// Quadratic state-target cost with an action-magnitude penalty:
///
/// `sum_i q[i] * (next_obs[i] - target[i])^2 + r * sum_j act[j]^2`
#[derive(Debug, Clone)]
pub struct QuadraticCost {
    /// Target state, one entry per observation dimension.
    pub target: Array1<f64>,
    /// Per-dimension state weights (Q).
    pub state_weights: Array1<f64>,
    /// Scalar action weight (R).
    pub action_weight: f64,
}

impl QuadraticCost {
    pub fn new(target: Array1<f64>, state_weights: Array1<f64>, action_weight: f64) -> Self {
        assert_eq!(
            target.len(),
            state_weights.len(),
            "target and state weights must have the same dimension"
        );
        Self {
            target,
            state_weights,
            action_weight,
        }
    }
}

impl CostFn for QuadraticCost {
    fn step_cost(
        &self,
        _obs: &ArrayView1<f64>,
        act: &ArrayView1<f64>,
        next_obs: &ArrayView1<f64>,
    ) -> f64 {
        let diff = next_obs - &self.target;
        let state_term = (&diff * &diff * &self.state_weights).sum();
        let act_term = act.iter().map(|a| a * a).sum::<f64>();
        state_term + self.action_weight * act_term
    }

    fn step_cost_batch(
        &self,
        _obs: &Array2<f64>,
        act: &Array2<f64>,
        next_obs: &Array2<f64>,
    ) -> Array1<f64> {
        let diff = next_obs - &self.target;
        let state_term = (&diff * &diff * &self.state_weights).sum_axis(Axis(1));
        let act_term = (act * act).sum_axis(Axis(1));
        state_term + act_term * self.action_weight
    }
}
