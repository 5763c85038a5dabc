// src/controller.rs
//
// Action selection: the bootstrap random controller and the
// random-shooting MPC controller.
//
// MPC planning is the dominant per-decision cost, so all K candidate
// rollouts advance together through the dynamics model's batched
// predict: one (K x dim) matrix per horizon step, no per-candidate
// loops or allocation churn.

use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cost::CostFn;
use crate::dynamics::DynamicsModel;
use crate::env::Environment;

/// Maps the current observation to the next action to take for real.
pub trait Controller {
    fn get_action(&mut self, obs: &ArrayView1<f64>) -> Array1<f64>;
}

/// Uniform random actions over the environment's bounds; ignores the
/// observation. Used only to generate the bootstrap dataset.
pub struct RandomController {
    low: Array1<f64>,
    high: Array1<f64>,
    rng: ChaCha8Rng,
}

impl RandomController {
    pub fn new(env: &dyn Environment, seed: u64) -> Self {
        Self {
            low: env.action_low().clone(),
            high: env.action_high().clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Controller for RandomController {
    fn get_action(&mut self, _obs: &ArrayView1<f64>) -> Array1<f64> {
        sample_uniform_row(&self.low, &self.high, &mut self.rng)
    }
}

/// Receding-horizon random-shooting MPC.
///
/// Every real step: sample K i.i.d. candidate action sequences of
/// length H, imagine them forward through the dynamics model, score
/// with the cost function, act on the first action of the cheapest
/// sequence and discard the rest of the plan.
pub struct MpcController<'c, M: DynamicsModel> {
    model: M,
    cost: &'c dyn CostFn,
    horizon: usize,
    num_candidates: usize,
    low: Array1<f64>,
    high: Array1<f64>,
    rng: ChaCha8Rng,
}

impl<'c, M: DynamicsModel> MpcController<'c, M> {
    pub fn new(
        model: M,
        cost: &'c dyn CostFn,
        env: &dyn Environment,
        horizon: usize,
        num_candidates: usize,
        seed: u64,
    ) -> Self {
        assert!(horizon >= 1, "mpc horizon must be >= 1");
        assert!(num_candidates >= 1, "mpc needs at least one candidate");
        Self {
            model,
            cost,
            horizon,
            num_candidates,
            low: env.action_low().clone(),
            high: env.action_high().clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The dynamics model, for refitting between aggregation rounds.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Sample a (K x act_dim) matrix of uniform actions.
    fn sample_action_batch(&mut self) -> Array2<f64> {
        let act_dim = self.low.len();
        Array2::from_shape_fn((self.num_candidates, act_dim), |(_, j)| {
            self.rng.gen_range(self.low[j]..=self.high[j])
        })
    }

    /// Total imagined cost per candidate, advancing all K rollouts in
    /// lockstep. Non-finite totals (compounding model blow-ups) become
    /// `+inf` so degenerate candidates are never selected and never
    /// crash planning.
    fn evaluate_candidates(&self, obs: &ArrayView1<f64>, action_seqs: &[Array2<f64>]) -> Array1<f64> {
        let k = self.num_candidates;
        let mut states = Array2::from_shape_fn((k, obs.len()), |(_, j)| obs[j]);
        let mut total = Array1::zeros(k);

        for actions in action_seqs {
            let next = self.model.predict(&states, actions);
            total += &self.cost.step_cost_batch(&states, actions, &next);
            states = next;
        }

        total.mapv(|c| if c.is_finite() { c } else { f64::INFINITY })
    }
}

impl<M: DynamicsModel> Controller for MpcController<'_, M> {
    fn get_action(&mut self, obs: &ArrayView1<f64>) -> Array1<f64> {
        let action_seqs: Vec<Array2<f64>> =
            (0..self.horizon).map(|_| self.sample_action_batch()).collect();

        let total_costs = self.evaluate_candidates(obs, &action_seqs);
        let best = select_best(&total_costs);

        action_seqs[0].row(best).to_owned()
    }
}

/// Index of the minimum-cost candidate. First minimum wins on exact
/// ties; if every candidate is non-finite, candidate 0 is returned
/// (its first action is still uniform and in-bounds).
pub fn select_best(total_costs: &Array1<f64>) -> usize {
    let mut best = 0;
    let mut best_cost = f64::INFINITY;
    for (i, &c) in total_costs.iter().enumerate() {
        if c < best_cost {
            best_cost = c;
            best = i;
        }
    }
    best
}

fn sample_uniform_row(low: &Array1<f64>, high: &Array1<f64>, rng: &mut ChaCha8Rng) -> Array1<f64> {
    Array1::from_shape_fn(low.len(), |j| rng.gen_range(low[j]..=high[j]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_select_best_picks_minimum() {
        let costs = array![3.0, 1.5, 2.0, 1.5, 9.0];
        assert_eq!(select_best(&costs), 1, "first minimum wins on ties");
    }

    #[test]
    fn test_select_best_ignores_non_finite() {
        let costs = array![f64::INFINITY, f64::NAN, 0.7, f64::NEG_INFINITY.abs()];
        assert_eq!(select_best(&costs), 2);
    }

    #[test]
    fn test_select_best_all_infinite_falls_back_to_first() {
        let costs = array![f64::INFINITY, f64::INFINITY];
        assert_eq!(select_best(&costs), 0);
    }
}
