// src/env.rs
//
// Gym-style environment interface and the built-in toy environment.
//
// The core only ever talks to an environment through this trait:
// reset, step, action bounds, and an optional render hook. Continuous
// state/action spaces, deterministic given the seed.

use ndarray::{array, Array1, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ConfigError;
use crate::cost::{CostFn, QuadraticCost};

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after taking the action.
    pub observation: Array1<f64>,
    /// Reward for this step (maximized quantity, reporting only).
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
}

/// Continuous-control environment interface.
pub trait Environment {
    fn obs_dim(&self) -> usize;
    fn action_dim(&self) -> usize;

    /// Per-dimension lower action bounds (for uniform sampling).
    fn action_low(&self) -> &Array1<f64>;
    /// Per-dimension upper action bounds.
    fn action_high(&self) -> &Array1<f64>;

    /// Start a fresh episode and return the initial observation.
    fn reset(&mut self) -> Array1<f64>;

    /// Advance the environment by one action.
    fn step(&mut self, action: &ArrayView1<f64>) -> StepResult;

    /// Display hook; a side effect with no semantic weight.
    fn render(&mut self) {}
}

/// Double-integrator point mass on the plane.
///
/// State is `[px, py, vx, vy]`, action is a bounded acceleration. The
/// episode starts at a random position with zero velocity and terminates
/// when the mass parks near the origin. Reward is the negated quadratic
/// cost, so return and planning cost agree in sign convention.
pub struct PointMassEnv {
    state: Array1<f64>,
    low: Array1<f64>,
    high: Array1<f64>,
    rng: ChaCha8Rng,
}

/// Integration timestep.
const DT: f64 = 0.05;
/// Position radius under which the episode terminates.
const GOAL_RADIUS: f64 = 0.05;

impl PointMassEnv {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Array1::zeros(4),
            low: array![-1.0, -1.0],
            high: array![1.0, 1.0],
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The cost the MPC planner minimizes on this environment: squared
    /// distance to the origin, lightly weighted velocity, small action
    /// penalty.
    pub fn cost_fn() -> QuadraticCost {
        QuadraticCost::new(
            Array1::zeros(4),
            array![1.0, 1.0, 0.05, 0.05],
            0.01,
        )
    }

    fn step_cost(&self, action: &ArrayView1<f64>) -> f64 {
        let pos_sq = self.state[0] * self.state[0] + self.state[1] * self.state[1];
        let vel_sq = self.state[2] * self.state[2] + self.state[3] * self.state[3];
        let act_sq = action.iter().map(|a| a * a).sum::<f64>();
        pos_sq + 0.05 * vel_sq + 0.01 * act_sq
    }
}

impl Environment for PointMassEnv {
    fn obs_dim(&self) -> usize {
        4
    }

    fn action_dim(&self) -> usize {
        2
    }

    fn action_low(&self) -> &Array1<f64> {
        &self.low
    }

    fn action_high(&self) -> &Array1<f64> {
        &self.high
    }

    fn reset(&mut self) -> Array1<f64> {
        let px = self.rng.gen_range(-1.0..=1.0);
        let py = self.rng.gen_range(-1.0..=1.0);
        self.state = array![px, py, 0.0, 0.0];
        self.state.clone()
    }

    fn step(&mut self, action: &ArrayView1<f64>) -> StepResult {
        let ax = action[0].clamp(self.low[0], self.high[0]);
        let ay = action[1].clamp(self.low[1], self.high[1]);

        self.state[2] += ax * DT;
        self.state[3] += ay * DT;
        self.state[0] += self.state[2] * DT;
        self.state[1] += self.state[3] * DT;

        let reward = -self.step_cost(action);
        let dist = (self.state[0] * self.state[0] + self.state[1] * self.state[1]).sqrt();

        StepResult {
            observation: self.state.clone(),
            reward,
            done: dist < GOAL_RADIUS,
        }
    }
}

/// Resolve an environment name to an (environment, planning cost) pair.
pub fn make_env(
    name: &str,
    seed: u64,
) -> Result<(Box<dyn Environment>, Box<dyn CostFn>), ConfigError> {
    match name {
        "point-mass" => Ok((
            Box::new(PointMassEnv::new(seed)),
            Box::new(PointMassEnv::cost_fn()),
        )),
        other => Err(ConfigError::UnknownEnv {
            name: other.to_string(),
        }),
    }
}
