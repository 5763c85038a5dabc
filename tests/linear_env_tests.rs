// tests/linear_env_tests.rs
//
// End-to-end on a deterministic linear environment (next = state +
// action): after fitting the dynamics model on random data, one-step
// MPC with a squared-distance-to-target cost should pick an action
// close to (target - state), up to model-fit error.

use ndarray::{array, Array1, ArrayView1};

use randshoot::{
    sample_rollouts, Controller, DynamicsModel, Environment, MlpConfig, MlpDynamics,
    MpcController, NormStats, QuadraticCost, RandomController, StepResult,
};

/// 1-D deterministic integrator: next_state = state + action.
struct LinearEnv {
    state: f64,
    start: f64,
    low: Array1<f64>,
    high: Array1<f64>,
}

impl LinearEnv {
    fn new(start: f64) -> Self {
        Self {
            state: start,
            start,
            low: array![-1.0],
            high: array![1.0],
        }
    }
}

impl Environment for LinearEnv {
    fn obs_dim(&self) -> usize {
        1
    }
    fn action_dim(&self) -> usize {
        1
    }
    fn action_low(&self) -> &Array1<f64> {
        &self.low
    }
    fn action_high(&self) -> &Array1<f64> {
        &self.high
    }

    fn reset(&mut self) -> Array1<f64> {
        self.state = self.start;
        array![self.state]
    }

    fn step(&mut self, action: &ArrayView1<f64>) -> StepResult {
        self.state += action[0];
        StepResult {
            observation: array![self.state],
            reward: -self.state * self.state,
            done: false,
        }
    }
}

#[test]
fn test_one_step_mpc_recovers_target_minus_state() {
    let mut env = LinearEnv::new(0.0);

    // Bootstrap dataset under the random controller.
    let mut random_controller = RandomController::new(&env, 21);
    let dataset = sample_rollouts(&mut env, &mut random_controller, 20, 50, false);

    let stats = NormStats::from_dataset(&dataset).unwrap();
    let mut model = MlpDynamics::new(
        1,
        1,
        stats,
        MlpConfig {
            n_layers: 1,
            hidden_size: 32,
            learning_rate: 1e-2,
            batch_size: 128,
            passes: 60,
        },
        0,
    );
    model.fit(&dataset).unwrap();

    // Minimize squared distance of the next state to the target. With
    // next = state + action, the analytic optimum from state 0.5 and
    // target 0.0 is action = -0.5.
    let cost = QuadraticCost::new(array![0.0], array![1.0], 0.0);
    let mut mpc = MpcController::new(model, &cost, &env, 1, 2000, 9);

    let obs = array![0.5];
    let action = mpc.get_action(&obs.view());
    assert!(
        (action[0] + 0.5).abs() < 0.2,
        "chosen action {} should approximate -0.5",
        action[0]
    );
}

#[test]
fn test_fitted_model_predicts_linear_step() {
    let mut env = LinearEnv::new(0.0);
    let mut random_controller = RandomController::new(&env, 4);
    let dataset = sample_rollouts(&mut env, &mut random_controller, 20, 50, false);

    let stats = NormStats::from_dataset(&dataset).unwrap();
    let mut model = MlpDynamics::new(
        1,
        1,
        stats,
        MlpConfig {
            n_layers: 1,
            hidden_size: 32,
            learning_rate: 1e-2,
            batch_size: 128,
            passes: 60,
        },
        0,
    );
    let losses = model.fit(&dataset).unwrap();
    assert!(losses.last().unwrap() < &0.05, "fit did not converge: {:?}", losses.last());

    let pred = model.predict(&array![[0.3], [-1.2]], &array![[0.4], [0.9]]);
    assert!((pred[[0, 0]] - 0.7).abs() < 0.15);
    assert!((pred[[1, 0]] - (-0.3)).abs() < 0.15);
}
