// tests/random_controller_tests.rs
//
// Random controller contract: uniform over the action bounds, never out
// of bounds, deterministic given the seed.

use ndarray::{array, Array1, ArrayView1};

use randshoot::{Controller, Environment, RandomController, StepResult};

/// Static environment exposing only action bounds.
struct BoundsEnv {
    low: Array1<f64>,
    high: Array1<f64>,
}

impl BoundsEnv {
    fn unit() -> Self {
        Self {
            low: array![-1.0, -1.0],
            high: array![1.0, 1.0],
        }
    }
}

impl Environment for BoundsEnv {
    fn obs_dim(&self) -> usize {
        1
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
        array![0.0]
    }
    fn step(&mut self, _action: &ArrayView1<f64>) -> StepResult {
        StepResult {
            observation: array![0.0],
            reward: 0.0,
            done: false,
        }
    }
}

#[test]
fn test_actions_stay_within_bounds_over_1000_samples() {
    let env = BoundsEnv::unit();
    let mut controller = RandomController::new(&env, 42);
    let obs = array![0.0];

    for _ in 0..1000 {
        let action = controller.get_action(&obs.view());
        assert_eq!(action.len(), 2);
        for &a in action.iter() {
            assert!((-1.0..=1.0).contains(&a), "action {} out of bounds", a);
        }
    }
}

#[test]
fn test_asymmetric_bounds_respected() {
    let env = BoundsEnv {
        low: array![0.0, -3.0],
        high: array![0.5, -1.0],
    };
    let mut controller = RandomController::new(&env, 7);
    let obs = array![0.0];

    for _ in 0..500 {
        let action = controller.get_action(&obs.view());
        assert!((0.0..=0.5).contains(&action[0]));
        assert!((-3.0..=-1.0).contains(&action[1]));
    }
}

#[test]
fn test_same_seed_same_sequence() {
    let env = BoundsEnv::unit();
    let mut a = RandomController::new(&env, 99);
    let mut b = RandomController::new(&env, 99);
    let obs = array![0.0];

    for _ in 0..20 {
        assert_eq!(a.get_action(&obs.view()), b.get_action(&obs.view()));
    }
}
