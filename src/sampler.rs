// src/sampler.rs
//
// Rollout collection: drive an environment with a controller and record
// trajectories.

use ndarray::{Array1, Array2};

use crate::controller::Controller;
use crate::env::Environment;
use crate::types::Trajectory;

/// Collect `num_paths` episodes of at most `horizon` steps each.
///
/// Each episode starts from a fresh `reset()`; no state is carried
/// across episodes. Episodes that signal `done` at step t < horizon are
/// truncated to t+1 recorded timesteps. `render` invokes the
/// environment's display hook after every step.
pub fn sample_rollouts(
    env: &mut dyn Environment,
    controller: &mut dyn Controller,
    num_paths: usize,
    horizon: usize,
    render: bool,
) -> Vec<Trajectory> {
    let obs_dim = env.obs_dim();
    let act_dim = env.action_dim();

    let mut paths = Vec::with_capacity(num_paths);
    for _ in 0..num_paths {
        let mut obs_rows: Vec<f64> = Vec::with_capacity(horizon * obs_dim);
        let mut act_rows: Vec<f64> = Vec::with_capacity(horizon * act_dim);
        let mut next_rows: Vec<f64> = Vec::with_capacity(horizon * obs_dim);
        let mut rewards: Vec<f64> = Vec::with_capacity(horizon);

        let mut obs = env.reset();
        for _ in 0..horizon {
            let action = controller.get_action(&obs.view());
            let step = env.step(&action.view());
            if render {
                env.render();
            }

            obs_rows.extend(obs.iter());
            act_rows.extend(action.iter());
            next_rows.extend(step.observation.iter());
            rewards.push(step.reward);

            if step.done {
                break;
            }
            obs = step.observation;
        }

        let t = rewards.len();
        paths.push(Trajectory {
            observations: rows_to_matrix(obs_rows, t, obs_dim),
            actions: rows_to_matrix(act_rows, t, act_dim),
            next_observations: rows_to_matrix(next_rows, t, obs_dim),
            rewards: Array1::from_vec(rewards),
        });
    }

    paths
}

/// Rows were appended one full row at a time, so the flat buffer always
/// reshapes exactly.
fn rows_to_matrix(flat: Vec<f64>, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_vec((rows, cols), flat)
        .expect("row-major buffer length matches recorded timesteps")
}
