// src/dynamics.rs
//
// Learned one-step forward dynamics.
//
// The model approximates `normalized_delta = f(normalized_obs,
// normalized_act)`, where the delta denormalizes to `next_obs - obs`.
// Planning and aggregation only ever see the `DynamicsModel` trait, so
// any regression technique satisfies the contract; the built-in
// implementation is a small fully-connected network trained with Adam
// on minibatches of individual transitions.

use ndarray::{s, Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::normalization::NormStats;
use crate::types::{stack_transitions, DataError, Trajectory};

/// Capability interface for a trainable one-step dynamics model.
pub trait DynamicsModel {
    /// Fit on the full cumulative dataset. Minibatches are drawn from
    /// individual transitions across all trajectories, reshuffled each
    /// pass. Returns the per-pass mean loss history for diagnostics.
    fn fit(&mut self, dataset: &[Trajectory]) -> Result<Vec<f64>, DataError>;

    /// Batched next-state prediction: normalize inputs, evaluate, add
    /// the denormalized delta back onto `states`. Parameters are
    /// read-only here. Mismatched dimensions are a programming error.
    fn predict(&self, states: &Array2<f64>, actions: &Array2<f64>) -> Array2<f64>;
}

/// Hyperparameters for the MLP dynamics model.
#[derive(Debug, Clone)]
pub struct MlpConfig {
    /// Number of hidden layers.
    pub n_layers: usize,
    /// Width of each hidden layer.
    pub hidden_size: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Full passes over the transition set per `fit` call.
    pub passes: usize,
}

impl MlpConfig {
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self {
            n_layers: cfg.n_layers,
            hidden_size: cfg.hidden_size,
            learning_rate: cfg.learning_rate,
            batch_size: cfg.batch_size,
            passes: cfg.dynamics_iters,
        }
    }
}

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

/// One fully-connected layer plus its Adam moment estimates.
struct Layer {
    w: Array2<f64>, // (in, out)
    b: Array1<f64>,
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

impl Layer {
    fn new(in_dim: usize, out_dim: usize, rng: &mut ChaCha8Rng) -> Self {
        // Xavier-uniform init.
        let bound = (6.0 / (in_dim + out_dim) as f64).sqrt();
        let w = Array2::from_shape_fn((in_dim, out_dim), |_| rng.gen_range(-bound..=bound));
        Self {
            w,
            b: Array1::zeros(out_dim),
            m_w: Array2::zeros((in_dim, out_dim)),
            v_w: Array2::zeros((in_dim, out_dim)),
            m_b: Array1::zeros(out_dim),
            v_b: Array1::zeros(out_dim),
        }
    }

    /// Adam update with bias correction; `t` is the 1-based global step.
    fn apply_gradients(&mut self, dw: &Array2<f64>, db: &Array1<f64>, lr: f64, t: usize) {
        let bc1 = 1.0 - ADAM_BETA1.powi(t as i32);
        let bc2 = 1.0 - ADAM_BETA2.powi(t as i32);

        self.m_w = &self.m_w * ADAM_BETA1 + dw * (1.0 - ADAM_BETA1);
        self.v_w = &self.v_w * ADAM_BETA2 + &(dw * dw) * (1.0 - ADAM_BETA2);
        let update_w = (&self.m_w / bc1) / ((self.v_w.mapv(f64::sqrt) / bc2.sqrt()) + ADAM_EPS);
        self.w = &self.w - &(update_w * lr);

        self.m_b = &self.m_b * ADAM_BETA1 + db * (1.0 - ADAM_BETA1);
        self.v_b = &self.v_b * ADAM_BETA2 + &(db * db) * (1.0 - ADAM_BETA2);
        let update_b = (&self.m_b / bc1) / ((self.v_b.mapv(f64::sqrt) / bc2.sqrt()) + ADAM_EPS);
        self.b = &self.b - &(update_b * lr);
    }
}

/// Fully-connected dynamics model in normalized delta-space.
pub struct MlpDynamics {
    obs_dim: usize,
    act_dim: usize,
    stats: NormStats,
    cfg: MlpConfig,
    layers: Vec<Layer>,
    /// Global Adam step counter (1-based after the first update).
    step: usize,
    rng: ChaCha8Rng,
}

impl MlpDynamics {
    pub fn new(obs_dim: usize, act_dim: usize, stats: NormStats, cfg: MlpConfig, seed: u64) -> Self {
        assert!(cfg.n_layers >= 1, "network needs at least one hidden layer");
        assert!(cfg.batch_size >= 1, "batch size must be >= 1");

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let in_dim = obs_dim + act_dim;

        let mut layers = Vec::with_capacity(cfg.n_layers + 1);
        let mut prev = in_dim;
        for _ in 0..cfg.n_layers {
            layers.push(Layer::new(prev, cfg.hidden_size, &mut rng));
            prev = cfg.hidden_size;
        }
        layers.push(Layer::new(prev, obs_dim, &mut rng));

        Self {
            obs_dim,
            act_dim,
            stats,
            cfg,
            layers,
            step: 0,
            rng,
        }
    }

    /// Concatenate normalized observations and actions into the network
    /// input matrix.
    fn build_input(&self, states: &Array2<f64>, actions: &Array2<f64>) -> Array2<f64> {
        let n = states.nrows();
        let mut x = Array2::zeros((n, self.obs_dim + self.act_dim));
        x.slice_mut(s![.., ..self.obs_dim])
            .assign(&self.stats.normalize_obs(states));
        x.slice_mut(s![.., self.obs_dim..])
            .assign(&self.stats.normalize_act(actions));
        x
    }

    /// Inference-only forward pass.
    fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let last = self.layers.len() - 1;
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = h.dot(&layer.w) + &layer.b;
            if i < last {
                h.mapv_inplace(|v| v.max(0.0));
            }
        }
        h
    }

    /// Forward pass keeping every layer input for backprop.
    /// `acts[0]` is the input batch; `acts[i]` for i >= 1 is the
    /// (post-ReLU) output of layer i-1. Returns the linear output.
    fn forward_cached(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Array2<f64>) {
        let last = self.layers.len() - 1;
        let mut acts = Vec::with_capacity(self.layers.len());
        acts.push(x.clone());
        for (i, layer) in self.layers.iter().enumerate().take(last) {
            let mut h = acts[i].dot(&layer.w) + &layer.b;
            h.mapv_inplace(|v| v.max(0.0));
            acts.push(h);
        }
        let out = acts[last].dot(&self.layers[last].w) + &self.layers[last].b;
        (acts, out)
    }

    /// One minibatch SGD step; returns the minibatch MSE.
    fn train_step(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> f64 {
        let (acts, pred) = self.forward_cached(x);

        let n = x.nrows() as f64;
        let d = y.ncols() as f64;
        let err = &pred - y;
        let loss = (&err * &err).mean().unwrap_or(0.0);

        self.step += 1;
        let lr = self.cfg.learning_rate;
        let t = self.step;

        // dL/d(pred) for MSE averaged over batch and output dims.
        let mut delta = err * (2.0 / (n * d));
        for i in (0..self.layers.len()).rev() {
            let dw = acts[i].t().dot(&delta);
            let db = delta.sum_axis(Axis(0));
            if i > 0 {
                // Propagate through the weights, then mask by the ReLU
                // derivative of the layer input (acts[i] is post-ReLU).
                let relu_mask = acts[i].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                delta = delta.dot(&self.layers[i].w.t()) * relu_mask;
            }
            self.layers[i].apply_gradients(&dw, &db, lr, t);
        }

        loss
    }
}

impl DynamicsModel for MlpDynamics {
    fn fit(&mut self, dataset: &[Trajectory]) -> Result<Vec<f64>, DataError> {
        let (obs, act, next_obs) = stack_transitions(dataset)?;
        assert_eq!(obs.ncols(), self.obs_dim, "dataset obs dim mismatch");
        assert_eq!(act.ncols(), self.act_dim, "dataset action dim mismatch");

        let x = self.build_input(&obs, &act);
        let y = self.stats.normalize_delta(&(&next_obs - &obs));
        let n = x.nrows();

        let mut indices: Vec<usize> = (0..n).collect();
        let mut losses = Vec::with_capacity(self.cfg.passes);

        for _ in 0..self.cfg.passes {
            // Reshuffle every pass so minibatch composition is not tied
            // to trajectory order.
            indices.shuffle(&mut self.rng);

            let mut pass_loss = 0.0;
            let mut batches = 0;
            for chunk in indices.chunks(self.cfg.batch_size) {
                let xb = x.select(Axis(0), chunk);
                let yb = y.select(Axis(0), chunk);
                pass_loss += self.train_step(&xb, &yb);
                batches += 1;
            }
            losses.push(pass_loss / batches as f64);
        }

        Ok(losses)
    }

    fn predict(&self, states: &Array2<f64>, actions: &Array2<f64>) -> Array2<f64> {
        assert_eq!(states.ncols(), self.obs_dim, "state dim mismatch");
        assert_eq!(actions.ncols(), self.act_dim, "action dim mismatch");
        assert_eq!(
            states.nrows(),
            actions.nrows(),
            "state/action batch size mismatch"
        );

        let x = self.build_input(states, actions);
        let delta = self.stats.denormalize_delta(&self.forward(&x));
        states + &delta
    }
}
