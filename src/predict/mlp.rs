use super::Predictor;
use crate::{cast_f64, cast_u64};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Regressor with one hidden ReLU layer and a linear output.
///
/// Parameters are stored in one flat vector laid out as: input weights (`hidden` rows of
/// `inputs` values), hidden biases, output weights and the output bias.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Mlp {
    inputs: usize,
    hidden: usize,
    weights: Vec<f64>,
}

impl Mlp {
    /// Creates a network with every parameter drawn uniformly from `±1/sqrt(fan_in)`.
    ///
    /// # Panics
    /// - If `inputs` or `hidden` is zero.
    pub fn new(inputs: usize, hidden: usize, rng: &mut impl Rng) -> Self {
        assert!(inputs > 0 && hidden > 0, "Network layers must not be empty");

        let first = 1.0 / cast_f64(cast_u64(inputs)).sqrt();
        let second = 1.0 / cast_f64(cast_u64(hidden)).sqrt();

        let mut weights = Vec::with_capacity(Self::parameter_count(inputs, hidden));
        weights.extend((0..hidden * inputs + hidden).map(|_| rng.gen_range(-first..=first)));
        weights.extend((0..=hidden).map(|_| rng.gen_range(-second..=second)));

        Self {
            inputs,
            hidden,
            weights,
        }
    }

    const fn parameter_count(inputs: usize, hidden: usize) -> usize {
        hidden * inputs + 2 * hidden + 1
    }

    /// Returns the input width of the network.
    #[must_use]
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    /// Returns whether the stored parameters match the layer sizes.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.inputs > 0
            && self.hidden > 0
            && self.weights.len() == Self::parameter_count(self.inputs, self.hidden)
    }

    pub(super) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    fn split(&self) -> (&[f64], &[f64], &[f64], f64) {
        let (w1, rest) = self.weights.split_at(self.hidden * self.inputs);
        let (b1, rest) = rest.split_at(self.hidden);
        let (w2, b2) = rest.split_at(self.hidden);
        (w1, b1, w2, b2[0])
    }

    /// Returns the hidden pre-activations and the output.
    fn forward(&self, x: &[f64]) -> (Vec<f64>, f64) {
        let (w1, b1, w2, b2) = self.split();
        let hidden: Vec<f64> = w1
            .chunks_exact(self.inputs)
            .zip(b1)
            .map(|(row, bias)| bias + row.iter().zip(x).map(|(w, x)| w * x).sum::<f64>())
            .collect();
        let output = b2 + hidden.iter().zip(w2).map(|(z, w)| z.max(0.0) * w).sum::<f64>();
        (hidden, output)
    }

    /// Evaluates the network on one input.
    #[must_use]
    pub fn output(&self, x: &[f64]) -> f64 {
        self.forward(x).1
    }

    /// Returns the mean squared error over the batch and its gradient.
    pub(super) fn loss_gradient(&self, inputs: &[Vec<f64>], targets: &[f64]) -> (f64, Vec<f64>) {
        let (_, _, w2, _) = self.split();
        let mut gradient = vec![0.0; self.weights.len()];
        let batch = cast_f64(cast_u64(inputs.len()));
        let mut loss = 0.0;

        let b1_start = self.hidden * self.inputs;
        let w2_start = b1_start + self.hidden;
        let b2_index = w2_start + self.hidden;

        for (x, &target) in inputs.iter().zip(targets) {
            let (hidden, output) = self.forward(x);
            let error = output - target;
            loss += error * error / batch;

            let delta = 2.0 * error / batch;
            gradient[b2_index] += delta;
            for (j, &z) in hidden.iter().enumerate() {
                if z <= 0.0 {
                    continue;
                }
                gradient[w2_start + j] += delta * z;

                let back = delta * w2[j];
                gradient[b1_start + j] += back;
                for (i, &value) in x.iter().enumerate() {
                    gradient[j * self.inputs + i] += back * value;
                }
            }
        }

        (loss, gradient)
    }
}

impl Predictor for Mlp {
    fn predict(&self, durations: &[u64]) -> f64 {
        let x: Vec<_> = durations.iter().map(|&d| cast_f64(d)).collect();
        self.output(&x)
    }

    fn accepts(&self, tasks: usize) -> bool {
        tasks == self.inputs && self.is_consistent()
    }

    fn name(&self) -> &'static str {
        "mlp"
    }
}
