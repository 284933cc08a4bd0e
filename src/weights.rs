//! Directed weight matrix and the Hebbian update rule.

use crate::neuron::NeuronId;
use std::collections::HashMap;

/// Sparse-friendly directed adjacency: pre-id → (post-id → weight).
/// Weights are non-negative; polarity comes from the pre-synaptic neuron's
/// emission sign, not the stored weight. Self-weights are always
/// zero and cannot be set.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightMatrix {
    weights: HashMap<NeuronId, HashMap<NeuronId, f64>>,
    max_weight: f64,
}

impl WeightMatrix {
    pub fn new(max_weight: f64) -> Self {
        Self {
            weights: HashMap::new(),
            max_weight,
        }
    }

    /// The stored weight for `pre -> post`, or `0.0` if the pair has never
    /// been set. A missing pair is not an error.
    pub fn get(&self, pre: NeuronId, post: NeuronId) -> f64 {
        if pre == post {
            return 0.0;
        }
        self.weights
            .get(&pre)
            .and_then(|row| row.get(&post))
            .copied()
            .unwrap_or(0.0)
    }

    /// Store `w` for `pre -> post`, clamped to `[0, max_weight]`. A no-op
    /// for self-pairs, whose weight is immutably zero.
    pub fn set(&mut self, pre: NeuronId, post: NeuronId, w: f64) {
        if pre == post {
            return;
        }
        let clamped = w.clamp(0.0, self.max_weight);
        self.weights.entry(pre).or_default().insert(post, clamped);
    }

    /// Apply the Hebbian correlation rule:
    /// `w' = (w + lr * reinforcement * pre_act * post_act) * (1 - decay)`,
    /// clamped and stored. `pre_act`/`post_act` are 0.0 or 1.0.
    pub fn apply_hebbian_update(
        &mut self,
        pre: NeuronId,
        post: NeuronId,
        pre_act: f64,
        post_act: f64,
        learning_rate: f64,
        reinforcement_factor: f64,
        decay_rate: f64,
    ) {
        let w_old = self.get(pre, post);
        let w_new = (w_old + learning_rate * reinforcement_factor * pre_act * post_act) * (1.0 - decay_rate);
        self.set(pre, post, w_new);
    }

    /// Every pre-neuron id with at least one stored outgoing weight.
    pub fn pre_ids(&self) -> impl Iterator<Item = NeuronId> + '_ {
        self.weights.keys().copied()
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }
}
