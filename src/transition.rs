//! Sparse transition distributions over target states.
//!
//! A [`Transition`] is one member of nature's uncertainty set for a given
//! state/action pair: a sparse distribution stored as parallel vectors of
//! (target state id, probability, reward). Probabilities must be non-negative
//! but need not sum to one; [`Transition::normalize`] rescales them when a
//! proper distribution is required.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking whether probabilities sum to one.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// A sparse distribution over target state ids with per-target rewards.
///
/// Target ids are kept sorted in ascending order and deduplicated:
/// [`Transition::add_sample`] merges a repeated target by accumulating
/// probability mass and averaging the reward weighted by probability.
///
/// An existing transition with zero target entries is a malformed model, not
/// an implicit terminal state; resolution-time consumers reject it.
///
/// # Examples
///
/// ```
/// use rmdp::Transition;
///
/// let mut t = Transition::new();
/// t.add_sample(1, 0.25, 2.0);
/// t.add_sample(3, 0.75, 0.0);
/// assert_eq!(t.len(), 2);
/// assert!(t.is_normalized());
/// assert!((t.expected_reward() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Target state ids, sorted ascending.
    indices: Vec<usize>,
    /// Probability mass for each target (non-negative).
    probabilities: Vec<f64>,
    /// Reward received when the corresponding target is reached.
    rewards: Vec<f64>,
}

impl Transition {
    /// Create an empty transition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transition with a single target and zero reward.
    pub fn single(target: usize, probability: f64) -> Self {
        let mut transition = Self::new();
        transition.add_sample(target, probability, 0.0);
        transition
    }

    /// Create a transition from parallel entry lists.
    ///
    /// # Panics
    ///
    /// Panics if the lists have different lengths or any probability is
    /// negative or not finite.
    pub fn from_entries(indices: &[usize], probabilities: &[f64], rewards: &[f64]) -> Self {
        assert_eq!(indices.len(), probabilities.len());
        assert_eq!(indices.len(), rewards.len());

        let mut transition = Self::new();
        for ((&target, &probability), &reward) in
            indices.iter().zip(probabilities).zip(rewards)
        {
            transition.add_sample(target, probability, reward);
        }
        transition
    }

    /// Add probability mass toward a target state.
    ///
    /// If the target is already present, its probability is accumulated and
    /// the reward becomes the probability-weighted average of the old and new
    /// rewards. Otherwise the entry is inserted keeping targets sorted.
    ///
    /// # Panics
    ///
    /// Panics if the probability is negative or not finite.
    pub fn add_sample(&mut self, target: usize, probability: f64, reward: f64) {
        assert!(
            probability >= 0.0 && probability.is_finite(),
            "transition probability {probability} must be non-negative and finite"
        );

        match self.indices.binary_search(&target) {
            Ok(position) => {
                let combined = self.probabilities[position] + probability;
                if combined > 0.0 {
                    self.rewards[position] = (self.rewards[position]
                        * self.probabilities[position]
                        + reward * probability)
                        / combined;
                }
                self.probabilities[position] = combined;
            }
            Err(position) => {
                self.indices.insert(position, target);
                self.probabilities.insert(position, probability);
                self.rewards.insert(position, reward);
            }
        }
    }

    /// Number of target entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the transition has no target entries.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Target state ids, sorted ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Probability mass per target.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Reward per target.
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Iterate over (target, probability, reward) entries.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.indices
            .iter()
            .zip(&self.probabilities)
            .zip(&self.rewards)
            .map(|((&target, &probability), &reward)| (target, probability, reward))
    }

    /// Total outgoing probability mass.
    pub fn sum_probabilities(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// True when the probability mass sums to one within tolerance.
    pub fn is_normalized(&self) -> bool {
        (self.sum_probabilities() - 1.0).abs() < NORMALIZATION_TOLERANCE
    }

    /// Rescale probabilities to sum to one.
    ///
    /// A transition whose total mass is exactly zero is left unchanged; there
    /// is no meaningful distribution to rescale to.
    pub fn normalize(&mut self) {
        let total = self.sum_probabilities();
        if total > 0.0 {
            for probability in &mut self.probabilities {
                *probability /= total;
            }
        }
    }

    /// Expected immediate reward of this transition: sum of probability times
    /// reward over all targets.
    ///
    /// # Panics
    ///
    /// Panics if the transition has no target entries (malformed model).
    pub fn expected_reward(&self) -> f64 {
        assert!(
            !self.is_empty(),
            "cannot resolve a reward for a transition with no target states"
        );
        self.probabilities
            .iter()
            .zip(&self.rewards)
            .map(|(&probability, &reward)| probability * reward)
            .sum()
    }

    /// Expand the sparse distribution into a dense vector of length `size`.
    ///
    /// # Panics
    ///
    /// Panics if any target id does not fit in `size`.
    pub fn probabilities_vector(&self, size: usize) -> Vec<f64> {
        let mut dense = vec![0.0; size];
        for (&target, &probability) in self.indices.iter().zip(&self.probabilities) {
            assert!(
                target < size,
                "target state id {target} does not fit in a vector of length {size}"
            );
            dense[target] = probability;
        }
        dense
    }
}
