//! The decision-process container and its policy-evaluation routines.
//!
//! [`StateTable`] owns all states of a plain or robust MDP and exposes the
//! linear-algebra surface the iterative solvers are built on: dense
//! transition-matrix construction for a fixed policy pair (forward and
//! transposed), per-state expected rewards, discounted occupancy frequencies
//! via a direct solve, and policy validation.
//!
//! Evaluation methods are pure read-only sweeps recomputed on every call.
//! The container provides no locking; callers serialize their own
//! construction and evaluation phases. The matrix and reward sweeps fan out
//! over the state array with rayon and join before returning, so one sweep's
//! output is always fully materialized before the next consumes it.
//!
//! The hot parallel loops assume a validated policy pair and perform no
//! per-entry bounds checks; gate untrusted policies through
//! [`StateTable::validate_policy`] first.

use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    linalg::{self, SquareMatrix},
    state::{RegularState, RobustState, State},
    transition::Transition,
};

/// Decision-maker's policy: chosen action id per state id.
///
/// Entries for terminal states are ignored.
pub type ActionPolicy = Vec<usize>;

/// Nature's policy: chosen outcome id per state id.
///
/// Entries for terminal states are ignored.
pub type OutcomePolicy = Vec<usize>;

/// A plain MDP: one outcome per action.
pub type Mdp = StateTable<RegularState>;

/// A robust MDP: nature chooses among a discrete outcome set per action.
pub type RobustMdp = StateTable<RobustState>;

/// An id-indexed, dynamically growing collection owning all states of a
/// decision process.
///
/// The table grows only by extension: addressing an id past the current end
/// fills the gap with default terminal states.
///
/// # Examples
///
/// ```
/// use rmdp::Mdp;
///
/// let mut mdp = Mdp::new();
/// mdp.add_transition(0, 0, 0, 1, 1.0, 5.0);
/// mdp.add_transition(1, 0, 0, 1, 1.0, 0.0);
///
/// assert_eq!(mdp.state_count(), 2);
/// assert!(mdp.validate_policy(&vec![0, 0], &vec![0, 0]).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateTable<S> {
    states: Vec<S>,
}

impl<S: State> StateTable<S> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Create a table with the given number of states, all initially
    /// terminal.
    pub fn with_state_count(state_count: usize) -> Self {
        let mut states = Vec::new();
        states.resize_with(state_count, S::default);
        Self { states }
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// True when the table has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Read-only view of all states in ascending id order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Iterate over (state id, state) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &S)> {
        self.states.iter().enumerate()
    }

    /// Retrieve an existing state.
    ///
    /// # Panics
    ///
    /// Panics if the state id is out of range; accessing a state that was
    /// never created is a programming error.
    pub fn get_state(&self, state_id: usize) -> &S {
        assert!(
            state_id < self.states.len(),
            "state id {state_id} out of range for a process with {} states",
            self.states.len()
        );
        &self.states[state_id]
    }

    /// Retrieve an existing state for mutation.
    ///
    /// # Panics
    ///
    /// Panics if the state id is out of range.
    pub fn get_state_mut(&mut self, state_id: usize) -> &mut S {
        assert!(
            state_id < self.states.len(),
            "state id {state_id} out of range for a process with {} states",
            self.states.len()
        );
        &mut self.states[state_id]
    }

    /// Get or create the state with the given id.
    ///
    /// States with intermediate ids are created as default terminal states.
    pub fn create_state(&mut self, state_id: usize) -> &mut S {
        if state_id >= self.states.len() {
            self.states.resize_with(state_id + 1, S::default);
        }
        &mut self.states[state_id]
    }

    /// Create a new state at the end of the table.
    pub fn append_state(&mut self) -> &mut S {
        self.create_state(self.states.len())
    }

    /// Add a transition sample, creating the source state, action, outcome,
    /// and target state on demand.
    ///
    /// # Panics
    ///
    /// Panics if the probability is negative or not finite.
    pub fn add_transition(
        &mut self,
        from: usize,
        action: usize,
        outcome: usize,
        to: usize,
        probability: f64,
        reward: f64,
    ) {
        // The target must exist so every referenced id is a valid state.
        self.create_state(from.max(to));
        self.states[from]
            .create_transition(action, outcome)
            .add_sample(to, probability, reward);
    }

    /// True iff every outcome of every action of every state sums to one.
    ///
    /// A table with no states, or states with no actions, is normalized.
    pub fn is_normalized(&self) -> bool {
        self.states.iter().all(State::is_normalized)
    }

    /// Rescale all outcome distributions to sum to one.
    ///
    /// Outcomes with zero total mass are left unchanged.
    pub fn normalize(&mut self) {
        for state in &mut self.states {
            state.normalize();
        }
    }

    /// Check a policy pair against the table's action and outcome
    /// cardinalities.
    ///
    /// Terminal states are skipped; their policy entries are meaningless.
    /// Returns the id of the first state whose chosen action or outcome does
    /// not exist (including states not covered by the policy vectors), or
    /// `None` when the pair is fully valid.
    pub fn validate_policy(
        &self,
        policy: &ActionPolicy,
        nature: &OutcomePolicy,
    ) -> Option<usize> {
        for (state_id, state) in self.states.iter().enumerate() {
            if state.is_terminal() {
                continue;
            }
            let (Some(&action), Some(&outcome)) = (policy.get(state_id), nature.get(state_id))
            else {
                return Some(state_id);
            };
            if !state.is_action_outcome_correct(action, outcome) {
                return Some(state_id);
            }
        }
        None
    }

    fn assert_policy_lengths(&self, policy: &ActionPolicy, nature: &OutcomePolicy) {
        assert_eq!(
            policy.len(),
            self.states.len(),
            "action policy must have one entry per state"
        );
        assert_eq!(
            nature.len(),
            self.states.len(),
            "outcome policy must have one entry per state"
        );
    }

    fn check_policy_lengths(&self, policy: &ActionPolicy, nature: &OutcomePolicy) -> Result<()> {
        let expected = self.states.len();
        for got in [policy.len(), nature.len()] {
            if got != expected {
                return Err(Error::PolicyLengthMismatch { expected, got });
            }
        }
        Ok(())
    }
}

impl<S: State + Sync> StateTable<S> {
    /// Construct the dense forward transition matrix for a fixed policy
    /// pair: entry (s, s') is the probability mass from s to s' under s's
    /// resolved action and outcome.
    ///
    /// Terminal states yield an all-zero row. Rows are independent and
    /// filled in parallel over disjoint slices.
    pub fn transition_matrix(
        &self,
        policy: &ActionPolicy,
        nature: &OutcomePolicy,
    ) -> SquareMatrix {
        self.assert_policy_lengths(policy, nature);
        let n = self.states.len();

        let mut result = SquareMatrix::zeros(n);
        result
            .data_mut()
            .par_chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(state_id, row)| {
                let state = &self.states[state_id];
                if state.is_terminal() {
                    return;
                }
                let transition = state.mean_transition(policy[state_id], nature[state_id]);
                for (&target, &probability) in
                    transition.indices().iter().zip(transition.probabilities())
                {
                    row[target] = probability;
                }
            });
        result
    }

    /// Construct the transpose of the forward transition matrix for a fixed
    /// policy pair.
    ///
    /// Each state's resolved distribution lands in a column rather than a
    /// row, so the per-state results are resolved in parallel and scattered
    /// sequentially. Terminal states are skipped explicitly since resolving
    /// a transition on them is undefined.
    pub fn transition_matrix_transposed(
        &self,
        policy: &ActionPolicy,
        nature: &OutcomePolicy,
    ) -> SquareMatrix {
        self.assert_policy_lengths(policy, nature);
        let n = self.states.len();

        let resolved: Vec<Option<&Transition>> = self
            .states
            .par_iter()
            .enumerate()
            .map(|(state_id, state)| {
                if state.is_terminal() {
                    None
                } else {
                    Some(state.mean_transition(policy[state_id], nature[state_id]))
                }
            })
            .collect();

        // Scatter sequentially: multiple sources write into the same rows.
        let mut result = SquareMatrix::zeros(n);
        for (state_id, transition) in resolved.into_iter().enumerate() {
            let Some(transition) = transition else {
                continue;
            };
            for (&target, &probability) in
                transition.indices().iter().zip(transition.probabilities())
            {
                result.set(target, state_id, probability);
            }
        }
        result
    }

    /// Expected immediate reward per state under a fixed policy pair.
    ///
    /// Terminal states contribute 0. Computed as a parallel map over
    /// disjoint output slots.
    pub fn state_rewards(&self, policy: &ActionPolicy, nature: &OutcomePolicy) -> Vec<f64> {
        self.assert_policy_lengths(policy, nature);

        let mut rewards = vec![0.0; self.states.len()];
        rewards
            .par_iter_mut()
            .enumerate()
            .for_each(|(state_id, slot)| {
                let state = &self.states[state_id];
                if !state.is_terminal() {
                    *slot = state.mean_reward(policy[state_id], nature[state_id]);
                }
            });
        rewards
    }

    /// Discounted state-occupancy frequencies under a fixed policy pair.
    ///
    /// Builds the transposed transition matrix Pᵗ, forms `A = I − γ·Pᵗ`, and
    /// solves `A·x = initial` directly, so that
    /// `x = Σ_{t≥0} γᵗ·(Pᵗ)ᵗ·initial`. The initial distribution is expanded
    /// to a dense vector of length `state_count`.
    ///
    /// The direct solve is single-threaded; only the matrix construction is
    /// parallel. This densifies the process and may not scale to very large
    /// state counts.
    ///
    /// # Errors
    ///
    /// - [`Error::DiscountOutOfRange`] when `discount` is outside `[0, 1)`.
    /// - [`Error::PolicyLengthMismatch`] when a policy vector does not cover
    ///   every state.
    /// - [`Error::SingularSystem`] when the linear system is numerically
    ///   singular, typically a non-absorbing chain with discount close to 1.
    pub fn occupancy_frequencies(
        &self,
        initial: &Transition,
        discount: f64,
        policy: &ActionPolicy,
        nature: &OutcomePolicy,
    ) -> Result<Vec<f64>> {
        if !(0.0..1.0).contains(&discount) {
            return Err(Error::DiscountOutOfRange { discount });
        }
        self.check_policy_lengths(policy, nature)?;

        let n = self.states.len();
        let initial_vector = initial.probabilities_vector(n);

        let mut system = self.transition_matrix_transposed(policy, nature);
        system.scale(-discount);
        system.add_identity();

        linalg::solve_in_place(&mut system, initial_vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_state_fills_gaps_with_terminal_states() {
        let mut mdp = Mdp::new();
        mdp.create_state(3);

        assert_eq!(mdp.state_count(), 4);
        for (_, state) in mdp.iter() {
            assert!(state.is_terminal());
        }
    }

    #[test]
    fn append_state_extends_the_table() {
        let mut mdp = Mdp::with_state_count(2);
        mdp.append_state();
        assert_eq!(mdp.state_count(), 3);
    }

    #[test]
    fn add_transition_creates_the_target_state() {
        let mut mdp = Mdp::new();
        mdp.add_transition(0, 0, 0, 5, 1.0, 0.0);

        assert_eq!(mdp.state_count(), 6);
        assert!(mdp.get_state(5).is_terminal());
        assert!(!mdp.get_state(0).is_terminal());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_state_rejects_unknown_ids() {
        Mdp::new().get_state(0);
    }

    #[test]
    fn normalization_sweeps_the_whole_table() {
        let mut mdp = Mdp::new();
        mdp.add_transition(0, 0, 0, 0, 2.0, 1.0);
        mdp.add_transition(0, 0, 0, 1, 2.0, 1.0);
        mdp.add_transition(1, 0, 0, 1, 1.0, 0.0);

        assert!(!mdp.is_normalized());
        mdp.normalize();
        assert!(mdp.is_normalized());
        assert_eq!(
            mdp.get_state(0).mean_transition(0, 0).probabilities(),
            &[0.5, 0.5]
        );
    }

    #[test]
    fn empty_table_is_normalized() {
        assert!(Mdp::new().is_normalized());
    }

    #[test]
    fn validator_flags_missing_policy_entries() {
        let mut mdp = Mdp::new();
        mdp.add_transition(0, 0, 0, 1, 1.0, 0.0);
        mdp.add_transition(1, 0, 0, 1, 1.0, 0.0);

        // Too short: state 1 has no entry.
        assert_eq!(mdp.validate_policy(&vec![0], &vec![0]), Some(1));
    }

    #[test]
    fn validator_ignores_terminal_states() {
        let mut mdp = Mdp::new();
        mdp.add_transition(0, 0, 0, 1, 1.0, 0.0);

        // State 1 is terminal, so its nonsense entries are ignored.
        assert_eq!(mdp.validate_policy(&vec![0, 99], &vec![0, 99]), None);
    }
}
