//! States and the polymorphic state capability contract.
//!
//! The process container is written once against the [`State`] trait and
//! instantiated per variant: [`RegularState`] for plain single-outcome
//! actions and [`RobustState`] for adversarial outcome sets. Both are the
//! same generic structure parameterized by the action type, so the variants
//! stay structurally identical and cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::{
    action::{Action, RegularAction, RobustAction},
    transition::Transition,
};

/// Capability contract of a single decision-process state.
///
/// A state owns zero or more actions; a state with zero actions is terminal,
/// has value 0 by convention, and is never resolved for transitions or
/// rewards. Action ids are contiguous non-negative integers scoped to the
/// state; outcome ids are scoped to the (state, action) pair.
pub trait State: Clone + Default + Serialize {
    /// Number of actions available in this state.
    fn action_count(&self) -> usize;

    /// Number of outcomes of the given action.
    fn outcome_count(&self, action: usize) -> usize;

    /// Read-only view of the outcomes of the given action.
    fn outcomes(&self, action: usize) -> &[Transition];

    /// Get or create the transition for an (action, outcome) pair, filling
    /// gaps with default actions and outcomes.
    fn create_transition(&mut self, action: usize, outcome: usize) -> &mut Transition;

    /// Expected immediate reward for a chosen action and outcome.
    ///
    /// Assumes a valid pair; see [`State::is_action_outcome_correct`].
    fn mean_reward(&self, action: usize, outcome: usize) -> f64;

    /// Transition distribution for a chosen action and outcome.
    ///
    /// Assumes a valid pair; see [`State::is_action_outcome_correct`].
    fn mean_transition(&self, action: usize, outcome: usize) -> &Transition;

    /// True when the pair indexes an existing action and outcome.
    fn is_action_outcome_correct(&self, action: usize, outcome: usize) -> bool;

    /// True when every outcome of every action is normalized.
    fn is_normalized(&self) -> bool;

    /// Rescale every outcome of every action to sum to one.
    fn normalize(&mut self);

    /// A state with no actions is terminal.
    fn is_terminal(&self) -> bool {
        self.action_count() == 0
    }
}

/// A state generic over its action representation.
///
/// Serializes as `{"actions": [...]}` with each action produced by its own
/// serializer; this is the element shape used by the JSON dump of the whole
/// process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericState<A> {
    actions: Vec<A>,
}

/// State of a plain MDP: one outcome per action.
pub type RegularState = GenericState<RegularAction>;

/// State of a robust MDP: a discrete outcome set per action.
pub type RobustState = GenericState<RobustAction>;

impl<A> Default for GenericState<A> {
    fn default() -> Self {
        Self { actions: Vec::new() }
    }
}

impl<A: Action> GenericState<A> {
    /// Create a state owning the given actions.
    pub fn new(actions: Vec<A>) -> Self {
        Self { actions }
    }

    /// Read-only view of the actions.
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Retrieve an existing action.
    ///
    /// # Panics
    ///
    /// Panics if the action id is out of range.
    pub fn get_action(&self, action: usize) -> &A {
        assert!(
            action < self.actions.len(),
            "action id {action} out of range for a state with {} actions",
            self.actions.len()
        );
        &self.actions[action]
    }

    /// Get or create the action with the given id, filling any gap with
    /// default (outcome-free) actions.
    pub fn create_action(&mut self, action: usize) -> &mut A {
        if action >= self.actions.len() {
            self.actions.resize_with(action + 1, A::default);
        }
        &mut self.actions[action]
    }
}

impl<A: Action> State for GenericState<A> {
    fn action_count(&self) -> usize {
        self.actions.len()
    }

    fn outcome_count(&self, action: usize) -> usize {
        self.get_action(action).outcome_count()
    }

    fn outcomes(&self, action: usize) -> &[Transition] {
        self.get_action(action).outcomes()
    }

    fn create_transition(&mut self, action: usize, outcome: usize) -> &mut Transition {
        self.create_action(action).create_transition(outcome)
    }

    fn mean_reward(&self, action: usize, outcome: usize) -> f64 {
        self.get_action(action).mean_reward(outcome)
    }

    fn mean_transition(&self, action: usize, outcome: usize) -> &Transition {
        self.get_action(action).mean_transition(outcome)
    }

    fn is_action_outcome_correct(&self, action: usize, outcome: usize) -> bool {
        match self.actions.get(action) {
            Some(chosen) => chosen.is_outcome_correct(outcome),
            None => false,
        }
    }

    fn is_normalized(&self) -> bool {
        self.actions.iter().all(Action::is_normalized)
    }

    fn normalize(&mut self) {
        for action in &mut self.actions {
            action.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_without_actions_is_terminal() {
        let state = RegularState::default();
        assert!(state.is_terminal());
        assert_eq!(state.action_count(), 0);
    }

    #[test]
    fn create_action_fills_gaps_with_terminal_defaults() {
        let mut state = RobustState::default();
        state.create_transition(2, 0).add_sample(0, 1.0, 0.0);

        assert_eq!(state.action_count(), 3);
        assert_eq!(state.outcome_count(0), 0);
        assert_eq!(state.outcome_count(2), 1);
        assert!(!state.is_terminal());
    }

    #[test]
    fn correctness_check_covers_action_and_outcome() {
        let mut state = RobustState::default();
        state.create_transition(0, 1).add_sample(0, 1.0, 0.0);

        assert!(state.is_action_outcome_correct(0, 0));
        assert!(state.is_action_outcome_correct(0, 1));
        assert!(!state.is_action_outcome_correct(0, 2));
        assert!(!state.is_action_outcome_correct(1, 0));
    }

    #[test]
    fn resolution_reads_the_chosen_pair() {
        let mut state = RobustState::default();
        state.create_transition(0, 0).add_sample(1, 1.0, 2.0);
        state.create_transition(0, 1).add_sample(2, 1.0, -1.0);

        assert_eq!(state.mean_transition(0, 0).indices(), &[1]);
        assert_eq!(state.mean_transition(0, 1).indices(), &[2]);
        assert!((state.mean_reward(0, 1) - -1.0).abs() < 1e-12);
    }

    #[test]
    fn normalization_sweeps_every_action() {
        let mut state = RegularState::default();
        state.create_transition(0, 0).add_sample(0, 2.0, 0.0);
        state.create_transition(1, 0).add_sample(1, 1.0, 0.0);

        assert!(!state.is_normalized());
        state.normalize();
        assert!(state.is_normalized());
    }
}
