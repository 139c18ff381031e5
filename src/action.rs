//! Actions and their outcome sets.
//!
//! An action owns the outcomes nature can choose among. A plain MDP action
//! ([`RegularAction`]) has exactly one outcome; a robust action
//! ([`RobustAction`]) carries a discrete set of outcomes, one per member of
//! the uncertainty set. Both variants implement the [`Action`] capability
//! contract so states and the process container can be written once.

use serde::{Deserialize, Serialize};

use crate::transition::Transition;

/// Capability contract shared by plain and robust actions.
///
/// Outcome ids are contiguous non-negative integers scoped to the action.
/// Resolution methods (`mean_reward`, `mean_transition`) assume a valid
/// outcome id; callers gate untrusted ids through
/// [`Action::is_outcome_correct`] first.
pub trait Action: Clone + Default + Serialize {
    /// Number of outcomes in the uncertainty set.
    fn outcome_count(&self) -> usize;

    /// Read-only view of all outcomes.
    fn outcomes(&self) -> &[Transition];

    /// Get or create the outcome with the given id, filling any gap with
    /// default empty outcomes, and return its transition for mutation.
    fn create_transition(&mut self, outcome: usize) -> &mut Transition;

    /// Expected immediate reward of the chosen outcome.
    fn mean_reward(&self, outcome: usize) -> f64;

    /// Transition distribution of the chosen outcome.
    fn mean_transition(&self, outcome: usize) -> &Transition;

    /// True when the outcome id indexes an existing outcome.
    fn is_outcome_correct(&self, outcome: usize) -> bool {
        outcome < self.outcome_count()
    }

    /// True when every outcome's probabilities sum to one.
    fn is_normalized(&self) -> bool {
        self.outcomes().iter().all(Transition::is_normalized)
    }

    /// Rescale every outcome's probabilities to sum to one.
    fn normalize(&mut self);
}

/// A plain MDP action: exactly one outcome, always id 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegularAction {
    outcome: Transition,
}

impl RegularAction {
    /// Create an action around an existing outcome distribution.
    pub fn new(outcome: Transition) -> Self {
        Self { outcome }
    }

    /// The single outcome of this action.
    pub fn outcome(&self) -> &Transition {
        &self.outcome
    }
}

impl Action for RegularAction {
    fn outcome_count(&self) -> usize {
        1
    }

    fn outcomes(&self) -> &[Transition] {
        std::slice::from_ref(&self.outcome)
    }

    fn create_transition(&mut self, outcome: usize) -> &mut Transition {
        assert!(
            outcome == 0,
            "a plain action has a single outcome with id 0, got {outcome}"
        );
        &mut self.outcome
    }

    fn mean_reward(&self, outcome: usize) -> f64 {
        assert!(outcome == 0, "invalid outcome id {outcome} for a plain action");
        self.outcome.expected_reward()
    }

    fn mean_transition(&self, outcome: usize) -> &Transition {
        assert!(outcome == 0, "invalid outcome id {outcome} for a plain action");
        assert!(
            !self.outcome.is_empty(),
            "cannot resolve a transition with no target states"
        );
        &self.outcome
    }

    fn normalize(&mut self) {
        self.outcome.normalize();
    }
}

/// A robust action: a discrete set of outcomes minimized over by nature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobustAction {
    outcomes: Vec<Transition>,
}

impl RobustAction {
    /// Create an action with the given outcome set.
    pub fn new(outcomes: Vec<Transition>) -> Self {
        Self { outcomes }
    }

    /// Get or create the outcome with the given id.
    ///
    /// Outcomes with intermediate ids are created empty, mirroring the
    /// gap-filling rule of the state table.
    pub fn create_outcome(&mut self, outcome: usize) -> &mut Transition {
        if outcome >= self.outcomes.len() {
            self.outcomes.resize_with(outcome + 1, Transition::default);
        }
        &mut self.outcomes[outcome]
    }
}

impl Action for RobustAction {
    fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    fn outcomes(&self) -> &[Transition] {
        &self.outcomes
    }

    fn create_transition(&mut self, outcome: usize) -> &mut Transition {
        self.create_outcome(outcome)
    }

    fn mean_reward(&self, outcome: usize) -> f64 {
        self.mean_transition(outcome).expected_reward()
    }

    fn mean_transition(&self, outcome: usize) -> &Transition {
        assert!(
            !self.outcomes.is_empty(),
            "cannot resolve an action with no outcomes"
        );
        let transition = self
            .outcomes
            .get(outcome)
            .unwrap_or_else(|| panic!("invalid outcome id {outcome}"));
        assert!(
            !transition.is_empty(),
            "cannot resolve a transition with no target states"
        );
        transition
    }

    fn normalize(&mut self) {
        for outcome in &mut self.outcomes {
            outcome.normalize();
        }
    }
}
