//! Tests for matrix construction, reward aggregation, occupancy solving, and
//! policy validation under fixed policy pairs.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rmdp::{Error, Mdp, RobustMdp, Transition};

/// The three-state example model: two actions per state, one outcome each.
///
/// Action 0: s0->s1, s1->s1 (r=1), s2->s1 (r=1)
/// Action 1: s0->s1, s1->s2, s2->s2 (r=1.1)
fn three_state_model() -> Mdp {
    let mut mdp = Mdp::new();

    mdp.add_transition(0, 0, 0, 1, 1.0, 0.0);
    mdp.add_transition(1, 0, 0, 1, 1.0, 1.0);
    mdp.add_transition(2, 0, 0, 1, 1.0, 1.0);

    mdp.add_transition(0, 1, 0, 1, 1.0, 0.0);
    mdp.add_transition(1, 1, 0, 2, 1.0, 0.0);
    mdp.add_transition(2, 1, 0, 2, 1.0, 1.1);

    mdp
}

#[test]
fn test_validator_accepts_a_correct_policy_pair() {
    let mdp = three_state_model();
    assert_eq!(mdp.validate_policy(&vec![0, 0, 0], &vec![0, 0, 0]), None);
    assert_eq!(mdp.validate_policy(&vec![1, 1, 1], &vec![0, 0, 0]), None);
}

#[test]
fn test_validator_returns_the_first_offending_state() {
    let mdp = three_state_model();

    // Action id 5 does not exist at state 0.
    assert_eq!(mdp.validate_policy(&vec![5, 0, 0], &vec![0, 0, 0]), Some(0));
    // Outcome id 1 does not exist for single-outcome actions.
    assert_eq!(mdp.validate_policy(&vec![0, 0, 0], &vec![0, 1, 0]), Some(1));
}

#[test]
fn test_forward_rows_sum_to_outgoing_mass() {
    let mut mdp = three_state_model();
    // An extra terminal state must produce an all-zero row.
    mdp.create_state(3);
    assert!(mdp.is_normalized());

    let policy = vec![0, 1, 1, 0];
    let nature = vec![0, 0, 0, 0];
    let matrix = mdp.transition_matrix(&policy, &nature);

    for state_id in 0..3 {
        let row_sum: f64 = matrix.row(state_id).iter().sum();
        assert!(
            (row_sum - 1.0).abs() < 1e-12,
            "non-terminal row {state_id} should sum to 1, got {row_sum}"
        );
    }
    let terminal_sum: f64 = matrix.row(3).iter().sum();
    assert_eq!(terminal_sum, 0.0);
}

#[test]
fn test_transposed_matrix_is_the_exact_transpose() {
    let mdp = three_state_model();
    let policy = vec![1, 0, 1];
    let nature = vec![0, 0, 0];

    let forward = mdp.transition_matrix(&policy, &nature);
    let transposed = mdp.transition_matrix_transposed(&policy, &nature);

    assert_eq!(forward.transposed(), transposed);
}

#[test]
fn test_reward_vector_for_terminal_and_self_loop_states() {
    let mut terminal_only = Mdp::new();
    terminal_only.create_state(0);
    assert_eq!(terminal_only.state_rewards(&vec![0], &vec![0]), vec![0.0]);

    let mut self_loop = Mdp::new();
    self_loop.add_transition(0, 0, 0, 0, 1.0, 4.5);
    assert_eq!(self_loop.state_rewards(&vec![0], &vec![0]), vec![4.5]);
}

#[test]
fn test_reward_vector_resolves_the_chosen_action() {
    let mdp = three_state_model();
    let nature = vec![0, 0, 0];

    assert_eq!(mdp.state_rewards(&vec![0, 0, 0], &nature), vec![0.0, 1.0, 1.0]);
    assert_eq!(mdp.state_rewards(&vec![0, 1, 1], &nature), vec![0.0, 0.0, 1.1]);
}

#[test]
fn test_occupancy_with_zero_discount_returns_the_initial_distribution() {
    let mdp = three_state_model();
    let initial = Transition::from_entries(&[0, 2], &[0.4, 0.6], &[0.0, 0.0]);

    let occupancy = mdp
        .occupancy_frequencies(&initial, 0.0, &vec![0, 0, 0], &vec![0, 0, 0])
        .expect("solve should succeed");

    assert!((occupancy[0] - 0.4).abs() < 1e-12);
    assert!((occupancy[1] - 0.0).abs() < 1e-12);
    assert!((occupancy[2] - 0.6).abs() < 1e-12);
}

#[test]
fn test_occupancy_of_an_absorbing_chain_matches_the_geometric_series() {
    // s0 -> s1, s1 loops on itself.
    let mut mdp = Mdp::new();
    mdp.add_transition(0, 0, 0, 1, 1.0, 0.0);
    mdp.add_transition(1, 0, 0, 1, 1.0, 0.0);

    let discount = 0.9;
    let occupancy = mdp
        .occupancy_frequencies(
            &Transition::single(0, 1.0),
            discount,
            &vec![0, 0],
            &vec![0, 0],
        )
        .expect("solve should succeed");

    // x0 = 1 (visited only at t=0); x1 = gamma + gamma^2 + ...
    assert!((occupancy[0] - 1.0).abs() < 1e-9);
    assert!((occupancy[1] - discount / (1.0 - discount)).abs() < 1e-9);
}

#[test]
fn test_occupancy_satisfies_the_fixed_point_identity_on_random_models() {
    // x = init + gamma * P^T * x must hold for the computed occupancy.
    let mut rng = StdRng::seed_from_u64(171);
    let n = 8;
    let discount = 0.9;

    let mut mdp = Mdp::new();
    for from in 0..n {
        let first = rng.random_range(0..n);
        let second = rng.random_range(0..n);
        let split: f64 = rng.random_range(0.05..0.95);
        mdp.add_transition(from, 0, 0, first, split, rng.random_range(-1.0..1.0));
        mdp.add_transition(from, 0, 0, second, 1.0 - split, rng.random_range(-1.0..1.0));
    }
    mdp.normalize();

    let policy = vec![0; n];
    let nature = vec![0; n];
    let initial = Transition::single(0, 1.0);

    let occupancy = mdp
        .occupancy_frequencies(&initial, discount, &policy, &nature)
        .expect("solve should succeed");
    let transposed = mdp.transition_matrix_transposed(&policy, &nature);
    let initial_vector = initial.probabilities_vector(n);

    for row in 0..n {
        let mut propagated = 0.0;
        for column in 0..n {
            propagated += transposed.get(row, column) * occupancy[column];
        }
        let expected = initial_vector[row] + discount * propagated;
        assert!(
            (occupancy[row] - expected).abs() < 1e-8,
            "fixed point violated at state {row}: {} vs {expected}",
            occupancy[row]
        );
    }
}

#[test]
fn test_occupancy_rejects_out_of_range_discounts() {
    let mdp = three_state_model();
    let initial = Transition::single(0, 1.0);
    let policy = vec![0, 0, 0];
    let nature = vec![0, 0, 0];

    for discount in [1.0, 1.5, -0.1] {
        let result = mdp.occupancy_frequencies(&initial, discount, &policy, &nature);
        assert!(matches!(result, Err(Error::DiscountOutOfRange { .. })));
    }
}

#[test]
fn test_occupancy_rejects_short_policies() {
    let mdp = three_state_model();
    let result = mdp.occupancy_frequencies(
        &Transition::single(0, 1.0),
        0.5,
        &vec![0, 0],
        &vec![0, 0, 0],
    );
    assert!(matches!(
        result,
        Err(Error::PolicyLengthMismatch { expected: 3, got: 2 })
    ));
}

#[test]
fn test_occupancy_reports_singular_systems() {
    // A self-loop with probability 2 makes 1 - 0.5 * 2 = 0.
    let mut mdp = Mdp::new();
    mdp.add_transition(0, 0, 0, 0, 2.0, 0.0);

    let result =
        mdp.occupancy_frequencies(&Transition::single(0, 1.0), 0.5, &vec![0], &vec![0]);
    assert!(matches!(result, Err(Error::SingularSystem { size: 1 })));
}

#[test]
fn test_nature_policy_selects_the_outcome_in_robust_models() {
    // One state with one action and two outcomes: stay put or move to 1.
    let mut robust = RobustMdp::new();
    robust.add_transition(0, 0, 0, 0, 1.0, 0.0);
    robust.add_transition(0, 0, 1, 1, 1.0, -2.0);
    robust.create_state(1);

    let policy = vec![0, 0];

    let stay = robust.transition_matrix(&policy, &vec![0, 0]);
    assert_eq!(stay.get(0, 0), 1.0);
    assert_eq!(stay.get(0, 1), 0.0);

    let leave = robust.transition_matrix(&policy, &vec![1, 0]);
    assert_eq!(leave.get(0, 0), 0.0);
    assert_eq!(leave.get(0, 1), 1.0);

    assert_eq!(robust.state_rewards(&policy, &vec![0, 0]), vec![0.0, 0.0]);
    assert_eq!(robust.state_rewards(&policy, &vec![1, 0]), vec![-2.0, 0.0]);
}

#[test]
fn test_robust_validator_checks_outcome_cardinality() {
    let mut robust = RobustMdp::new();
    robust.add_transition(0, 0, 0, 0, 1.0, 0.0);
    robust.add_transition(0, 0, 1, 0, 1.0, 0.0);

    assert_eq!(robust.validate_policy(&vec![0], &vec![1]), None);
    assert_eq!(robust.validate_policy(&vec![0], &vec![2]), Some(0));
}
