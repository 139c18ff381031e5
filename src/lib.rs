//! Modeling and policy evaluation for plain and robust Markov decision
//! processes
//!
//! This crate provides:
//! - A generic, dynamically growing state table for sparse MDPs, polymorphic
//!   over the state representation ([`Mdp`] for plain single-outcome actions,
//!   [`RobustMdp`] for adversarial outcome sets)
//! - Dense transition-matrix construction for a fixed decision-maker/nature
//!   policy pair, forward and transposed, with parallel row fills
//! - Discounted state-occupancy frequencies via a direct pivoted linear solve
//! - Parallel expected-reward aggregation and policy validation
//! - CSV, JSON, and text dumps for persistence and debugging
//!
//! The robust model follows the uncertain-MDP formulation: per action, an
//! adversarial "nature" additionally selects one outcome from a discrete
//! uncertainty set. A plain MDP is the special case of one outcome per
//! action.
//!
//! # Validation contract
//!
//! The matrix, reward, and occupancy routines assume a valid policy pair and
//! keep their hot parallel loops free of per-entry checks. Call
//! [`StateTable::validate_policy`] first to obtain a safe diagnostic for an
//! untrusted policy; handing an invalid pair to the evaluation routines is a
//! programming error.
//!
//! # Example
//!
//! ```
//! use rmdp::{Mdp, Transition};
//!
//! let mut mdp = Mdp::new();
//! // A two-state chain: state 0 moves to state 1, state 1 loops with
//! // reward 1.
//! mdp.add_transition(0, 0, 0, 1, 1.0, 0.0);
//! mdp.add_transition(1, 0, 0, 1, 1.0, 1.0);
//!
//! let policy = vec![0, 0];
//! let nature = vec![0, 0];
//! assert!(mdp.validate_policy(&policy, &nature).is_none());
//!
//! let rewards = mdp.state_rewards(&policy, &nature);
//! assert_eq!(rewards, vec![0.0, 1.0]);
//!
//! let occupancy = mdp
//!     .occupancy_frequencies(&Transition::single(0, 1.0), 0.5, &policy, &nature)
//!     .unwrap();
//! assert!((occupancy[0] - 1.0).abs() < 1e-9);
//! ```

pub mod action;
pub mod error;
pub mod export;
pub mod linalg;
pub mod process;
pub mod state;
pub mod transition;

pub use action::{Action, RegularAction, RobustAction};
pub use error::{Error, Result};
pub use linalg::SquareMatrix;
pub use process::{ActionPolicy, Mdp, OutcomePolicy, RobustMdp, StateTable};
pub use state::{GenericState, RegularState, RobustState, State};
pub use transition::Transition;
