//! Tic-Tac-Toe as a Markov decision process, solved three ways.
//!
//! The game is modelled as an episodic MDP from the X player's point of
//! view: each transition folds the agent's move and a uniformly random
//! opponent reply into a single step. Three solvers produce a
//! [`Policy`] over the non-terminal X-to-move states:
//!
//! - [`agents::PolicyIterationAgent`] - iterative policy evaluation and
//!   greedy improvement, run to a fixed point
//! - [`agents::ValueIterationAgent`] - a fixed budget of synchronous
//!   Bellman optimality sweeps
//! - [`agents::QLearningAgent`] - tabular epsilon-greedy Q-learning
//!   against the sampled environment
//!
//! Trained policies can be saved to JSON or MessagePack and pitted
//! against a random opponent with [`evaluate::evaluate_policy`].

pub mod agents;
pub mod cli;
pub mod env;
pub mod error;
pub mod evaluate;
pub mod mdp;
pub mod observer;
pub mod policy;
pub mod tictactoe;

pub use env::TttEnvironment;
pub use error::{Error, Result};
pub use mdp::{Outcome, Rewards, TransitionProb, TttMdp};
pub use observer::{ProgressObserver, TrainingObserver};
pub use policy::Policy;
pub use tictactoe::{Action, BoardState, Cell, Player};
