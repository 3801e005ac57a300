//! Solvers producing deterministic policies for the Tic-Tac-Toe MDP

pub mod policy_iteration;
pub mod q_learning;
pub mod value_iteration;

pub use policy_iteration::{PolicyIterationAgent, PolicyIterationConfig};
pub use q_learning::{QLearningAgent, QLearningConfig, QTable};
pub use value_iteration::{ValueIterationAgent, ValueIterationConfig};

use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    mdp::TttMdp,
    tictactoe::{Action, BoardState},
};

/// One-step expected return of taking `action` in `state` under `values`:
/// `Σ p · (r + γ · V(s'))` over the transition distribution.
pub(crate) fn expected_return(
    mdp: &TttMdp,
    state: &BoardState,
    action: &Action,
    discount: f64,
    values: &HashMap<BoardState, f64>,
) -> Result<f64> {
    let transitions = mdp.generate_transitions(state, action)?;

    let mut expected = 0.0;
    for t in &transitions {
        let next_value =
            values
                .get(&t.outcome.next_state)
                .copied()
                .ok_or_else(|| Error::UnknownState {
                    state: t.outcome.next_state.encode(),
                })?;
        expected += t.probability * (t.outcome.reward + discount * next_value);
    }
    Ok(expected)
}

/// One-step look-ahead over every legal action, returning the maximizing
/// action and its value. Ties keep the first action whose value was strictly
/// greater than everything before it. Returns `None` for states with no
/// legal actions.
pub(crate) fn greedy_lookahead(
    mdp: &TttMdp,
    state: &BoardState,
    discount: f64,
    values: &HashMap<BoardState, f64>,
) -> Result<Option<(Action, f64)>> {
    let mut best: Option<(Action, f64)> = None;

    for action in state.possible_actions() {
        let value = expected_return(mdp, state, &action, discount, values)?;
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((action, value)),
        }
    }

    Ok(best)
}
