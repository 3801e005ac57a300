//! Value-iteration solver: a fixed budget of synchronous Bellman-optimality
//! sweeps followed by greedy policy extraction

use std::collections::HashMap;

use crate::{
    agents::{expected_return, greedy_lookahead},
    error::Result,
    mdp::TttMdp,
    policy::Policy,
    tictactoe::{Action, BoardState, Player, generate_all_states},
};

/// Hyperparameters for value iteration
#[derive(Debug, Clone, Copy)]
pub struct ValueIterationConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Number of sweeps to run. This is a fixed budget, not a convergence
    /// test: callers needing tighter value accuracy must raise it.
    pub sweeps: usize,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            sweeps: 50,
        }
    }
}

impl ValueIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_sweeps(mut self, sweeps: usize) -> Self {
        self.sweeps = sweeps;
        self
    }
}

/// Dynamic-programming solver performing synchronous Bellman-optimality
/// sweeps.
///
/// Unlike policy evaluation, each sweep is double-buffered: a new value
/// table is built entirely from the previous one and swapped in atomically,
/// so no state sees a partially updated table.
pub struct ValueIterationAgent {
    mdp: TttMdp,
    config: ValueIterationConfig,
    states: Vec<BoardState>,
    values: HashMap<BoardState, f64>,
}

impl ValueIterationAgent {
    /// Create a solver with zero-initialized values over the full state space
    pub fn new(mdp: TttMdp, config: ValueIterationConfig) -> Self {
        let states = generate_all_states(Player::X);
        let values = states.iter().map(|&s| (s, 0.0)).collect();

        Self {
            mdp,
            config,
            states,
            values,
        }
    }

    /// Current value estimate for a state
    pub fn value(&self, state: &BoardState) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// One-step expected return of `action` in `state` under the current
    /// value table
    pub fn action_value(&self, state: &BoardState, action: &Action) -> Result<f64> {
        expected_return(&self.mdp, state, action, self.config.discount, &self.values)
    }

    /// Run the configured number of sweeps. Each sweep computes
    /// `V'(s) = max_a Σ p·(r + γ·V(s'))` for every non-terminal state from
    /// the previous table; terminal states carry their value forward
    /// unchanged.
    pub fn iterate(&mut self) -> Result<()> {
        for _ in 0..self.config.sweeps {
            let mut updated = HashMap::with_capacity(self.values.len());

            for state in &self.states {
                if state.is_terminal() {
                    let value = self.values.get(state).copied().unwrap_or(0.0);
                    updated.insert(*state, value);
                    continue;
                }

                let Some((_, best_value)) =
                    greedy_lookahead(&self.mdp, state, self.config.discount, &self.values)?
                else {
                    continue;
                };
                updated.insert(*state, best_value);
            }

            self.values = updated;
        }
        Ok(())
    }

    /// Extract the greedy policy under the final value table. Ties keep the
    /// first action seen with a strictly greater value; terminal states
    /// contribute no entry.
    pub fn extract_policy(&self) -> Result<Policy> {
        let mut policy = Policy::new();

        for state in &self.states {
            if state.is_terminal() {
                continue;
            }
            if let Some((action, _)) =
                greedy_lookahead(&self.mdp, state, self.config.discount, &self.values)?
            {
                policy.insert(*state, action);
            }
        }

        Ok(policy)
    }

    /// Run the sweep budget and extract the resulting policy
    pub fn train(&mut self) -> Result<Policy> {
        self.iterate()?;
        self.extract_policy()
    }
}
