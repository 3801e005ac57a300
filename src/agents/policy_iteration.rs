//! Policy-iteration solver: alternating policy evaluation and greedy
//! improvement until the policy reaches a fixed point

use std::collections::HashMap;

use rand::seq::IndexedRandom;

use crate::{
    agents::{expected_return, greedy_lookahead},
    env::build_rng,
    error::Result,
    mdp::TttMdp,
    observer::TrainingObserver,
    policy::Policy,
    tictactoe::{Action, BoardState, Player, generate_all_states},
};

/// Hyperparameters for policy iteration
#[derive(Debug, Clone, Copy)]
pub struct PolicyIterationConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Evaluation stops once the largest per-sweep value change falls
    /// strictly below this threshold
    pub delta: f64,
    /// Seed for the random initial policy
    pub seed: Option<u64>,
}

impl Default for PolicyIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            delta: 0.1,
            seed: None,
        }
    }
}

impl PolicyIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Dynamic-programming solver alternating full policy evaluation with greedy
/// policy improvement.
///
/// Evaluation sweeps update values in place, so later states within a sweep
/// see values already written earlier in the same sweep. The outer loop has
/// no iteration cap: the policy space is finite and each improvement step is
/// non-decreasing in value, so a fixed point is always reached.
pub struct PolicyIterationAgent {
    mdp: TttMdp,
    config: PolicyIterationConfig,
    states: Vec<BoardState>,
    values: HashMap<BoardState, f64>,
    policy: HashMap<BoardState, Action>,
    observers: Vec<Box<dyn TrainingObserver>>,
}

impl PolicyIterationAgent {
    /// Create a solver with zero-initialized values and a uniformly random
    /// initial policy over each state's legal actions.
    pub fn new(mdp: TttMdp, config: PolicyIterationConfig) -> Self {
        let states = generate_all_states(Player::X);
        let values = states.iter().map(|&s| (s, 0.0)).collect();

        let mut rng = build_rng(config.seed);
        let mut policy = HashMap::new();
        for state in &states {
            if state.is_terminal() {
                continue;
            }
            let actions = state.possible_actions();
            if let Some(&action) = actions.choose(&mut rng) {
                policy.insert(*state, action);
            }
        }

        Self {
            mdp,
            config,
            states,
            values,
            policy,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Current value estimate for a state
    pub fn value(&self, state: &BoardState) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// Action currently prescribed for a state
    pub fn policy_action(&self, state: &BoardState) -> Option<Action> {
        self.policy.get(state).copied()
    }

    fn notify_skipped(&mut self, state: BoardState, reason: &str) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_state_skipped(&state, reason)?;
        }
        Ok(())
    }

    /// Sweep every non-terminal state, backing up `V(s) = Σ p·(r + γ·V(s'))`
    /// under the current policy, until the maximum absolute change in one
    /// sweep drops strictly below `delta`. Updates are applied in place.
    ///
    /// Returns the maximum change observed in each sweep, in order.
    pub fn evaluate_policy(&mut self, delta: f64) -> Result<Vec<f64>> {
        let mut sweep_changes = Vec::new();

        loop {
            let mut maximum_change: f64 = 0.0;

            for i in 0..self.states.len() {
                let state = self.states[i];
                if state.is_terminal() {
                    continue;
                }

                let Some(action) = self.policy.get(&state).copied() else {
                    self.notify_skipped(state, "no policy action")?;
                    continue;
                };

                let expected =
                    expected_return(&self.mdp, &state, &action, self.config.discount, &self.values)?;

                let previous = self.values.get(&state).copied().unwrap_or(0.0);
                let change = (expected - previous).abs();
                self.values.insert(state, expected);
                maximum_change = maximum_change.max(change);
            }

            sweep_changes.push(maximum_change);
            if maximum_change < delta {
                break;
            }
        }

        Ok(sweep_changes)
    }

    /// One-step greedy look-ahead from every non-terminal state, switching
    /// the policy to the maximizing action where it differs. Ties keep the
    /// first action seen with a strictly greater value.
    ///
    /// Returns true if any state's action changed.
    pub fn improve_policy(&mut self) -> Result<bool> {
        let mut policy_changed = false;

        for i in 0..self.states.len() {
            let state = self.states[i];
            if state.is_terminal() {
                continue;
            }

            let Some(current) = self.policy.get(&state).copied() else {
                self.notify_skipped(state, "no policy action")?;
                continue;
            };

            let Some((best_action, _)) =
                greedy_lookahead(&self.mdp, &state, self.config.discount, &self.values)?
            else {
                continue;
            };

            if best_action != current {
                self.policy.insert(state, best_action);
                policy_changed = true;
            }
        }

        Ok(policy_changed)
    }

    /// Alternate evaluation and improvement until improvement reports no
    /// change, then return the converged policy.
    pub fn train(&mut self) -> Result<Policy> {
        loop {
            self.evaluate_policy(self.config.delta)?;
            if !self.improve_policy()? {
                break;
            }
        }

        let mut policy = Policy::new();
        for (state, action) in &self.policy {
            policy.insert(*state, *action);
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_policy_covers_every_non_terminal_state() {
        let agent = PolicyIterationAgent::new(
            TttMdp::new(),
            PolicyIterationConfig::default().with_seed(42),
        );

        for state in &agent.states {
            if state.is_terminal() {
                assert!(agent.policy_action(state).is_none());
            } else {
                let action = agent.policy_action(state).expect("missing initial action");
                assert!(state.legal_moves().contains(&action.position));
            }
            assert_eq!(agent.value(state), Some(0.0));
        }
    }

    #[test]
    fn seeded_initial_policy_is_reproducible() {
        let a = PolicyIterationAgent::new(
            TttMdp::new(),
            PolicyIterationConfig::default().with_seed(7),
        );
        let b = PolicyIterationAgent::new(
            TttMdp::new(),
            PolicyIterationConfig::default().with_seed(7),
        );

        assert_eq!(a.policy, b.policy);
    }

    #[test]
    fn evaluation_reduces_changes_below_delta() {
        let mut agent = PolicyIterationAgent::new(
            TttMdp::new(),
            PolicyIterationConfig::default().with_seed(3),
        );

        let changes = agent.evaluate_policy(0.1).unwrap();
        assert!(!changes.is_empty());
        assert!(*changes.last().unwrap() < 0.1);
    }
}
