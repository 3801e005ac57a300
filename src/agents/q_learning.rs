//! Q-learning solver: model-free temporal-difference control through
//! simulated episodes against the environment's opponent

use std::collections::HashMap;

use rand::{Rng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    env::{TttEnvironment, build_rng},
    error::{Error, Result},
    observer::TrainingObserver,
    policy::Policy,
    tictactoe::{Action, BoardState, Player, generate_all_states},
};

/// Hyperparameters for Q-learning
#[derive(Debug, Clone, Copy)]
pub struct QLearningConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Multiplicative epsilon decay applied after each episode
    pub epsilon_decay: f64,
    /// Exploration floor; epsilon never decays below this
    pub min_epsilon: f64,
    /// Number of episodes to simulate
    pub episodes: usize,
    /// Seed for exploration decisions
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            epsilon: 0.1,
            epsilon_decay: 0.995,
            min_epsilon: 0.1,
            episodes: 70_000,
            seed: None,
        }
    }
}

impl QLearningConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Q-table mapping (state, action) pairs to action values.
///
/// Terminal states carry a single sentinel entry with no action.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    q_values: HashMap<(BoardState, Option<Action>), f64>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the Q-value for a state-action pair (0 if unseen)
    pub fn get(&self, state: &BoardState, action: Option<Action>) -> f64 {
        self.q_values.get(&(*state, action)).copied().unwrap_or(0.0)
    }

    /// Set the Q-value for a state-action pair
    pub fn set(&mut self, state: BoardState, action: Option<Action>, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Maximum Q-value over the given actions in a state
    pub fn max_q(&self, state: &BoardState, actions: &[Action]) -> f64 {
        actions
            .iter()
            .map(|&action| self.get(state, Some(action)))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action over the given candidates. Ties keep the first action
    /// whose value was strictly greater than everything before it.
    pub fn greedy_action(&self, state: &BoardState, actions: &[Action]) -> Option<Action> {
        let mut candidates = actions.iter();
        let mut best = *candidates.next()?;
        let mut best_value = self.get(state, Some(best));

        for &action in candidates {
            let value = self.get(state, Some(action));
            if value > best_value {
                best = action;
                best_value = value;
            }
        }

        Some(best)
    }

    /// Total number of entries stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }
}

/// Model-free solver learning tabular action values from simulated play.
pub struct QLearningAgent {
    env: TttEnvironment,
    config: QLearningConfig,
    states: Vec<BoardState>,
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
    observers: Vec<Box<dyn TrainingObserver>>,
}

impl QLearningAgent {
    /// Create an agent with a zero-seeded Q-table: one entry per legal
    /// (state, action) pair, plus a null-action sentinel for each terminal
    /// state.
    pub fn new(env: TttEnvironment, config: QLearningConfig) -> Self {
        let states = generate_all_states(Player::X);

        let mut q_table = QTable::new();
        for state in &states {
            if state.is_terminal() {
                q_table.set(*state, None, 0.0);
                continue;
            }
            for action in state.possible_actions() {
                q_table.set(*state, Some(action), 0.0);
            }
        }

        let epsilon = config.epsilon;
        let rng = build_rng(config.seed);

        Self {
            env,
            config,
            states,
            q_table,
            epsilon,
            rng,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Epsilon-greedy selection: explore uniformly with probability epsilon,
    /// otherwise exploit the greedy action
    fn select_action(&mut self, state: &BoardState, actions: &[Action]) -> Option<Action> {
        if self.rng.random::<f64>() < self.epsilon {
            actions.choose(&mut self.rng).copied()
        } else {
            self.q_table.greedy_action(state, actions)
        }
    }

    fn notify_aborted(&mut self, episode: usize, reason: &str) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_aborted(episode, reason)?;
        }
        Ok(())
    }

    /// Run one simulated episode, applying the TD(0) update after every
    /// executed step. Simulation failures abort the episode without
    /// propagating.
    fn run_episode(&mut self, episode: usize) -> Result<()> {
        let current = self.env.reset();

        if current.is_terminal() {
            self.q_table.set(current, None, 0.0);
            return Ok(());
        }

        while !self.env.is_terminal() {
            let state = self.env.current_state();
            let actions = self.env.possible_actions();
            let Some(action) = self.select_action(&state, &actions) else {
                break;
            };

            let outcome = match self.env.execute_move(&action) {
                Ok(outcome) => outcome,
                Err(err @ (Error::IllegalAction { .. } | Error::GameOver)) => {
                    self.notify_aborted(episode, &err.to_string())?;
                    break;
                }
                Err(err) => return Err(err),
            };

            let target = if outcome.next_state.is_terminal() {
                0.0
            } else {
                let next_actions = outcome.next_state.possible_actions();
                self.q_table.max_q(&outcome.next_state, &next_actions)
            };

            let alpha = self.config.learning_rate;
            let current_q = self.q_table.get(&outcome.state, Some(action));
            let sample = outcome.reward + self.config.discount * target;
            let updated = (1.0 - alpha) * current_q + alpha * sample;
            self.q_table.set(outcome.state, Some(action), updated);
        }

        Ok(())
    }

    /// Simulate the configured number of episodes, decaying epsilon after
    /// each one, then extract the greedy policy.
    pub fn train(&mut self) -> Result<Policy> {
        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        for episode in 0..self.config.episodes {
            self.run_episode(episode)?;
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);

            for observer in &mut self.observers {
                observer.on_progress(episode + 1)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(self.extract_policy())
    }

    /// Greedy policy over the current Q-table: for every non-terminal
    /// enumerated state, the legal action with the highest Q-value
    /// (first-seen tie-break). States with no legal actions are skipped.
    pub fn extract_policy(&self) -> Policy {
        let mut policy = Policy::new();

        for state in &self.states {
            if state.is_terminal() {
                continue;
            }
            let actions = state.possible_actions();
            if let Some(action) = self.q_table.greedy_action(state, &actions) {
                policy.insert(*state, action);
            }
        }

        policy
    }
}
