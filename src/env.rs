//! Simulated environment for model-free training
//!
//! The environment owns the game state and advances it one full round per
//! call: the agent's move followed by the opponent's automatic reply. The
//! opponent samples uniformly from its legal moves, matching the
//! distribution enumerated by [`TttMdp::generate_transitions`].

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    error::{Error, Result},
    mdp::{Outcome, TttMdp},
    tictactoe::{Action, BoardState, Player},
};

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Environment simulating games of Tic-Tac-Toe against a random opponent.
#[derive(Debug, Clone)]
pub struct TttEnvironment {
    mdp: TttMdp,
    state: BoardState,
    agent: Player,
    rng: StdRng,
}

impl TttEnvironment {
    /// Create an environment using the given reward model. The agent plays X
    /// and the opponent replies at random.
    pub fn new(mdp: TttMdp) -> Self {
        Self {
            mdp,
            state: BoardState::new(),
            agent: Player::X,
            rng: build_rng(None),
        }
    }

    /// Seed the opponent's move sampling for reproducible episodes.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Reset to a fresh initial state and return it
    pub fn reset(&mut self) -> BoardState {
        self.state = BoardState::new();
        self.state
    }

    /// The state the agent currently faces
    pub fn current_state(&self) -> BoardState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Legal actions for the agent in the current state
    pub fn possible_actions(&self) -> Vec<Action> {
        self.state.possible_actions()
    }

    /// Execute the agent's move and, if the game continues, the opponent's
    /// sampled reply. Returns the observed `(s, a, r, s')` step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GameOver`] if the internal state is already terminal
    /// and [`Error::IllegalAction`] if the action is not legal in it.
    pub fn execute_move(&mut self, action: &Action) -> Result<Outcome> {
        if self.state.is_terminal() {
            return Err(Error::GameOver);
        }
        if action.player != self.state.to_move
            || action.position >= 9
            || !self.state.is_empty(action.position)
        {
            return Err(Error::IllegalAction {
                state: self.state.encode(),
                position: action.position,
            });
        }

        let source = self.state;
        let mid = source.make_move(action.position)?;

        let next_state = if mid.is_terminal() {
            mid
        } else {
            let replies = mid.legal_moves();
            let reply = *replies
                .choose(&mut self.rng)
                .ok_or_else(|| Error::NoActionsAvailable {
                    state: mid.encode(),
                })?;
            mid.make_move(reply)?
        };

        self.state = next_state;

        Ok(Outcome {
            state: source,
            action: *action,
            reward: self.mdp.reward_for(self.agent, &next_state),
            next_state,
        })
    }
}
