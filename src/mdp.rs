//! Transition and reward model for the Tic-Tac-Toe MDP
//!
//! A single MDP step folds together the agent's move and the opponent's
//! probabilistic response, so the distribution returned by
//! [`TttMdp::generate_transitions`] ranges over states at which the agent
//! is next to move (or the game is over).

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    tictactoe::{Action, BoardState, Player},
};

/// Reward schedule for the four outcome classes of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    /// Reward when the agent completes a winning line
    pub win: f64,
    /// Reward when the opponent's reply completes a winning line
    pub lose: f64,
    /// Per-step reward for non-terminal continuations
    pub living: f64,
    /// Reward when the board fills with no winner
    pub draw: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            win: 10.0,
            lose: -50.0,
            living: -1.0,
            draw: 0.0,
        }
    }
}

/// One observed step: source state, action taken, immediate reward, and the
/// state after the opponent's response (if any).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub state: BoardState,
    pub action: Action,
    pub reward: f64,
    pub next_state: BoardState,
}

/// An [`Outcome`] weighted by its probability of occurring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionProb {
    pub probability: f64,
    pub outcome: Outcome,
}

/// Transition/reward model with a uniformly random opponent.
#[derive(Debug, Clone, Default)]
pub struct TttMdp {
    rewards: Rewards,
}

impl TttMdp {
    /// Create a model with the default reward schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model with a custom reward schedule
    pub fn with_rewards(rewards: Rewards) -> Self {
        Self { rewards }
    }

    pub fn rewards(&self) -> &Rewards {
        &self.rewards
    }

    /// Classify a post-transition state into the reward schedule, from the
    /// perspective of `agent`.
    pub fn reward_for(&self, agent: Player, next_state: &BoardState) -> f64 {
        match next_state.winner() {
            Some(winner) if winner == agent => self.rewards.win,
            Some(_) => self.rewards.lose,
            None if next_state.is_terminal() => self.rewards.draw,
            None => self.rewards.living,
        }
    }

    /// Validate that `action` belongs to `state`'s legal-action set.
    fn ensure_legal(&self, state: &BoardState, action: &Action) -> Result<()> {
        let legal = !state.is_terminal()
            && action.player == state.to_move
            && action.position < 9
            && state.is_empty(action.position);
        if legal {
            Ok(())
        } else {
            Err(Error::IllegalAction {
                state: state.encode(),
                position: action.position,
            })
        }
    }

    /// Generate the full one-step outcome distribution for `(state, action)`.
    ///
    /// The agent's move is applied first. If it ends the game, the single
    /// resulting outcome has probability 1. Otherwise the opponent replies
    /// uniformly at random over its legal moves, and each reply contributes
    /// one equally weighted outcome. Probabilities always sum to 1 and the
    /// list is never empty for a legal action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalAction`] when the action is not legal in
    /// `state`. This indicates a defect in policy construction or
    /// exploration and must not be swallowed by callers.
    pub fn generate_transitions(
        &self,
        state: &BoardState,
        action: &Action,
    ) -> Result<Vec<TransitionProb>> {
        self.ensure_legal(state, action)?;

        let agent = state.to_move;
        let mid = state.make_move(action.position)?;

        if mid.is_terminal() {
            return Ok(vec![TransitionProb {
                probability: 1.0,
                outcome: Outcome {
                    state: *state,
                    action: *action,
                    reward: self.reward_for(agent, &mid),
                    next_state: mid,
                },
            }]);
        }

        let replies = mid.legal_moves();
        let probability = 1.0 / replies.len() as f64;
        let mut transitions = Vec::with_capacity(replies.len());

        for reply in replies {
            let next_state = mid.make_move(reply)?;
            transitions.push(TransitionProb {
                probability,
                outcome: Outcome {
                    state: *state,
                    action: *action,
                    reward: self.reward_for(agent, &next_state),
                    next_state,
                },
            });
        }

        if transitions.is_empty() {
            return Err(Error::MissingTransition {
                state: state.encode(),
                position: action.position,
            });
        }

        Ok(transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(state: &BoardState, position: usize) -> Action {
        Action {
            position,
            player: state.to_move,
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let mdp = TttMdp::new();
        let state = BoardState::new();

        for a in state.possible_actions() {
            let transitions = mdp.generate_transitions(&state, &a).unwrap();
            assert!(!transitions.is_empty());
            let total: f64 = transitions.iter().map(|t| t.probability).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn opponent_replies_are_uniform() {
        let mdp = TttMdp::new();
        let state = BoardState::new();
        let transitions = mdp.generate_transitions(&state, &action(&state, 4)).unwrap();

        // 8 empty cells remain for O's reply
        assert_eq!(transitions.len(), 8);
        for t in &transitions {
            assert!((t.probability - 1.0 / 8.0).abs() < 1e-12);
            assert_eq!(t.outcome.reward, mdp.rewards().living);
            assert_eq!(t.outcome.next_state.to_move, Player::X);
        }
    }

    #[test]
    fn winning_move_yields_single_transition() {
        let mdp = TttMdp::new();
        // X completes the top row by playing 2
        let state = BoardState::from_label("XX.OO...._X").unwrap();
        let transitions = mdp.generate_transitions(&state, &action(&state, 2)).unwrap();

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].probability, 1.0);
        assert_eq!(transitions[0].outcome.reward, mdp.rewards().win);
        assert!(transitions[0].outcome.next_state.is_terminal());
    }

    #[test]
    fn losing_reply_is_rewarded_as_loss() {
        let mdp = TttMdp::new();
        // O threatens 5; if X plays elsewhere, one O reply completes the row
        let state = BoardState::from_label("X..OO...X_X").unwrap();
        let transitions = mdp.generate_transitions(&state, &action(&state, 1)).unwrap();

        let losing: Vec<_> = transitions
            .iter()
            .filter(|t| t.outcome.reward == mdp.rewards().lose)
            .collect();
        assert_eq!(losing.len(), 1);
        assert!(losing[0].outcome.next_state.has_won(Player::O));
    }

    #[test]
    fn draw_completion_uses_draw_reward() {
        let mdp = TttMdp::new();
        // One empty cell left; X's move fills the board with no winner
        let state = BoardState::from_label("XOXXOXO.O_X").unwrap();
        assert!(!state.is_terminal());
        let transitions = mdp.generate_transitions(&state, &action(&state, 7)).unwrap();

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].outcome.reward, mdp.rewards().draw);
        assert!(transitions[0].outcome.next_state.is_draw());
    }

    #[test]
    fn illegal_action_is_rejected() {
        let mdp = TttMdp::new();
        let state = BoardState::new().make_move(4).unwrap();

        // Occupied cell
        let occupied = Action {
            position: 4,
            player: state.to_move,
        };
        assert!(matches!(
            mdp.generate_transitions(&state, &occupied),
            Err(Error::IllegalAction { .. })
        ));

        // Wrong mark
        let wrong_mark = Action {
            position: 0,
            player: state.to_move.opponent(),
        };
        assert!(matches!(
            mdp.generate_transitions(&state, &wrong_mark),
            Err(Error::IllegalAction { .. })
        ));

        // Terminal state
        let terminal = BoardState::from_label("XXXOO...._O").unwrap();
        let any = Action {
            position: 5,
            player: terminal.to_move,
        };
        assert!(matches!(
            mdp.generate_transitions(&terminal, &any),
            Err(Error::IllegalAction { .. })
        ));
    }
}
