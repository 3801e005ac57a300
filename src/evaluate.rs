//! Evaluation of a trained policy against a random opponent

use serde::{Deserialize, Serialize};

use rand::seq::IndexedRandom;

use crate::{
    env::build_rng,
    error::Result,
    policy::Policy,
    tictactoe::{BoardState, Player},
};

/// Evaluation configuration
#[derive(Debug, Clone, Copy)]
pub struct EvaluationConfig {
    /// Number of games to play
    pub games: usize,
    /// Seed for the opponent's move sampling
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            games: 1000,
            seed: None,
        }
    }
}

/// Aggregate result of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub total_games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
}

impl EvaluationResult {
    pub fn new(total_games: usize, wins: usize, draws: usize, losses: usize) -> Self {
        let rate = |n: usize| {
            if total_games > 0 {
                n as f64 / total_games as f64
            } else {
                0.0
            }
        };

        Self {
            total_games,
            wins,
            draws,
            losses,
            win_rate: rate(wins),
            draw_rate: rate(draws),
            loss_rate: rate(losses),
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Play `config.games` full games, the policy as X against a uniformly
/// random O, and tally outcomes from the policy's perspective.
///
/// # Errors
///
/// Fails with [`crate::Error::NoActionDefined`] if play reaches a state the
/// policy does not cover.
pub fn evaluate_policy(policy: &Policy, config: &EvaluationConfig) -> Result<EvaluationResult> {
    let mut rng = build_rng(config.seed);

    let mut wins = 0;
    let mut draws = 0;
    let mut losses = 0;

    for _ in 0..config.games {
        let mut state = BoardState::new();

        while !state.is_terminal() {
            let position = if state.to_move == Player::X {
                policy.get_move(&state)?.position
            } else {
                let moves = state.legal_moves();
                *moves
                    .choose(&mut rng)
                    .ok_or_else(|| crate::Error::NoActionsAvailable {
                        state: state.encode(),
                    })?
            };
            state = state.make_move(position)?;
        }

        match state.winner() {
            Some(Player::X) => wins += 1,
            Some(Player::O) => losses += 1,
            None => draws += 1,
        }
    }

    Ok(EvaluationResult::new(config.games, wins, draws, losses))
}
