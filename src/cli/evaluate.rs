//! Evaluate command - play a trained policy against a random opponent

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    evaluate::{EvaluationConfig, evaluate_policy},
    policy::serialization::load_policy,
};

#[derive(Debug, Parser)]
pub struct EvaluateArgs {
    /// Policy file to evaluate
    #[arg(long, short)]
    pub policy: PathBuf,

    /// Number of games to play
    #[arg(long, default_value_t = 1000)]
    pub games: usize,

    /// Random seed for the opponent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optional path for a JSON summary of the results
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let policy = load_policy(&args.policy)?;
    let config = EvaluationConfig {
        games: args.games,
        seed: args.seed,
    };

    let result = evaluate_policy(&policy, &config)?;

    println!("Played {} games against a random opponent:", result.total_games);
    println!(
        "  wins:   {:>6}  ({:.1}%)",
        result.wins,
        result.win_rate * 100.0
    );
    println!(
        "  draws:  {:>6}  ({:.1}%)",
        result.draws,
        result.draw_rate * 100.0
    );
    println!(
        "  losses: {:>6}  ({:.1}%)",
        result.losses,
        result.loss_rate * 100.0
    );

    if let Some(path) = args.summary {
        result.save(&path)?;
        println!("Wrote summary to {}", path.display());
    }

    Ok(())
}
