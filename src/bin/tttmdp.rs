use anyhow::Result;
use clap::{Parser, Subcommand};

use ttt_mdp::cli::{evaluate, play, train};

#[derive(Debug, Parser)]
#[command(name = "tttmdp", about = "Tic-Tac-Toe MDP solvers", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train a policy with one of the solvers
    Train(train::TrainArgs),
    /// Evaluate a saved policy against a random opponent
    Evaluate(evaluate::EvaluateArgs),
    /// Play against a saved policy
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Train(args) => train::execute(args),
        Command::Evaluate(args) => evaluate::execute(args),
        Command::Play(args) => play::execute(args),
    }
}
