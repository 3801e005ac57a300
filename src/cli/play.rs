//! Play command - human versus a trained policy

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    policy::serialization::load_policy,
    tictactoe::{BoardState, Player},
};

#[derive(Debug, Parser)]
pub struct PlayArgs {
    /// Policy file the computer plays from
    #[arg(long, short)]
    pub policy: PathBuf,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let policy = load_policy(&args.policy)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You are O. Enter positions 0-8, left to right, top to bottom.");

    let mut state = BoardState::new();

    loop {
        let action = policy.get_move(&state)?;
        state = state.make_move(action.position)?;
        println!("\nComputer plays {}:", action.position);
        println!("{state}");

        if let Some(result) = announce_if_over(&state) {
            println!("{result}");
            return Ok(());
        }

        let position = read_move(&mut lines, &state)?;
        state = state.make_move(position)?;
        println!("{state}");

        if let Some(result) = announce_if_over(&state) {
            println!("{result}");
            return Ok(());
        }
    }
}

fn announce_if_over(state: &BoardState) -> Option<&'static str> {
    match state.winner() {
        Some(Player::X) => Some("Computer wins."),
        Some(Player::O) => Some("You win."),
        None if state.is_draw() => Some("Draw."),
        None => None,
    }
}

fn read_move(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    state: &BoardState,
) -> Result<usize> {
    loop {
        print!("Your move: ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line.context("failed to read input")?,
            None => bail!("input closed before the game finished"),
        };

        match line.trim().parse::<usize>() {
            Ok(position) if position < 9 && state.legal_moves().contains(&position) => {
                return Ok(position);
            }
            Ok(_) => println!("That square is taken or out of range."),
            Err(_) => println!("Enter a number between 0 and 8."),
        }
    }
}
