//! Winning line analysis for Tic-Tac-Toe

use super::{Cell, Player};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Check if a player has won by having three in a row
pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
    let target = player.to_cell();
    WINNING_LINES
        .iter()
        .any(|line| line.iter().all(|&idx| cells[idx] == target))
}
