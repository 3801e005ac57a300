//! Tic-Tac-Toe game rules, board representation, and state enumeration

pub mod board;
pub mod lines;
pub mod states;

pub use board::{Action, BoardState, Cell, Player};
pub use states::{generate_all_states, reachable_states};
