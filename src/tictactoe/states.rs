//! State-space enumeration by reachability from the empty board

use std::collections::{HashSet, VecDeque};

use super::{BoardState, Player};

/// Collect every board state reachable from the empty board (X opens),
/// in breadth-first discovery order. Play stops at terminal states, so
/// positions with play past a completed line are never produced.
///
/// This is the classic 5478-state enumeration.
pub fn reachable_states() -> Vec<BoardState> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    let root = BoardState::new();
    queue.push_back(root);
    visited.insert(root);

    while let Some(state) = queue.pop_front() {
        order.push(state);

        if state.is_terminal() {
            continue;
        }

        for pos in state.legal_moves() {
            let Ok(next) = state.make_move(pos) else {
                continue;
            };
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    order
}

/// Enumerate every reachable state at which `turn` is to move, plus all
/// terminal states. This is the key set for the solvers' value tables:
/// each decision point of the learning agent appears exactly once, and
/// every one-step successor of a `(state, action)` pair is included.
pub fn generate_all_states(turn: Player) -> Vec<BoardState> {
    reachable_states()
        .into_iter()
        .filter(|state| state.to_move == turn || state.is_terminal())
        .collect()
}
