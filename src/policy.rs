//! Policy artifact: the deterministic state-to-action mapping produced by
//! every solver

pub mod serialization;

use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    tictactoe::{Action, BoardState},
};

/// A deterministic mapping from non-terminal states to actions.
///
/// This is the common output of all solvers and the only interface consumed
/// by downstream play. Terminal states never appear as keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policy {
    moves: HashMap<BoardState, Action>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the action for a state, replacing any previous entry
    pub fn insert(&mut self, state: BoardState, action: Action) {
        self.moves.insert(state, action);
    }

    /// Look up the action prescribed for `state`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActionDefined`] if the state is absent, e.g. it was
    /// never visited during training or is terminal.
    pub fn get_move(&self, state: &BoardState) -> Result<Action> {
        self.moves
            .get(state)
            .copied()
            .ok_or_else(|| Error::NoActionDefined {
                state: state.encode(),
            })
    }

    pub fn contains(&self, state: &BoardState) -> bool {
        self.moves.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Iterate over all (state, action) entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&BoardState, &Action)> {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn test_insert_and_lookup() {
        let mut policy = Policy::new();
        let state = BoardState::new();
        let action = Action {
            position: 4,
            player: Player::X,
        };

        policy.insert(state, action);
        assert_eq!(policy.get_move(&state).unwrap(), action);
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_missing_state_is_an_error() {
        let policy = Policy::new();
        let result = policy.get_move(&BoardState::new());
        assert!(matches!(result, Err(Error::NoActionDefined { .. })));
    }
}
